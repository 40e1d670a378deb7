//! Core records of a play session.
//!
//! Every struct here is serialized into the local snapshot and exchanged with
//! the backend as JSON. Fields carry `#[serde(default)]` so snapshots written
//! by older builds (or trimmed by the backend) load with defaults instead of
//! failing: a missing field is never fatal.

use serde::{Deserialize, Serialize};

use super::catalog::{
    backpack_size, BLACKBOARD_CAP, DESKS_PER_CLASSROOM, GLOBAL_LOG_CAP, GRAFFITI_CAP,
    STARTER_ITEMS, STARTING_COINS,
};

/// Epoch milliseconds.
pub type Millis = i64;

fn default_level() -> u32 {
    1
}

fn default_coins() -> u64 {
    STARTING_COINS
}

/// Per-action counters shown on the player card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub tags_placed: u32,
    #[serde(default)]
    pub tags_cleaned: u32,
    #[serde(default)]
    pub treasures_found: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_coins")]
    pub coins: u64,
    /// Activity cost accumulator; gates cleaning while above zero.
    #[serde(default)]
    pub fatigue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatigue_immune_until: Option<Millis>,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default = "default_level")]
    pub backpack_level: u32,
    #[serde(default)]
    pub stats: PlayerStats,
    /// `None` until the player joins or founds a school.
    #[serde(default)]
    pub school_id: Option<String>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            level: 1,
            xp: 0,
            coins: STARTING_COINS,
            fatigue: 0.0,
            fatigue_immune_until: None,
            inventory: Vec::new(),
            backpack_level: 1,
            stats: PlayerStats::default(),
            school_id: None,
        }
    }
}

impl Player {
    /// Fresh player as created on first login.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            inventory: STARTER_ITEMS.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn backpack_size(&self) -> usize {
        backpack_size(self.backpack_level)
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|i| i == item_id)
    }

    pub fn is_fatigue_immune(&self, now: Millis) -> bool {
        self.fatigue_immune_until.is_some_and(|until| now < until)
    }
}

/// Roster entry mirroring a subset of [`Player`] fields. Simulated members
/// are credited here directly; the local player's entry is refreshed from the
/// player record after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub tags_placed: u32,
    #[serde(default)]
    pub tags_cleaned: u32,
    /// True for human players; the ambient simulation only drives the others.
    #[serde(default)]
    pub is_player: bool,
}

impl MemberSummary {
    pub fn simulated(id: &str, name: &str, level: u32, coins: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            level,
            xp: super::progression::xp_threshold(level),
            coins,
            tags_placed: 0,
            tags_cleaned: 0,
            is_player: false,
        }
    }

    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            level: player.level,
            xp: player.xp,
            coins: player.coins,
            tags_placed: player.stats.tags_placed,
            tags_cleaned: player.stats.tags_cleaned,
            is_player: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreasureKind {
    #[default]
    Coins,
    Xp,
    EnergyDrink,
}

impl TreasureKind {
    pub fn label(&self) -> &'static str {
        match self {
            TreasureKind::Coins => "coins",
            TreasureKind::Xp => "xp",
            TreasureKind::EnergyDrink => "energy drink",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Treasure {
    pub kind: TreasureKind,
    pub amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desk {
    #[serde(default)]
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasure: Option<Treasure>,
    /// Splodge left behind by cleaning; wiped at the end of the lesson.
    #[serde(default)]
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_searched: Option<Millis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackboardMessage {
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub timestamp: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desks: Vec<Desk>,
    /// Newest first, capped at [`BLACKBOARD_CAP`].
    #[serde(default)]
    pub blackboard: Vec<BlackboardMessage>,
}

impl Classroom {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            desks: (0..DESKS_PER_CLASSROOM)
                .map(|id| Desk {
                    id,
                    ..Desk::default()
                })
                .collect(),
            blackboard: Vec::new(),
        }
    }

    pub fn desk(&self, desk_id: usize) -> Option<&Desk> {
        self.desks.iter().find(|d| d.id == desk_id)
    }

    pub fn desk_mut(&mut self, desk_id: usize) -> Option<&mut Desk> {
        self.desks.iter_mut().find(|d| d.id == desk_id)
    }

    pub fn post(&mut self, message: BlackboardMessage) {
        push_capped(&mut self.blackboard, message, BLACKBOARD_CAP);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub school_points: u64,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub principal_name: String,
    #[serde(default)]
    pub members: Vec<MemberSummary>,
}

impl School {
    pub fn classroom(&self, class_id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == class_id)
    }

    pub fn classroom_mut(&mut self, class_id: &str) -> Option<&mut Classroom> {
        self.classrooms.iter_mut().find(|c| c.id == class_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&MemberSummary> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn member_mut(&mut self, member_id: &str) -> Option<&mut MemberSummary> {
        self.members.iter_mut().find(|m| m.id == member_id)
    }
}

/// Address of one desk in the world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeskKey {
    pub school_id: String,
    pub class_id: String,
    pub desk_id: usize,
}

impl DeskKey {
    pub fn new(school_id: &str, class_id: &str, desk_id: usize) -> Self {
        Self {
            school_id: school_id.to_string(),
            class_id: class_id.to_string(),
            desk_id,
        }
    }
}

impl std::fmt::Display for DeskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.school_id, self.class_id, self.desk_id)
    }
}

/// A mark on a rival desk. Zero tool figures in an old snapshot are filled
/// back in from the item table by [`crate::game::seed::repair`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: String,
    pub school_id: String,
    pub class_id: String,
    pub desk_id: usize,
    pub creator_id: String,
    pub creator_name: String,
    pub creator_school_id: Option<String>,
    pub tool_id: String,
    pub tool_power: u32,
    pub tool_cost: u64,
    /// Coins paid to place the tag (tool cost plus any tag-over surcharge).
    pub total_cost: u64,
    pub start_time: Millis,
    pub duration_ms: Millis,
    /// Cached once true; never reset, not even by a remote merge.
    pub is_matured: bool,
}

impl Tag {
    pub fn key(&self) -> DeskKey {
        DeskKey::new(&self.school_id, &self.class_id, self.desk_id)
    }

    pub fn occupies(&self, key: &DeskKey) -> bool {
        self.school_id == key.school_id && self.class_id == key.class_id && self.desk_id == key.desk_id
    }

    pub fn is_due(&self, now: Millis) -> bool {
        now - self.start_time >= self.duration_ms
    }

    /// Elapsed fraction of the maturation time, clamped to `0.0..=1.0`.
    pub fn progress(&self, now: Millis) -> f64 {
        if self.is_matured || self.duration_ms <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.start_time).max(0) as f64;
        (elapsed / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLog {
    pub id: String,
    pub timestamp: Millis,
    pub actor: String,
    pub message: String,
}

impl ActivityLog {
    pub fn new(now: Millis, actor: &str, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            actor: actor.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraffitiMark {
    pub id: String,
    pub school_id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub created_at: Millis,
}

/// Aggregate root of a play session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub player: Player,
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub active_tags: Vec<Tag>,
    /// Newest first, capped at [`GLOBAL_LOG_CAP`].
    #[serde(default)]
    pub global_logs: Vec<ActivityLog>,
    #[serde(default)]
    pub graffiti: Vec<GraffitiMark>,
    #[serde(default)]
    pub last_treasure_reset: Millis,
    #[serde(default)]
    pub lesson_start: Millis,
    #[serde(default)]
    pub easter_eggs_enabled: bool,
    /// Backend reward entries already credited, so re-delivery is ignored.
    #[serde(default)]
    pub applied_reward_ids: Vec<String>,
}

impl GameState {
    pub fn school(&self, school_id: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.id == school_id)
    }

    pub fn school_mut(&mut self, school_id: &str) -> Option<&mut School> {
        self.schools.iter_mut().find(|s| s.id == school_id)
    }

    pub fn tag_at(&self, key: &DeskKey) -> Option<&Tag> {
        self.active_tags.iter().find(|t| t.occupies(key))
    }

    pub fn desk(&self, key: &DeskKey) -> Option<&Desk> {
        self.school(&key.school_id)?
            .classroom(&key.class_id)?
            .desk(key.desk_id)
    }

    pub fn desk_mut(&mut self, key: &DeskKey) -> Option<&mut Desk> {
        self.school_mut(&key.school_id)?
            .classroom_mut(&key.class_id)?
            .desk_mut(key.desk_id)
    }

    /// Remove whatever tag occupies `key`, returning it.
    pub fn take_tag(&mut self, key: &DeskKey) -> Option<Tag> {
        let pos = self.active_tags.iter().position(|t| t.occupies(key))?;
        Some(self.active_tags.remove(pos))
    }

    pub fn log(&mut self, entry: ActivityLog) {
        push_capped(&mut self.global_logs, entry, GLOBAL_LOG_CAP);
    }

    pub fn add_graffiti(&mut self, mark: GraffitiMark) {
        push_capped(&mut self.graffiti, mark, GRAFFITI_CAP);
    }

    /// School whose roster lists `member_id`.
    pub fn school_of_member(&self, member_id: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.member(member_id).is_some())
    }
}

/// Insert at the front and drop the oldest entries beyond `cap`.
pub fn push_capped<T>(list: &mut Vec<T>, item: T, cap: usize) {
    list.insert(0, item);
    list.truncate(cap);
}
