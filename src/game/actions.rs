//! Player actions as pure transforms.
//!
//! [`apply`] takes the current state by reference and either returns a
//! complete successor state plus an [`ActionOutcome`], or a [`GameError`]
//! leaving the caller's state untouched. Successors are always built from a
//! clone of the state passed in, overwriting only the fields the action
//! computes, so a transform never writes back a stale sub-object.
//!
//! The crediting helpers at the bottom are shared with the tick sweep, the
//! ambient simulation and the remote merge.

use log::debug;
use serde::{Deserialize, Serialize};

use super::catalog::{
    self, backpack_upgrade_cost, ItemKind, ItemSpec, CLEAN_SCHOOL_POINTS, CLEAN_XP_PER_POWER,
    ENERGY_DRINK, ENERGY_DRINK_IMMUNITY_MS, MAX_BACKPACK_LEVEL, SEARCH_COOLDOWN_MS,
    TAG_OVER_SURCHARGE,
};
use super::errors::GameError;
use super::progression::{
    award, award_school_points, clean_fatigue_cost, partial_reward, sync_classrooms, Reward,
};
use super::types::{
    ActivityLog, BlackboardMessage, DeskKey, GameState, GraffitiMark, MemberSummary, Millis,
    School, Tag, Treasure, TreasureKind,
};
use crate::validation::{validate_message, validate_school_name};

/// Everything the presentation layer can ask the store to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    JoinSchool { school_id: String },
    CreateSchool { name: String },
    LeaveSchool,
    Tag { school_id: String, class_id: String, desk_id: usize, tool_id: String },
    /// Clean a rival's tag and place ours in one step.
    TagOver { school_id: String, class_id: String, desk_id: usize, tool_id: String },
    Clean { school_id: String, class_id: String, desk_id: usize, tool_id: String },
    SearchDesk { school_id: String, class_id: String, desk_id: usize },
    BuyItem { item_id: String },
    DropItem { item_id: String },
    UseItem { item_id: String },
    UpgradeBackpack,
    WriteBlackboard { class_id: String, text: String },
    SprayGraffiti { school_id: String, text: String },
}

/// What an accepted action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Joined { school_id: String },
    SchoolCreated { school_id: String },
    Left { school_id: String, school_deleted: bool },
    Tagged { tag_id: String, cost: u64 },
    TaggedOver { tag_id: String, cost: u64, fatigue: f64, creator_reward: Reward },
    Cleaned { xp: u64, fatigue: f64, creator_reward: Reward },
    TreasureClaimed(Treasure),
    Bought { item_id: String, cost: u64 },
    Dropped { item_id: String },
    Used { item_id: String },
    BackpackUpgraded { level: u32, cost: u64 },
    Posted,
    Sprayed,
}

pub fn apply(
    state: &GameState,
    action: &GameAction,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    match action {
        GameAction::JoinSchool { school_id } => join_school(state, school_id, now),
        GameAction::CreateSchool { name } => create_school(state, name, now),
        GameAction::LeaveSchool => leave_school(state, now),
        GameAction::Tag { school_id, class_id, desk_id, tool_id } => {
            place_tag(state, &resolve_desk(state, school_id, class_id, *desk_id)?, tool_id, now)
        }
        GameAction::TagOver { school_id, class_id, desk_id, tool_id } => {
            tag_over(state, &resolve_desk(state, school_id, class_id, *desk_id)?, tool_id, now)
        }
        GameAction::Clean { school_id, class_id, desk_id, tool_id } => {
            clean(state, &resolve_desk(state, school_id, class_id, *desk_id)?, tool_id, now)
        }
        GameAction::SearchDesk { school_id, class_id, desk_id } => {
            search_desk(state, &resolve_desk(state, school_id, class_id, *desk_id)?, now)
        }
        GameAction::BuyItem { item_id } => buy_item(state, item_id),
        GameAction::DropItem { item_id } => drop_item(state, item_id),
        GameAction::UseItem { item_id } => use_item(state, item_id, now),
        GameAction::UpgradeBackpack => upgrade_backpack(state),
        GameAction::WriteBlackboard { class_id, text } => {
            write_blackboard(state, class_id, text, now)
        }
        GameAction::SprayGraffiti { school_id, text } => spray_graffiti(state, school_id, text, now),
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

fn join_school(
    state: &GameState,
    school_id: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    if state.player.school_id.is_some() {
        return Err(GameError::AlreadyInSchool);
    }
    let school = state
        .school(school_id)
        .ok_or_else(|| GameError::SchoolNotFound(school_id.to_string()))?;
    let school_name = school.name.clone();

    let mut next = state.clone();
    next.player.school_id = Some(school_id.to_string());
    sync_player_summary(&mut next);
    let msg = format!("{} enrolled at {}", next.player.name, school_name);
    next.log(ActivityLog::new(now, &next.player.id, msg));
    Ok((
        next,
        ActionOutcome::Joined {
            school_id: school_id.to_string(),
        },
    ))
}

fn create_school(
    state: &GameState,
    name: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    if state.player.school_id.is_some() {
        return Err(GameError::AlreadyInSchool);
    }
    let name = validate_school_name(name)?;
    let school_id = format!("school-{}", uuid::Uuid::new_v4().simple());

    let mut school = School {
        id: school_id.clone(),
        name: name.clone(),
        level: 1,
        school_points: 0,
        classrooms: Vec::new(),
        principal_id: state.player.id.clone(),
        principal_name: state.player.name.clone(),
        members: Vec::new(),
    };
    sync_classrooms(&mut school);

    let mut next = state.clone();
    next.schools.push(school);
    next.player.school_id = Some(school_id.clone());
    sync_player_summary(&mut next);
    let msg = format!("{} founded {}", next.player.name, name);
    next.log(ActivityLog::new(now, &next.player.id, msg));
    Ok((next, ActionOutcome::SchoolCreated { school_id }))
}

fn leave_school(state: &GameState, now: Millis) -> Result<(GameState, ActionOutcome), GameError> {
    let school_id = own_school(state)?.to_string();
    let player_id = state.player.id.clone();

    let mut next = state.clone();
    next.player.school_id = None;
    let mut deleted = false;
    if let Some(school) = next.school_mut(&school_id) {
        school.members.retain(|m| m.id != player_id);
        if school.members.is_empty() {
            deleted = true;
        } else if school.principal_id == player_id {
            let heir = school.members[0].clone();
            school.principal_id = heir.id;
            school.principal_name = heir.name;
        }
    }
    if deleted {
        remove_school(&mut next, &school_id);
    }
    let msg = format!("{} left school", next.player.name);
    next.log(ActivityLog::new(now, &player_id, msg));
    Ok((
        next,
        ActionOutcome::Left {
            school_id,
            school_deleted: deleted,
        },
    ))
}

/// Drop a school and every tag placed on its desks.
pub(crate) fn remove_school(state: &mut GameState, school_id: &str) -> bool {
    let before = state.schools.len();
    state.schools.retain(|s| s.id != school_id);
    state.active_tags.retain(|t| t.school_id != school_id);
    state.graffiti.retain(|g| g.school_id != school_id);
    if state.player.school_id.as_deref() == Some(school_id) {
        state.player.school_id = None;
    }
    state.schools.len() != before
}

// ---------------------------------------------------------------------------
// Tagging and cleaning
// ---------------------------------------------------------------------------

fn place_tag(
    state: &GameState,
    key: &DeskKey,
    tool_id: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let own = own_school(state)?;
    if key.school_id == own {
        return Err(GameError::WrongSchool("you can only tag rival schools"));
    }
    if state.tag_at(key).is_some() {
        return Err(GameError::DeskOccupied);
    }
    let tool = owned_item(state, tool_id, ItemKind::TagTool)?;
    ensure_funds(state, tool.cost)?;

    let mut next = state.clone();
    next.player.coins -= tool.cost;
    next.player.stats.tags_placed += 1;
    let tag = new_tag(&next, key, tool, tool.cost, now);
    let tag_id = tag.id.clone();
    next.active_tags.push(tag);
    let msg = format!("{} tagged a desk at {}", next.player.name, school_name(&next, &key.school_id));
    next.log(ActivityLog::new(now, &next.player.id, msg));
    sync_player_summary(&mut next);
    Ok((next, ActionOutcome::Tagged { tag_id, cost: tool.cost }))
}

fn tag_over(
    state: &GameState,
    key: &DeskKey,
    tool_id: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let own = own_school(state)?;
    if key.school_id == own {
        return Err(GameError::WrongSchool("you can only tag rival schools"));
    }
    let existing = state.tag_at(key).ok_or(GameError::NoTag)?;
    if existing.creator_id == state.player.id {
        return Err(GameError::OwnTag);
    }
    ensure_rested(state, now)?;
    let tool = owned_item(state, tool_id, ItemKind::TagTool)?;
    let cost = tool.cost + TAG_OVER_SURCHARGE;
    ensure_funds(state, cost)?;

    let mut next = state.clone();
    next.player.coins -= cost;
    let (old, creator_reward) = match remove_tag_with_payout(&mut next, key, now) {
        Some(removed) => removed,
        None => return Err(GameError::NoTag),
    };
    let fatigue = if next.player.is_fatigue_immune(now) {
        0.0
    } else {
        clean_fatigue_cost(tool.power, old.tool_power)
    };
    next.player.fatigue += fatigue;
    next.player.stats.tags_cleaned += 1;
    next.player.stats.tags_placed += 1;
    let tag = new_tag(&next, key, tool, cost, now);
    let tag_id = tag.id.clone();
    next.active_tags.push(tag);
    let msg = format!(
        "{} tagged over {}'s work at {}",
        next.player.name,
        old.creator_name,
        school_name(&next, &key.school_id)
    );
    next.log(ActivityLog::new(now, &next.player.id, msg));
    sync_player_summary(&mut next);
    Ok((
        next,
        ActionOutcome::TaggedOver {
            tag_id,
            cost,
            fatigue,
            creator_reward,
        },
    ))
}

fn clean(
    state: &GameState,
    key: &DeskKey,
    tool_id: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let own = own_school(state)?.to_string();
    if key.school_id != own {
        return Err(GameError::WrongSchool("you can only clean your own school"));
    }
    let existing = state.tag_at(key).ok_or(GameError::NoTag)?;
    if existing.creator_id == state.player.id {
        return Err(GameError::OwnTag);
    }
    ensure_rested(state, now)?;
    let tool = owned_item(state, tool_id, ItemKind::CleanTool)?;

    let mut next = state.clone();
    let (old, creator_reward) = match remove_tag_with_payout(&mut next, key, now) {
        Some(removed) => removed,
        None => return Err(GameError::NoTag),
    };
    if let Some(desk) = next.desk_mut(key) {
        desk.dirty = true;
    }
    let fatigue = if next.player.is_fatigue_immune(now) {
        0.0
    } else {
        clean_fatigue_cost(tool.power, old.tool_power)
    };
    let xp = CLEAN_XP_PER_POWER * old.tool_power as u64;
    {
        let p = &mut next.player;
        p.fatigue += fatigue;
        p.stats.tags_cleaned += 1;
        award(&mut p.level, &mut p.xp, &mut p.coins, Reward::new(xp, 0));
    }
    credit_school(&mut next, &own, CLEAN_SCHOOL_POINTS, now);
    let msg = format!("{} scrubbed {}'s tag off a desk", next.player.name, old.creator_name);
    next.log(ActivityLog::new(now, &next.player.id, msg));
    sync_player_summary(&mut next);
    Ok((
        next,
        ActionOutcome::Cleaned {
            xp,
            fatigue,
            creator_reward,
        },
    ))
}

fn new_tag(state: &GameState, key: &DeskKey, tool: &ItemSpec, total_cost: u64, now: Millis) -> Tag {
    Tag {
        id: uuid::Uuid::new_v4().to_string(),
        school_id: key.school_id.clone(),
        class_id: key.class_id.clone(),
        desk_id: key.desk_id,
        creator_id: state.player.id.clone(),
        creator_name: state.player.name.clone(),
        creator_school_id: state.player.school_id.clone(),
        tool_id: tool.id.to_string(),
        tool_power: tool.power,
        tool_cost: tool.cost,
        total_cost,
        start_time: now,
        duration_ms: tool.duration_ms,
        is_matured: false,
    }
}

// ---------------------------------------------------------------------------
// Treasure and inventory
// ---------------------------------------------------------------------------

fn search_desk(
    state: &GameState,
    key: &DeskKey,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let desk = state
        .desk(key)
        .ok_or_else(|| GameError::DeskNotFound(key.to_string()))?;
    if let Some(last) = desk.last_searched {
        let wait = SEARCH_COOLDOWN_MS - (now - last);
        if wait > 0 {
            return Err(GameError::SearchCooldown((wait + 999) / 1000));
        }
    }
    let treasure = desk.treasure.ok_or(GameError::NoTreasure)?;
    if treasure.kind == TreasureKind::EnergyDrink {
        ensure_space(state, treasure.amount as usize)?;
    }

    let mut next = state.clone();
    if let Some(desk) = next.desk_mut(key) {
        desk.treasure = None;
        desk.last_searched = Some(now);
    }
    {
        let p = &mut next.player;
        match treasure.kind {
            TreasureKind::Coins => {
                award(&mut p.level, &mut p.xp, &mut p.coins, Reward::new(0, treasure.amount));
            }
            TreasureKind::Xp => {
                award(&mut p.level, &mut p.xp, &mut p.coins, Reward::new(treasure.amount, 0));
            }
            TreasureKind::EnergyDrink => {
                for _ in 0..treasure.amount {
                    p.inventory.push(ENERGY_DRINK.to_string());
                }
            }
        }
        p.stats.treasures_found += 1;
    }
    let msg = format!(
        "{} found {} {} in a desk",
        next.player.name,
        treasure.amount,
        treasure.kind.label()
    );
    next.log(ActivityLog::new(now, &next.player.id, msg));
    sync_player_summary(&mut next);
    Ok((next, ActionOutcome::TreasureClaimed(treasure)))
}

fn buy_item(state: &GameState, item_id: &str) -> Result<(GameState, ActionOutcome), GameError> {
    let item = catalog::item(item_id).ok_or_else(|| GameError::UnknownItem(item_id.to_string()))?;
    ensure_funds(state, item.cost)?;
    ensure_space(state, 1)?;

    let mut next = state.clone();
    next.player.coins -= item.cost;
    next.player.inventory.push(item.id.to_string());
    sync_player_summary(&mut next);
    Ok((
        next,
        ActionOutcome::Bought {
            item_id: item.id.to_string(),
            cost: item.cost,
        },
    ))
}

fn drop_item(state: &GameState, item_id: &str) -> Result<(GameState, ActionOutcome), GameError> {
    let pos = state
        .player
        .inventory
        .iter()
        .position(|i| i == item_id)
        .ok_or_else(|| GameError::MissingItem(item_id.to_string()))?;
    let mut next = state.clone();
    next.player.inventory.remove(pos);
    Ok((
        next,
        ActionOutcome::Dropped {
            item_id: item_id.to_string(),
        },
    ))
}

fn use_item(
    state: &GameState,
    item_id: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let item = owned_item(state, item_id, ItemKind::Consumable)?;
    if item.id != ENERGY_DRINK {
        return Err(GameError::WrongItemKind(item.name.to_string()));
    }
    let mut next = state.clone();
    if let Some(pos) = next.player.inventory.iter().position(|i| i == item_id) {
        next.player.inventory.remove(pos);
    }
    next.player.fatigue = 0.0;
    next.player.fatigue_immune_until = Some(now + ENERGY_DRINK_IMMUNITY_MS);
    Ok((
        next,
        ActionOutcome::Used {
            item_id: item_id.to_string(),
        },
    ))
}

fn upgrade_backpack(state: &GameState) -> Result<(GameState, ActionOutcome), GameError> {
    let level = state.player.backpack_level;
    if level >= MAX_BACKPACK_LEVEL {
        return Err(GameError::BackpackMaxed);
    }
    let cost = backpack_upgrade_cost(level);
    ensure_funds(state, cost)?;

    let mut next = state.clone();
    next.player.coins -= cost;
    next.player.backpack_level = level + 1;
    sync_player_summary(&mut next);
    Ok((
        next,
        ActionOutcome::BackpackUpgraded {
            level: level + 1,
            cost,
        },
    ))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

fn write_blackboard(
    state: &GameState,
    class_id: &str,
    text: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let own = own_school(state)?.to_string();
    let text = validate_message(text)?;
    let school = state
        .school(&own)
        .ok_or_else(|| GameError::SchoolNotFound(own.clone()))?;
    if school.classroom(class_id).is_none() {
        return Err(GameError::ClassroomNotFound(class_id.to_string()));
    }

    let mut next = state.clone();
    let message = BlackboardMessage {
        author_id: next.player.id.clone(),
        author_name: next.player.name.clone(),
        text,
        timestamp: now,
    };
    if let Some(room) = next
        .school_mut(&own)
        .and_then(|s| s.classroom_mut(class_id))
    {
        room.post(message);
    }
    Ok((next, ActionOutcome::Posted))
}

fn spray_graffiti(
    state: &GameState,
    school_id: &str,
    text: &str,
    now: Millis,
) -> Result<(GameState, ActionOutcome), GameError> {
    let own = own_school(state)?;
    if school_id == own {
        return Err(GameError::WrongSchool("graffiti goes on rival walls"));
    }
    if state.school(school_id).is_none() {
        return Err(GameError::SchoolNotFound(school_id.to_string()));
    }
    let text = validate_message(text)?;

    let mut next = state.clone();
    let mark = GraffitiMark {
        id: uuid::Uuid::new_v4().to_string(),
        school_id: school_id.to_string(),
        author_id: next.player.id.clone(),
        author_name: next.player.name.clone(),
        text,
        created_at: now,
    };
    next.add_graffiti(mark);
    let msg = format!("{} sprayed the walls of {}", next.player.name, school_name(&next, school_id));
    next.log(ActivityLog::new(now, &next.player.id, msg));
    Ok((next, ActionOutcome::Sprayed))
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

fn own_school(state: &GameState) -> Result<&str, GameError> {
    state.player.school_id.as_deref().ok_or(GameError::NoSchool)
}

fn resolve_desk(
    state: &GameState,
    school_id: &str,
    class_id: &str,
    desk_id: usize,
) -> Result<DeskKey, GameError> {
    let school = state
        .school(school_id)
        .ok_or_else(|| GameError::SchoolNotFound(school_id.to_string()))?;
    let room = school
        .classroom(class_id)
        .ok_or_else(|| GameError::ClassroomNotFound(class_id.to_string()))?;
    let key = DeskKey::new(school_id, class_id, desk_id);
    if room.desk(desk_id).is_none() {
        return Err(GameError::DeskNotFound(key.to_string()));
    }
    Ok(key)
}

fn owned_item(state: &GameState, item_id: &str, kind: ItemKind) -> Result<&'static ItemSpec, GameError> {
    let item = catalog::item(item_id).ok_or_else(|| GameError::UnknownItem(item_id.to_string()))?;
    if item.kind != kind {
        return Err(GameError::WrongItemKind(item.name.to_string()));
    }
    if !state.player.has_item(item_id) {
        return Err(GameError::MissingItem(item.name.to_string()));
    }
    Ok(item)
}

fn ensure_funds(state: &GameState, needed: u64) -> Result<(), GameError> {
    if state.player.coins < needed {
        return Err(GameError::InsufficientFunds {
            needed,
            available: state.player.coins,
        });
    }
    Ok(())
}

fn ensure_space(state: &GameState, extra: usize) -> Result<(), GameError> {
    let size = state.player.backpack_size();
    if state.player.inventory.len() + extra > size {
        return Err(GameError::BackpackFull(size));
    }
    Ok(())
}

fn ensure_rested(state: &GameState, now: Millis) -> Result<(), GameError> {
    let p = &state.player;
    if p.fatigue > 0.0 && !p.is_fatigue_immune(now) {
        return Err(GameError::Fatigued(p.fatigue));
    }
    Ok(())
}

fn school_name(state: &GameState, school_id: &str) -> String {
    state
        .school(school_id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| school_id.to_string())
}

// ---------------------------------------------------------------------------
// Crediting
// ---------------------------------------------------------------------------

/// Credit `member_id`, who is either the local player or a roster member of
/// any school. Returns false when nobody by that id exists.
pub(crate) fn credit_member(state: &mut GameState, member_id: &str, reward: Reward) -> bool {
    if state.player.id == member_id {
        let p = &mut state.player;
        award(&mut p.level, &mut p.xp, &mut p.coins, reward);
        sync_player_summary(state);
        return true;
    }
    for school in state.schools.iter_mut() {
        if let Some(m) = school.member_mut(member_id) {
            award(&mut m.level, &mut m.xp, &mut m.coins, reward);
            return true;
        }
    }
    debug!("reward for unknown member {} dropped", member_id);
    false
}

/// Give a school points, logging any level it gains.
pub(crate) fn credit_school(state: &mut GameState, school_id: &str, points: u64, now: Millis) {
    let Some(school) = state.school_mut(school_id) else {
        return;
    };
    if award_school_points(school, points) > 0 {
        let msg = format!("{} reached level {}", school.name, school.level);
        state.log(ActivityLog::new(now, "system", msg));
    }
}

/// Remove the tag on `key`. An unmatured tag pays its creator a share of the
/// full reward proportional to its progress.
pub(crate) fn remove_tag_with_payout(
    state: &mut GameState,
    key: &DeskKey,
    now: Millis,
) -> Option<(Tag, Reward)> {
    let tag = state.take_tag(key)?;
    let reward = if tag.is_matured {
        Reward::default()
    } else {
        partial_reward(tag.tool_power, tag.total_cost, tag.progress(now))
    };
    if !reward.is_empty() {
        credit_member(state, &tag.creator_id, reward);
    }
    Some((tag, reward))
}

/// Refresh the local player's roster entry from the player record.
pub(crate) fn sync_player_summary(state: &mut GameState) {
    let Some(school_id) = state.player.school_id.clone() else {
        return;
    };
    let summary = MemberSummary::from_player(&state.player);
    if let Some(school) = state.school_mut(&school_id) {
        match school.member_mut(&summary.id) {
            Some(entry) => *entry = summary,
            None => school.members.push(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seed::fresh_state;

    fn enrolled() -> GameState {
        let state = fresh_state("p1", "Pat", 0);
        let action = GameAction::JoinSchool {
            school_id: "oakridge".into(),
        };
        apply(&state, &action, 0).unwrap().0
    }

    #[test]
    fn join_adds_roster_entry() {
        let state = enrolled();
        assert_eq!(state.player.school_id.as_deref(), Some("oakridge"));
        let member = state.school("oakridge").unwrap().member("p1").unwrap();
        assert!(member.is_player);
    }

    #[test]
    fn cannot_tag_own_school() {
        let state = enrolled();
        let action = GameAction::Tag {
            school_id: "oakridge".into(),
            class_id: "math".into(),
            desk_id: 0,
            tool_id: "marker".into(),
        };
        assert!(matches!(apply(&state, &action, 0), Err(GameError::WrongSchool(_))));
    }

    #[test]
    fn tag_requires_school() {
        let state = fresh_state("p1", "Pat", 0);
        let action = GameAction::Tag {
            school_id: "maple".into(),
            class_id: "math".into(),
            desk_id: 0,
            tool_id: "marker".into(),
        };
        assert_eq!(apply(&state, &action, 0).unwrap_err(), GameError::NoSchool);
    }

    #[test]
    fn founding_then_leaving_deletes_school() {
        let state = fresh_state("p1", "Pat", 0);
        let (state, outcome) = apply(
            &state,
            &GameAction::CreateSchool {
                name: "Night School".into(),
            },
            0,
        )
        .unwrap();
        let ActionOutcome::SchoolCreated { school_id } = outcome else {
            panic!("expected SchoolCreated");
        };
        assert_eq!(state.school(&school_id).unwrap().principal_id, "p1");
        let (state, outcome) = apply(&state, &GameAction::LeaveSchool, 1).unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Left {
                school_id: school_id.clone(),
                school_deleted: true
            }
        );
        assert!(state.school(&school_id).is_none());
        assert_eq!(state.player.school_id, None);
    }

    #[test]
    fn principal_leaving_promotes_next_member() {
        let mut state = enrolled();
        {
            let school = state.school_mut("oakridge").unwrap();
            school.principal_id = "p1".into();
            school.principal_name = "Pat".into();
        }
        let (state, _) = apply(&state, &GameAction::LeaveSchool, 1).unwrap();
        let school = state.school("oakridge").unwrap();
        assert_ne!(school.principal_id, "p1");
        assert!(school.member(&school.principal_id).is_some());
    }

    #[test]
    fn energy_drink_grants_immunity() {
        let mut state = enrolled();
        state.player.inventory.push(ENERGY_DRINK.into());
        state.player.fatigue = 12.0;
        let (next, _) = apply(
            &state,
            &GameAction::UseItem {
                item_id: ENERGY_DRINK.into(),
            },
            1_000,
        )
        .unwrap();
        assert_eq!(next.player.fatigue, 0.0);
        assert!(next.player.is_fatigue_immune(1_000 + ENERGY_DRINK_IMMUNITY_MS - 1));
        assert!(!next.player.has_item(ENERGY_DRINK));
    }

    #[test]
    fn upgrade_backpack_costs_double_each_level() {
        let mut state = enrolled();
        state.player.coins = 1_000;
        let (state, first) = apply(&state, &GameAction::UpgradeBackpack, 0).unwrap();
        let (state, second) = apply(&state, &GameAction::UpgradeBackpack, 0).unwrap();
        assert_eq!(first, ActionOutcome::BackpackUpgraded { level: 2, cost: 100 });
        assert_eq!(second, ActionOutcome::BackpackUpgraded { level: 3, cost: 200 });
        assert_eq!(state.player.coins, 700);
        assert_eq!(state.player.backpack_size(), 10);
    }

    #[test]
    fn blackboard_is_capped() {
        let mut state = enrolled();
        for i in 0..8 {
            let action = GameAction::WriteBlackboard {
                class_id: "math".into(),
                text: format!("note {}", i),
            };
            state = apply(&state, &action, i).unwrap().0;
        }
        let board = &state.school("oakridge").unwrap().classroom("math").unwrap().blackboard;
        assert_eq!(board.len(), 5);
        assert_eq!(board[0].text, "note 7");
    }
}
