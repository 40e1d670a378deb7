//! JSON bodies exchanged with the backend.
//!
//! Inbound documents are deliberately loose: any field may be missing, and
//! a missing field means "keep what we have".

use serde::{Deserialize, Serialize};

use crate::game::types::{ActivityLog, GameState, GraffitiMark, Millis, PlayerStats, School, Tag};

/// Progression fields of the backend's player record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePlayer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub xp: Option<u64>,
    #[serde(default)]
    pub coins: Option<u64>,
    #[serde(default)]
    pub fatigue: Option<f64>,
    #[serde(default)]
    pub inventory: Option<Vec<String>>,
    #[serde(default)]
    pub backpack_level: Option<u32>,
    #[serde(default)]
    pub stats: Option<PlayerStats>,
    /// Present means "member of this school"; absent never clears membership.
    #[serde(default)]
    pub school_id: Option<String>,
}

/// The shared world document at `{base}/game-state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_logs: Option<Vec<ActivityLog>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graffiti: Option<Vec<GraffitiMark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_treasure_reset: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_start: Option<Millis>,
}

impl SharedState {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            active_tags: Some(state.active_tags.clone()),
            global_logs: Some(state.global_logs.clone()),
            graffiti: Some(state.graffiti.clone()),
            last_treasure_reset: Some(state.last_treasure_reset),
            lesson_start: Some(state.lesson_start),
        }
    }
}

/// Server-side credit waiting to be applied, e.g. when another device
/// scrubbed one of our tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReward {
    pub id: String,
    pub player_id: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AckBody<'a> {
    pub ids: &'a [String],
}

/// Everything one poll managed to fetch. Parts that failed are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub player: Option<RemotePlayer>,
    pub schools: Option<Vec<School>>,
    pub shared: Option<SharedState>,
    pub rewards: Vec<PendingReward>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_document_may_be_sparse() {
        let p: RemotePlayer = serde_json::from_str(r#"{"coins": 40}"#).unwrap();
        assert_eq!(p.coins, Some(40));
        assert_eq!(p.level, None);
        assert_eq!(p.inventory, None);
    }

    #[test]
    fn full_player_record_reads_as_remote_player() {
        let player = crate::game::Player::new("p1", "Pat");
        let json = serde_json::to_string(&player).unwrap();
        let remote: RemotePlayer = serde_json::from_str(&json).unwrap();
        assert_eq!(remote.id.as_deref(), Some("p1"));
        assert_eq!(remote.level, Some(1));
        assert_eq!(remote.inventory, Some(player.inventory));
    }

    #[test]
    fn shared_state_omits_absent_fields() {
        let shared = SharedState {
            lesson_start: Some(5),
            ..SharedState::default()
        };
        assert_eq!(serde_json::to_string(&shared).unwrap(), r#"{"lesson_start":5}"#);
    }
}
