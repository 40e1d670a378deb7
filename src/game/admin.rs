//! Operator overrides.
//!
//! Treasure tuning changes the store's [`GameSettings`] only and is never
//! written to the snapshot; a restart goes back to the configured values.
//! The remaining commands are ordinary state transforms.

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actions::remove_school;
use super::errors::GameError;
use super::settings::{validate_weights, GameSettings, TreasureWeight};
use super::tick::redistribute_treasure;
use super::types::{ActivityLog, GameState, Millis};
use crate::logutil::escape_log;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum AdminCommand {
    SetTreasureWeights(Vec<TreasureWeight>),
    SetTreasureInterval(i64),
    /// Redistribute now instead of waiting for the interval.
    ForceTreasureReset,
    SetEasterEggs(bool),
    DeleteSchool(String),
}

/// Apply `cmd`. Returns the successor state when the command touched game
/// state, `None` when only settings changed.
pub fn apply<R: Rng + ?Sized>(
    state: &GameState,
    settings: &mut GameSettings,
    cmd: &AdminCommand,
    now: Millis,
    rng: &mut R,
) -> Result<Option<GameState>, GameError> {
    match cmd {
        AdminCommand::SetTreasureWeights(weights) => {
            validate_weights(weights)?;
            settings.treasure.weights = weights.clone();
            info!("admin: treasure weights replaced ({} entries)", weights.len());
            Ok(None)
        }
        AdminCommand::SetTreasureInterval(ms) => {
            if *ms <= 0 {
                return Err(GameError::InvalidSetting(
                    "treasure interval must be positive".into(),
                ));
            }
            settings.treasure.interval_ms = *ms;
            info!("admin: treasure interval set to {}ms", ms);
            Ok(None)
        }
        AdminCommand::ForceTreasureReset => {
            let mut next = state.clone();
            let placed = redistribute_treasure(&mut next, &settings.treasure, rng);
            next.last_treasure_reset = now;
            info!("admin: forced treasure reset, {} placed", placed);
            Ok(Some(next))
        }
        AdminCommand::SetEasterEggs(enabled) => {
            let mut next = state.clone();
            next.easter_eggs_enabled = *enabled;
            Ok(Some(next))
        }
        AdminCommand::DeleteSchool(school_id) => {
            let mut next = state.clone();
            let name = state
                .school(school_id)
                .map(|s| s.name.clone())
                .ok_or_else(|| GameError::SchoolNotFound(school_id.clone()))?;
            remove_school(&mut next, school_id);
            info!("admin: deleted school {}", escape_log(&name));
            next.log(ActivityLog::new(now, "system", format!("{} was closed down", name)));
            Ok(Some(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seed::fresh_state;
    use crate::game::types::TreasureKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn weights_change_settings_only() {
        let state = fresh_state("p1", "Pat", 0);
        let mut settings = GameSettings::default();
        let mut rng = StdRng::seed_from_u64(0);
        let weights = vec![TreasureWeight {
            kind: TreasureKind::Xp,
            weight: 1,
            min_amount: 5,
            max_amount: 5,
        }];
        let out = apply(&state, &mut settings, &AdminCommand::SetTreasureWeights(weights.clone()), 0, &mut rng)
            .unwrap();
        assert!(out.is_none());
        assert_eq!(settings.treasure.weights, weights);
    }

    #[test]
    fn bad_settings_rejected() {
        let state = fresh_state("p1", "Pat", 0);
        let mut settings = GameSettings::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(apply(&state, &mut settings, &AdminCommand::SetTreasureWeights(vec![]), 0, &mut rng).is_err());
        assert!(apply(&state, &mut settings, &AdminCommand::SetTreasureInterval(0), 0, &mut rng).is_err());
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn delete_school_drops_its_tags_and_player_membership() {
        let mut state = fresh_state("p1", "Pat", 0);
        state.player.school_id = Some("maple".into());
        let mut settings = GameSettings::default();
        let mut rng = StdRng::seed_from_u64(0);
        let next = apply(&state, &mut settings, &AdminCommand::DeleteSchool("maple".into()), 5, &mut rng)
            .unwrap()
            .unwrap();
        assert!(next.school("maple").is_none());
        assert_eq!(next.player.school_id, None);
        assert!(apply(&next, &mut settings, &AdminCommand::DeleteSchool("maple".into()), 6, &mut rng).is_err());
    }
}
