//! The single owner of live game state.
//!
//! Every change goes through [`GameStateStore::apply_update`] or one of the
//! named wrappers built on it. A transform sees the state as it is at the
//! moment it runs, returns a complete successor, and the store swaps it in,
//! writes the snapshot and bumps the metrics. A rejected transform changes
//! nothing. The store is not shared directly; the session wraps it in a
//! task (see [`super::handle`]) so updates are applied one at a time.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::seed::{fresh_state, repair};
use crate::game::types::Player;
use crate::game::{
    actions, admin, npc, tick, ActionOutcome, AdminCommand, GameAction, GameError, GameSettings, GameState,
    Millis, NpcReport, TickReport,
};
use crate::metrics;
use crate::storage::{SnapshotStorage, StorageError};
use crate::sync::{merge, MergeReport, RemoteSnapshot};

/// Identity of the player on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
}

pub struct GameStateStore {
    state: GameState,
    settings: GameSettings,
    storage: Option<SnapshotStorage>,
    rng: StdRng,
}

impl GameStateStore {
    /// In-memory store; nothing is written to disk.
    pub fn new(state: GameState, settings: GameSettings) -> Self {
        Self {
            state,
            settings,
            storage: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Open the snapshot in `storage`, falling back to a freshly seeded
    /// world when it is missing, unreadable or belongs to someone else.
    pub fn open(storage: SnapshotStorage, profile: &PlayerProfile, settings: GameSettings, now: Millis) -> Self {
        let state = match storage.load() {
            Ok(Some(mut state)) => {
                if state.player.id != profile.id {
                    info!("snapshot belongs to another player, starting a new profile");
                    state.player = Player::new(&profile.id, &profile.name);
                    state.applied_reward_ids.clear();
                }
                repair(&mut state, now);
                debug!("resumed session for {}", profile.id);
                state
            }
            Ok(None) => {
                info!("no snapshot at {}, seeding a new world", storage.path().display());
                fresh_state(&profile.id, &profile.name, now)
            }
            Err(e) => {
                warn!("snapshot unusable ({}), seeding a new world", e);
                fresh_state(&profile.id, &profile.name, now)
            }
        };
        Self::new(state, settings).with_storage(storage)
    }

    pub fn with_storage(mut self, storage: SnapshotStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the RNG, e.g. with a seeded one for reproducible runs.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn apply_update<F>(&mut self, transform: F) -> Result<(), GameError>
    where
        F: FnOnce(&GameState) -> Result<GameState, GameError>,
    {
        self.apply_update_with(|state| transform(state).map(|next| (next, ())))
    }

    /// Like [`apply_update`](Self::apply_update) for transforms that also
    /// report something back.
    pub fn apply_update_with<T, F>(&mut self, transform: F) -> Result<T, GameError>
    where
        F: FnOnce(&GameState) -> Result<(GameState, T), GameError>,
    {
        match transform(&self.state) {
            Ok((next, out)) => {
                self.commit(next);
                Ok(out)
            }
            Err(e) => {
                metrics::inc_updates_rejected();
                debug!("update rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn dispatch(&mut self, action: &GameAction, now: Millis) -> Result<ActionOutcome, GameError> {
        self.apply_update_with(|state| actions::apply(state, action, now))
    }

    pub fn tick(&mut self, now: Millis) -> TickReport {
        let (next, report) = tick::advance(&self.state, now, &self.settings, &mut self.rng);
        metrics::add_tags_matured(report.matured.len() as u64);
        self.state = next;
        // Decay alone is not worth a disk write every second.
        if report.has_events() {
            metrics::inc_updates_applied();
            self.save();
        }
        report
    }

    pub fn simulate_npcs(&mut self, now: Millis) -> NpcReport {
        let (next, report) = npc::simulate(&self.state, now, &mut self.rng);
        if !report.is_empty() {
            self.commit(next);
        }
        report
    }

    pub fn merge_remote(&mut self, snapshot: RemoteSnapshot) -> MergeReport {
        let (next, report) = merge(&self.state, snapshot);
        metrics::add_rewards_applied(report.rewards_applied as u64);
        if report.changed() {
            self.commit(next);
        }
        report
    }

    /// Returns true when game state changed, false for settings-only
    /// commands.
    pub fn admin(&mut self, cmd: &AdminCommand, now: Millis) -> Result<bool, GameError> {
        match admin::apply(&self.state, &mut self.settings, cmd, now, &mut self.rng) {
            Ok(Some(next)) => {
                self.commit(next);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                metrics::inc_updates_rejected();
                Err(e)
            }
        }
    }

    /// Write the snapshot now. A store without storage succeeds trivially.
    pub fn persist(&self) -> Result<(), StorageError> {
        match &self.storage {
            Some(storage) => storage.save(&self.state),
            None => Ok(()),
        }
    }

    fn commit(&mut self, next: GameState) {
        self.state = next;
        metrics::inc_updates_applied();
        self.save();
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            warn!("failed to save snapshot: {}", e);
        }
    }
}
