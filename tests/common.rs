//! Shared fixtures: seeded states, hand-placed tags and an in-memory backend.
#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use deskwars::game::actions::apply;
use deskwars::game::seed::fresh_state;
use deskwars::game::types::{Player, School, Tag};
use deskwars::game::{GameAction, GameState, Millis};
use deskwars::sync::{PendingReward, RemoteBackend, RemotePlayer, SharedState};

/// Fresh world with player `p1` ("Pat") enrolled in `school_id`.
pub fn enrolled(school_id: &str) -> GameState {
    let state = fresh_state("p1", "Pat", 0);
    let join = GameAction::JoinSchool {
        school_id: school_id.to_string(),
    };
    apply(&state, &join, 0).expect("join").0
}

/// A tag by a roster member, placed directly into the state.
pub fn roster_tag(
    creator_id: &str,
    creator_school: &str,
    at: (&str, &str, usize),
    tool: (&str, u32, u64),
    total_cost: u64,
    start: Millis,
    duration_ms: i64,
) -> Tag {
    Tag {
        id: format!("tag-{}-{}-{}", at.0, at.1, at.2),
        school_id: at.0.to_string(),
        class_id: at.1.to_string(),
        desk_id: at.2,
        creator_id: creator_id.to_string(),
        creator_name: creator_id.to_string(),
        creator_school_id: Some(creator_school.to_string()),
        tool_id: tool.0.to_string(),
        tool_power: tool.1,
        tool_cost: tool.2,
        total_cost,
        start_time: start,
        duration_ms,
        is_matured: false,
    }
}

#[derive(Default)]
pub struct FakeState {
    pub player: Option<RemotePlayer>,
    pub schools: Vec<School>,
    pub shared: SharedState,
    pub rewards: Vec<PendingReward>,
    pub acked: Vec<String>,
    pub pushed_players: Vec<Player>,
    pub pushed_schools: usize,
    pub pushed_shared: usize,
    pub fail_schools: bool,
}

/// In-memory backend. Acknowledged rewards stay queued when
/// `keep_acked_rewards` is set, to mimic a lost acknowledgement.
#[derive(Default)]
pub struct FakeBackend {
    pub inner: Mutex<FakeState>,
    pub keep_acked_rewards: bool,
}

impl FakeBackend {
    pub fn with(f: impl FnOnce(&mut FakeState)) -> Self {
        let backend = FakeBackend::default();
        f(&mut backend.inner.lock().unwrap());
        backend
    }

    pub fn read<T>(&self, f: impl FnOnce(&FakeState) -> T) -> T {
        f(&self.inner.lock().unwrap())
    }
}

impl RemoteBackend for FakeBackend {
    async fn fetch_player(&self, _player_id: &str) -> Result<Option<RemotePlayer>> {
        Ok(self.inner.lock().unwrap().player.clone())
    }

    async fn push_player(&self, player: &Player) -> Result<()> {
        self.inner.lock().unwrap().pushed_players.push(player.clone());
        Ok(())
    }

    async fn fetch_schools(&self) -> Result<Vec<School>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_schools {
            return Err(anyhow!("schools endpoint down"));
        }
        Ok(inner.schools.clone())
    }

    async fn push_schools(&self, _schools: &[School]) -> Result<()> {
        self.inner.lock().unwrap().pushed_schools += 1;
        Ok(())
    }

    async fn fetch_shared(&self) -> Result<SharedState> {
        Ok(self.inner.lock().unwrap().shared.clone())
    }

    async fn push_shared(&self, _shared: &SharedState) -> Result<()> {
        self.inner.lock().unwrap().pushed_shared += 1;
        Ok(())
    }

    async fn fetch_rewards(&self, player_id: &str) -> Result<Vec<PendingReward>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rewards
            .iter()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn ack_rewards(&self, _player_id: &str, ids: &[String]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.acked.extend(ids.iter().cloned());
        if !self.keep_acked_rewards {
            inner.rewards.retain(|r| !ids.contains(&r.id));
        }
        Ok(())
    }
}
