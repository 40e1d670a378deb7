//! Folding a [`RemoteSnapshot`] into local state.
//!
//! The backend is authoritative for whatever it returned; everything it did
//! not return stays as it is locally. Pending rewards are credited once per
//! id, so a reward re-delivered after a lost acknowledgement is skipped.
//! A tag matured locally stays matured even when the backend still holds an
//! older copy of it.

use std::collections::HashSet;

use log::{debug, info};

use super::wire::{RemotePlayer, RemoteSnapshot};
use crate::game::actions::sync_player_summary;
use crate::game::catalog::APPLIED_REWARD_CAP;
use crate::game::progression::{award, Reward};
use crate::game::types::{push_capped, GameState, Player};
use crate::logutil::escape_log;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub player_merged: bool,
    pub schools_replaced: bool,
    pub shared_fields: usize,
    /// Rewards credited by this merge.
    pub rewards_applied: usize,
    pub levels_gained: u32,
    /// Reward ids to acknowledge, including re-deliveries of ids that were
    /// already applied earlier.
    pub acknowledge: Vec<String>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.player_merged || self.schools_replaced || self.shared_fields > 0 || self.rewards_applied > 0
    }
}

pub fn merge(state: &GameState, snapshot: RemoteSnapshot) -> (GameState, MergeReport) {
    let mut next = state.clone();
    let mut report = MergeReport::default();

    if let Some(remote) = snapshot.player {
        if remote.id.as_deref().map_or(true, |id| id == next.player.id) {
            report.levels_gained += merge_player(&mut next.player, remote);
            report.player_merged = true;
        } else {
            debug!("ignoring player record for another id");
        }
    }

    if let Some(schools) = snapshot.schools {
        if schools.is_empty() {
            debug!("backend returned no schools, keeping local world");
        } else {
            next.schools = schools;
            report.schools_replaced = true;
        }
    }

    if let Some(shared) = snapshot.shared {
        if let Some(mut tags) = shared.active_tags {
            let matured: HashSet<&str> = state
                .active_tags
                .iter()
                .filter(|t| t.is_matured)
                .map(|t| t.id.as_str())
                .collect();
            for tag in tags.iter_mut().filter(|t| matured.contains(t.id.as_str())) {
                tag.is_matured = true;
            }
            next.active_tags = tags;
            dedupe_tags(&mut next);
            report.shared_fields += 1;
        }
        if let Some(logs) = shared.global_logs {
            next.global_logs = logs;
            report.shared_fields += 1;
        }
        if let Some(graffiti) = shared.graffiti {
            next.graffiti = graffiti;
            report.shared_fields += 1;
        }
        if let Some(at) = shared.last_treasure_reset {
            next.last_treasure_reset = at;
            report.shared_fields += 1;
        }
        if let Some(at) = shared.lesson_start {
            next.lesson_start = at;
            report.shared_fields += 1;
        }
    }

    for reward in snapshot.rewards {
        if reward.player_id != next.player.id {
            continue;
        }
        report.acknowledge.push(reward.id.clone());
        if next.applied_reward_ids.contains(&reward.id) {
            debug!("reward {} already applied", reward.id);
            continue;
        }
        let p = &mut next.player;
        report.levels_gained += award(
            &mut p.level,
            &mut p.xp,
            &mut p.coins,
            Reward::new(reward.xp, reward.coins),
        );
        info!(
            "applied reward {} (+{} xp, +{} coins): {}",
            reward.id,
            reward.xp,
            reward.coins,
            escape_log(&reward.reason)
        );
        push_capped(&mut next.applied_reward_ids, reward.id, APPLIED_REWARD_CAP);
        report.rewards_applied += 1;
    }

    sync_player_summary(&mut next);
    (next, report)
}

/// Overwrite the fields the backend sent, then settle the level against the
/// resulting xp. Returns levels gained.
fn merge_player(player: &mut Player, remote: RemotePlayer) -> u32 {
    if let Some(level) = remote.level {
        player.level = level.max(1);
    }
    if let Some(xp) = remote.xp {
        player.xp = xp;
    }
    if let Some(coins) = remote.coins {
        player.coins = coins;
    }
    if let Some(fatigue) = remote.fatigue {
        player.fatigue = fatigue.max(0.0);
    }
    if let Some(inventory) = remote.inventory {
        player.inventory = inventory;
    }
    if let Some(level) = remote.backpack_level {
        player.backpack_level = level.max(1);
    }
    if let Some(stats) = remote.stats {
        player.stats = stats;
    }
    if let Some(school_id) = remote.school_id {
        player.school_id = Some(school_id);
    }
    award(&mut player.level, &mut player.xp, &mut player.coins, Reward::default())
}

/// Keep the first tag per desk.
fn dedupe_tags(state: &mut GameState) {
    let mut seen = HashSet::new();
    state.active_tags.retain(|t| seen.insert(t.key()));
}
