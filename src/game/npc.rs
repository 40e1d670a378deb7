//! Ambient activity from simulated roster members.
//!
//! Once a minute each school lets up to two of its non-player members act:
//! most of the time they tag a free desk somewhere else, otherwise they
//! scrub a rival tag off their own desks. Payouts go through the same
//! crediting path as player actions, so a simulated clean of the player's
//! tag pays the player its partial reward.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use super::actions::{credit_member, credit_school, remove_tag_with_payout};
use super::catalog::{self, CLEAN_SCHOOL_POINTS, CLEAN_XP_PER_POWER};
use super::progression::Reward;
use super::types::{ActivityLog, DeskKey, GameState, MemberSummary, Millis, Tag};

pub const MAX_ACTORS_PER_SCHOOL: usize = 2;
pub const TAG_CHANCE: f64 = 0.6;
const DESK_PICK_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpcReport {
    pub tags_placed: usize,
    pub tags_cleaned: usize,
    /// Cleans that removed a tag belonging to the local player.
    pub player_tags_cleaned: usize,
}

impl NpcReport {
    pub fn is_empty(&self) -> bool {
        self.tags_placed == 0 && self.tags_cleaned == 0
    }
}

pub fn simulate<R: Rng + ?Sized>(state: &GameState, now: Millis, rng: &mut R) -> (GameState, NpcReport) {
    let mut next = state.clone();
    let mut report = NpcReport::default();
    let school_ids: Vec<String> = next.schools.iter().map(|s| s.id.clone()).collect();

    for school_id in &school_ids {
        let actors: Vec<MemberSummary> = match next.school(school_id) {
            Some(school) => school
                .members
                .iter()
                .filter(|m| !m.is_player && m.id != next.player.id)
                .cloned()
                .collect(),
            None => continue,
        };
        if actors.is_empty() {
            continue;
        }
        let count = rng.gen_range(0..=MAX_ACTORS_PER_SCHOOL.min(actors.len()));
        let chosen: Vec<MemberSummary> = actors.choose_multiple(rng, count).cloned().collect();

        for actor in chosen {
            if rng.gen_bool(TAG_CHANCE) {
                if tag_rival_desk(&mut next, school_id, &actor.id, now, rng) {
                    report.tags_placed += 1;
                }
            } else if let Some(was_player) = clean_home_desk(&mut next, school_id, &actor.id, now, rng) {
                report.tags_cleaned += 1;
                if was_player {
                    report.player_tags_cleaned += 1;
                }
            }
        }
    }

    if !report.is_empty() {
        debug!(
            "npc round: {} tagged, {} cleaned ({} of the player's)",
            report.tags_placed, report.tags_cleaned, report.player_tags_cleaned
        );
    }
    (next, report)
}

fn tag_rival_desk<R: Rng + ?Sized>(
    state: &mut GameState,
    home_id: &str,
    actor_id: &str,
    now: Millis,
    rng: &mut R,
) -> bool {
    let Some(actor) = state.school(home_id).and_then(|s| s.member(actor_id)).cloned() else {
        return false;
    };
    let tools: Vec<&'static catalog::ItemSpec> = catalog::tag_tools()
        .filter(|t| t.power <= actor.level.max(1) && t.cost <= actor.coins)
        .collect();
    let Some(tool) = tools.choose(rng).copied() else {
        return false;
    };

    let rivals: Vec<String> = state
        .schools
        .iter()
        .filter(|s| s.id != home_id && !s.classrooms.is_empty())
        .map(|s| s.id.clone())
        .collect();
    let Some(target_id) = rivals.choose(rng).cloned() else {
        return false;
    };

    let mut key = None;
    for _ in 0..DESK_PICK_ATTEMPTS {
        let Some(room) = state.school(&target_id).and_then(|s| s.classrooms.choose(rng)) else {
            break;
        };
        let Some(desk) = room.desks.choose(rng) else {
            continue;
        };
        let candidate = DeskKey::new(&target_id, &room.id, desk.id);
        if state.tag_at(&candidate).is_none() {
            key = Some(candidate);
            break;
        }
    }
    let Some(key) = key else {
        return false;
    };

    if let Some(member) = state.school_mut(home_id).and_then(|s| s.member_mut(actor_id)) {
        member.coins -= tool.cost;
        member.tags_placed += 1;
    }
    state.active_tags.push(Tag {
        id: uuid::Uuid::new_v4().to_string(),
        school_id: key.school_id.clone(),
        class_id: key.class_id.clone(),
        desk_id: key.desk_id,
        creator_id: actor.id.clone(),
        creator_name: actor.name.clone(),
        creator_school_id: Some(home_id.to_string()),
        tool_id: tool.id.to_string(),
        tool_power: tool.power,
        tool_cost: tool.cost,
        total_cost: tool.cost,
        start_time: now,
        duration_ms: tool.duration_ms,
        is_matured: false,
    });
    let target_name = state
        .school(&target_id)
        .map(|s| s.name.clone())
        .unwrap_or(target_id);
    let msg = format!("{} tagged a desk at {}", actor.name, target_name);
    state.log(ActivityLog::new(now, &actor.id, msg));
    true
}

/// Returns `Some(true)` when the removed tag was the local player's.
fn clean_home_desk<R: Rng + ?Sized>(
    state: &mut GameState,
    home_id: &str,
    actor_id: &str,
    now: Millis,
    rng: &mut R,
) -> Option<bool> {
    let actor_name = state.school(home_id)?.member(actor_id)?.name.clone();
    let targets: Vec<DeskKey> = state
        .active_tags
        .iter()
        .filter(|t| t.school_id == home_id && t.creator_id != actor_id)
        .map(|t| t.key())
        .collect();
    let key = targets.choose(rng)?.clone();

    let (tag, _) = remove_tag_with_payout(state, &key, now)?;
    if let Some(desk) = state.desk_mut(&key) {
        desk.dirty = true;
    }
    if let Some(member) = state.school_mut(home_id).and_then(|s| s.member_mut(actor_id)) {
        member.tags_cleaned += 1;
    }
    credit_member(state, actor_id, Reward::new(CLEAN_XP_PER_POWER * tag.tool_power as u64, 0));
    credit_school(state, home_id, CLEAN_SCHOOL_POINTS, now);
    let msg = format!("{} scrubbed {}'s tag off a desk", actor_name, tag.creator_name);
    state.log(ActivityLog::new(now, actor_id, msg));
    Some(tag.creator_id == state.player.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seed::fresh_state;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn simulation_keeps_one_tag_per_desk() {
        let mut state = fresh_state("p1", "Pat", 0);
        let mut rng = StdRng::seed_from_u64(42);
        for round in 0..50 {
            state = simulate(&state, round * 60_000, &mut rng).0;
            let mut keys: Vec<DeskKey> = state.active_tags.iter().map(|t| t.key()).collect();
            let total = keys.len();
            keys.sort_by_key(|k| k.to_string());
            keys.dedup();
            assert_eq!(keys.len(), total);
        }
        assert!(!state.active_tags.is_empty());
    }

    #[test]
    fn npcs_never_tag_their_own_school() {
        let mut state = fresh_state("p1", "Pat", 0);
        let mut rng = StdRng::seed_from_u64(5);
        for round in 0..20 {
            state = simulate(&state, round, &mut rng).0;
        }
        for tag in &state.active_tags {
            assert_ne!(tag.creator_school_id.as_deref(), Some(tag.school_id.as_str()));
        }
    }

    #[test]
    fn broke_members_do_not_tag() {
        let mut state = fresh_state("p1", "Pat", 0);
        for school in state.schools.iter_mut() {
            for m in school.members.iter_mut() {
                m.coins = 0;
            }
        }
        let mut rng = StdRng::seed_from_u64(11);
        let (next, report) = simulate(&state, 0, &mut rng);
        assert_eq!(report.tags_placed, 0);
        assert!(next.active_tags.is_empty());
    }
}
