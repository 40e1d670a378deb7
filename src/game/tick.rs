//! Time-driven effects, run once per tick (one second by default).
//!
//! A tick decays fatigue, matures due tags, redistributes treasure when the
//! interval has passed and rolls the lesson over. Everything happens in one
//! transform so a tick is applied entirely or not at all.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use super::actions::{credit_member, credit_school};
use super::catalog::{MATURE_SCHOOL_POINTS_PER_POWER, XP_PER_TOOL_POWER};
use super::progression::{decay_fatigue, Reward};
use super::settings::{GameSettings, TreasureSettings};
use super::types::{ActivityLog, DeskKey, GameState, Millis};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Fatigue removed this tick.
    pub fatigue_decayed: f64,
    /// Ids of tags that matured on this tick.
    pub matured: Vec<String>,
    /// `Some(n)` when treasure was redistributed, with the count placed.
    pub treasures_placed: Option<usize>,
    pub lesson_rolled: bool,
}

impl TickReport {
    /// True when the tick did more than decay fatigue.
    pub fn has_events(&self) -> bool {
        !self.matured.is_empty() || self.treasures_placed.is_some() || self.lesson_rolled
    }
}

pub fn advance<R: Rng + ?Sized>(
    state: &GameState,
    now: Millis,
    settings: &GameSettings,
    rng: &mut R,
) -> (GameState, TickReport) {
    let mut next = state.clone();
    let mut report = TickReport::default();

    let before = next.player.fatigue;
    next.player.fatigue = decay_fatigue(before);
    report.fatigue_decayed = before - next.player.fatigue;

    report.matured = mature_tags(&mut next, now);

    if now - next.last_treasure_reset >= settings.treasure.interval_ms {
        report.treasures_placed = Some(redistribute_treasure(&mut next, &settings.treasure, rng));
        next.last_treasure_reset = now;
    }

    if now - next.lesson_start >= settings.lesson_duration_ms {
        roll_lesson(&mut next, now);
        report.lesson_rolled = true;
    }

    (next, report)
}

/// Mark every due tag matured and pay its creator. A tag already marked is
/// skipped, so running the sweep again never pays twice.
pub fn mature_tags(state: &mut GameState, now: Millis) -> Vec<String> {
    let due: Vec<usize> = state
        .active_tags
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_matured && t.is_due(now))
        .map(|(i, _)| i)
        .collect();

    let mut matured = Vec::with_capacity(due.len());
    for idx in due {
        state.active_tags[idx].is_matured = true;
        let tag = state.active_tags[idx].clone();

        let reward = Reward::new(tag.tool_power as u64 * XP_PER_TOOL_POWER, tag.tool_cost);
        credit_member(state, &tag.creator_id, reward);

        let creator_school = tag
            .creator_school_id
            .clone()
            .or_else(|| state.school_of_member(&tag.creator_id).map(|s| s.id.clone()));
        if let Some(school_id) = creator_school {
            credit_school(
                state,
                &school_id,
                MATURE_SCHOOL_POINTS_PER_POWER * tag.tool_power as u64,
                now,
            );
        }

        let where_ = state
            .school(&tag.school_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| tag.school_id.clone());
        let msg = format!("{}'s tag at {} has fully dried", tag.creator_name, where_);
        state.log(ActivityLog::new(now, &tag.creator_id, msg));
        matured.push(tag.id);
    }
    matured
}

/// Clear all hidden treasure and hide fresh treasure in untagged desks.
/// Returns how many were placed.
pub fn redistribute_treasure<R: Rng + ?Sized>(
    state: &mut GameState,
    settings: &TreasureSettings,
    rng: &mut R,
) -> usize {
    let tagged: HashSet<DeskKey> = state.active_tags.iter().map(|t| t.key()).collect();
    let mut placed = 0;

    for school in state.schools.iter_mut() {
        for room in school.classrooms.iter_mut() {
            for desk in room.desks.iter_mut() {
                desk.treasure = None;
            }
            let eligible: Vec<usize> = room
                .desks
                .iter()
                .filter(|d| !tagged.contains(&DeskKey::new(&school.id, &room.id, d.id)))
                .map(|d| d.id)
                .collect();
            if eligible.is_empty() {
                continue;
            }

            let mut here = 0;
            let mut attempts = 0;
            while here < settings.per_classroom && attempts < settings.max_attempts {
                attempts += 1;
                let desk_id = eligible[rng.gen_range(0..eligible.len())];
                let Some(desk) = room.desk_mut(desk_id) else {
                    continue;
                };
                if desk.treasure.is_some() {
                    continue;
                }
                if let Some(treasure) = settings.roll(rng) {
                    desk.treasure = Some(treasure);
                    here += 1;
                }
            }
            placed += here;
        }
    }
    debug!("treasure redistributed: {} placed", placed);
    placed
}

fn roll_lesson(state: &mut GameState, now: Millis) {
    state.lesson_start = now;
    for school in state.schools.iter_mut() {
        for room in school.classrooms.iter_mut() {
            for desk in room.desks.iter_mut() {
                desk.dirty = false;
            }
        }
    }
    state.log(ActivityLog::new(now, "system", "The bell rings. Splodges mopped up."));
}
