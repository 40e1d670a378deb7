//! Fixed starting world used when no usable snapshot exists.

use std::collections::HashSet;

use super::catalog::{item, DESKS_PER_CLASSROOM, MAX_BACKPACK_LEVEL};
use super::progression::{award, school_threshold, sync_classrooms, Reward};
use super::types::{ActivityLog, Desk, GameState, MemberSummary, Millis, Player, School, Tag};

struct SchoolSeed {
    id: &'static str,
    name: &'static str,
    level: u32,
    principal: (&'static str, &'static str),
    members: [(&'static str, &'static str, u32); 3],
}

const ROSTER: [SchoolSeed; 4] = [
    SchoolSeed {
        id: "oakridge",
        name: "Oakridge High",
        level: 1,
        principal: ("oakridge-hart", "Ms. Hart"),
        members: [
            ("oakridge-jonno", "Jonno", 1),
            ("oakridge-priya", "Priya", 2),
            ("oakridge-dex", "Dex", 1),
        ],
    },
    SchoolSeed {
        id: "maple",
        name: "Maple Academy",
        level: 2,
        principal: ("maple-ovens", "Mr. Ovens"),
        members: [
            ("maple-tilly", "Tilly", 2),
            ("maple-sam", "Sam", 1),
            ("maple-rae", "Rae", 3),
        ],
    },
    SchoolSeed {
        id: "riverside",
        name: "Riverside Prep",
        level: 1,
        principal: ("riverside-kaur", "Dr. Kaur"),
        members: [
            ("riverside-milo", "Milo", 1),
            ("riverside-zed", "Zed", 2),
            ("riverside-ana", "Ana", 1),
        ],
    },
    SchoolSeed {
        id: "hillcrest",
        name: "Hillcrest Secondary",
        level: 3,
        principal: ("hillcrest-bloom", "Mrs. Bloom"),
        members: [
            ("hillcrest-finn", "Finn", 3),
            ("hillcrest-lou", "Lou", 2),
            ("hillcrest-kit", "Kit", 1),
        ],
    },
];

const NPC_STARTING_COINS: u64 = 150;

pub fn seed_schools() -> Vec<School> {
    ROSTER
        .iter()
        .map(|seed| {
            let (principal_id, principal_name) = seed.principal;
            let mut members = vec![MemberSummary::simulated(
                principal_id,
                principal_name,
                seed.level + 1,
                NPC_STARTING_COINS,
            )];
            members.extend(
                seed.members
                    .iter()
                    .map(|(id, name, level)| MemberSummary::simulated(id, name, *level, NPC_STARTING_COINS)),
            );
            let mut school = School {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                level: seed.level,
                school_points: school_threshold(seed.level),
                classrooms: Vec::new(),
                principal_id: principal_id.to_string(),
                principal_name: principal_name.to_string(),
                members,
            };
            sync_classrooms(&mut school);
            school
        })
        .collect()
}

/// New session for a first-time player: seeded world, no school yet.
pub fn fresh_state(player_id: &str, player_name: &str, now: Millis) -> GameState {
    let mut state = GameState {
        player: Player::new(player_id, player_name),
        schools: seed_schools(),
        last_treasure_reset: 0,
        lesson_start: now,
        ..GameState::default()
    };
    state.log(ActivityLog::new(now, "system", "A new term begins."));
    state
}

/// Bring a snapshot written by an older build up to the current shape.
/// Missing fields were already defaulted by serde; this fixes the values
/// that have to agree with each other. Records left without an address are
/// dropped one by one, never the whole snapshot.
pub fn repair(state: &mut GameState, now: Millis) {
    state.schools.retain(|s| !s.id.is_empty());
    if state.schools.is_empty() {
        state.schools = seed_schools();
    }
    for school in state.schools.iter_mut() {
        school.level = school.level.max(1);
        school.members.retain(|m| !m.id.is_empty());
        school.classrooms.retain(|c| !c.id.is_empty());
        sync_classrooms(school);
        for room in school.classrooms.iter_mut() {
            let mut desk_ids = HashSet::new();
            room.desks.retain(|d| desk_ids.insert(d.id));
            for id in 0..DESKS_PER_CLASSROOM {
                if room.desk(id).is_none() {
                    room.desks.push(Desk {
                        id,
                        ..Desk::default()
                    });
                }
            }
        }
    }
    if state.lesson_start == 0 {
        state.lesson_start = now;
    }

    let p = &mut state.player;
    p.level = p.level.max(1);
    p.backpack_level = p.backpack_level.clamp(1, MAX_BACKPACK_LEVEL);
    if !p.fatigue.is_finite() || p.fatigue < 0.0 {
        p.fatigue = 0.0;
    }
    award(&mut p.level, &mut p.xp, &mut p.coins, Reward::default());

    if let Some(school_id) = state.player.school_id.clone() {
        if state.school(&school_id).is_none() {
            state.player.school_id = None;
        }
    }

    state
        .active_tags
        .retain(|t| !t.school_id.is_empty() && !t.class_id.is_empty());
    for tag in state.active_tags.iter_mut() {
        repair_tag(tag);
    }
    let mut seen = HashSet::new();
    state.active_tags.retain(|t| seen.insert(t.key()));

    for entry in state.global_logs.iter_mut().filter(|l| l.id.is_empty()) {
        entry.id = uuid::Uuid::new_v4().to_string();
    }
    for mark in state.graffiti.iter_mut().filter(|g| g.id.is_empty()) {
        mark.id = uuid::Uuid::new_v4().to_string();
    }
}

fn repair_tag(tag: &mut Tag) {
    if tag.id.is_empty() {
        tag.id = uuid::Uuid::new_v4().to_string();
    }
    if let Some(tool) = item(&tag.tool_id) {
        if tag.tool_power == 0 {
            tag.tool_power = tool.power;
        }
        if tag.tool_cost == 0 {
            tag.tool_cost = tool.cost;
        }
        if tag.duration_ms <= 0 {
            tag.duration_ms = tool.duration_ms;
        }
    }
    if tag.total_cost == 0 {
        tag.total_cost = tag.tool_cost;
    }
}
