mod common;

use common::enrolled;
use deskwars::game::actions::apply;
use deskwars::game::npc::simulate;
use deskwars::game::types::DeskKey;
use deskwars::game::{GameAction, GameState};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Empty every simulated wallet so roster members can only clean.
fn broke(mut state: GameState) -> GameState {
    for school in state.schools.iter_mut() {
        for member in school.members.iter_mut().filter(|m| !m.is_player) {
            member.coins = 0;
        }
    }
    state
}

#[test]
fn scrubbed_player_tag_pays_the_player() {
    let state = enrolled("oakridge");
    let tag = GameAction::Tag {
        school_id: "maple".into(),
        class_id: "math".into(),
        desk_id: 0,
        tool_id: "marker".into(),
    };
    let (state, _) = apply(&state, &tag, 0).unwrap();
    let mut state = broke(state);
    assert_eq!(state.player.coins, 90);

    let mut rng = StdRng::seed_from_u64(7);
    let mut cleaned = None;
    for _ in 0..500 {
        let (next, report) = simulate(&state, 30_000, &mut rng);
        state = next;
        if report.player_tags_cleaned > 0 {
            cleaned = Some(report);
            break;
        }
    }
    let report = cleaned.expect("a maple member should scrub the tag eventually");
    assert_eq!(report.tags_placed, 0);
    assert!(state.active_tags.is_empty());
    assert!(state.desk(&DeskKey::new("maple", "math", 0)).unwrap().dirty);
    // Half dried: 10 xp * 0.5 and 10 coins * 0.5 / 2.
    assert_eq!(state.player.xp, 5);
    assert_eq!(state.player.coins, 92);
    assert_eq!(state.school("oakridge").unwrap().member("p1").unwrap().coins, 92);
}

#[test]
fn player_roster_entry_is_never_driven() {
    let mut state = enrolled("oakridge");
    let mut rng = StdRng::seed_from_u64(3);
    for round in 0..100 {
        state = simulate(&state, round * 60_000, &mut rng).0;
    }
    let me = state.school("oakridge").unwrap().member("p1").unwrap();
    assert_eq!(me.tags_placed, 0);
    assert_eq!(me.tags_cleaned, 0);
    assert!(state.active_tags.iter().all(|t| t.creator_id != "p1"));
    assert_eq!(state.player.coins, 100);
}

#[test]
fn members_never_tag_their_own_school() {
    let mut state = enrolled("oakridge");
    let mut rng = StdRng::seed_from_u64(11);
    for round in 0..100 {
        state = simulate(&state, round * 60_000, &mut rng).0;
        for tag in &state.active_tags {
            assert_ne!(tag.creator_school_id.as_deref(), Some(tag.school_id.as_str()));
        }
    }
}
