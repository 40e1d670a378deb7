mod common;

use common::{enrolled, roster_tag};
use deskwars::game::actions::{apply, ActionOutcome};
use deskwars::game::progression::Reward;
use deskwars::game::tick::advance;
use deskwars::game::types::DeskKey;
use deskwars::game::{GameAction, GameError, GameSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn tag_action(school: &str, class: &str, desk: usize, tool: &str) -> GameAction {
    GameAction::Tag {
        school_id: school.into(),
        class_id: class.into(),
        desk_id: desk,
        tool_id: tool.into(),
    }
}

#[test]
fn a_desk_holds_one_tag() {
    let state = enrolled("oakridge");
    let (state, outcome) = apply(&state, &tag_action("maple", "math", 0, "marker"), 0).unwrap();
    assert!(matches!(outcome, ActionOutcome::Tagged { cost: 10, .. }));
    assert_eq!(state.player.coins, 90);

    let again = apply(&state, &tag_action("maple", "math", 0, "marker"), 5);
    assert_eq!(again.unwrap_err(), GameError::DeskOccupied);
    let key = DeskKey::new("maple", "math", 0);
    assert_eq!(state.active_tags.iter().filter(|t| t.occupies(&key)).count(), 1);
}

#[test]
fn tagging_needs_the_tool_and_the_coins() {
    let mut state = enrolled("oakridge");
    assert_eq!(
        apply(&state, &tag_action("maple", "math", 0, "spray_can"), 0).unwrap_err(),
        GameError::MissingItem("Spray Can".into())
    );
    state.player.coins = 3;
    let before = state.clone();
    let err = apply(&state, &tag_action("maple", "math", 0, "marker"), 0).unwrap_err();
    assert_eq!(err, GameError::InsufficientFunds { needed: 10, available: 3 });
    assert_eq!(state, before);
}

#[test]
fn cleaning_half_dried_tag_pays_partial_reward() {
    let mut state = enrolled("oakridge");
    state.active_tags.push(roster_tag(
        "maple-tilly",
        "maple",
        ("oakridge", "math", 1),
        ("spray_can", 2, 20),
        30,
        0,
        60_000,
    ));
    let tilly_before = state.school("maple").unwrap().member("maple-tilly").unwrap().clone();

    let clean = GameAction::Clean {
        school_id: "oakridge".into(),
        class_id: "math".into(),
        desk_id: 1,
        tool_id: "sponge".into(),
    };
    let (state, outcome) = apply(&state, &clean, 30_000).unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Cleaned {
            xp: 10,
            fatigue: 10.0,
            creator_reward: Reward::new(10, 7),
        }
    );
    assert!(state.active_tags.is_empty());
    assert!(state.desk(&DeskKey::new("oakridge", "math", 1)).unwrap().dirty);

    let tilly = state.school("maple").unwrap().member("maple-tilly").unwrap();
    assert_eq!(tilly.xp, tilly_before.xp + 10);
    assert_eq!(tilly.coins, tilly_before.coins + 7);
    assert_eq!(state.player.xp, 10);
    assert_eq!(state.player.fatigue, 10.0);
    assert_eq!(state.player.stats.tags_cleaned, 1);
}

#[test]
fn tired_players_cannot_clean() {
    let mut state = enrolled("oakridge");
    state.active_tags.push(roster_tag(
        "maple-sam",
        "maple",
        ("oakridge", "science", 0),
        ("marker", 1, 10),
        10,
        0,
        60_000,
    ));
    state.player.fatigue = 3.0;
    let clean = GameAction::Clean {
        school_id: "oakridge".into(),
        class_id: "science".into(),
        desk_id: 0,
        tool_id: "sponge".into(),
    };
    assert_eq!(apply(&state, &clean, 1).unwrap_err(), GameError::Fatigued(3.0));
}

#[test]
fn own_school_tags_are_cleaned_not_tagged_over() {
    let mut state = enrolled("oakridge");
    state.active_tags.push(roster_tag(
        "maple-sam",
        "maple",
        ("oakridge", "math", 0),
        ("marker", 1, 10),
        10,
        0,
        60_000,
    ));
    let over = GameAction::TagOver {
        school_id: "oakridge".into(),
        class_id: "math".into(),
        desk_id: 0,
        tool_id: "marker".into(),
    };
    assert!(matches!(apply(&state, &over, 1), Err(GameError::WrongSchool(_))));
}

#[test]
fn tag_over_replaces_rival_tag() {
    let mut state = enrolled("oakridge");
    state.active_tags.push(roster_tag(
        "riverside-zed",
        "riverside",
        ("maple", "science", 3),
        ("spray_can", 2, 20),
        20,
        0,
        120_000,
    ));
    let over = GameAction::TagOver {
        school_id: "maple".into(),
        class_id: "science".into(),
        desk_id: 3,
        tool_id: "marker".into(),
    };
    let (state, outcome) = apply(&state, &over, 60_000).unwrap();
    let ActionOutcome::TaggedOver { cost, fatigue, creator_reward, .. } = outcome else {
        panic!("expected TaggedOver");
    };
    assert_eq!(cost, 20);
    assert_eq!(fatigue, 10.0);
    assert_eq!(creator_reward, Reward::new(10, 5));
    assert_eq!(state.active_tags.len(), 1);
    assert_eq!(state.active_tags[0].creator_id, "p1");
    assert_eq!(state.active_tags[0].total_cost, 20);
    assert_eq!(state.player.coins, 80);
}

#[test]
fn maturation_pays_exactly_once() {
    let state = enrolled("oakridge");
    let (state, _) = apply(&state, &tag_action("maple", "math", 0, "marker"), 0).unwrap();
    let settings = GameSettings::default();
    let mut rng = StdRng::seed_from_u64(1);
    let points_before = state.school("oakridge").unwrap().school_points;

    let (early, report) = advance(&state, 59_999, &settings, &mut rng);
    assert!(report.matured.is_empty());
    assert_eq!(early.player.xp, 0);

    let (matured, report) = advance(&early, 60_000, &settings, &mut rng);
    assert_eq!(report.matured.len(), 1);
    assert_eq!(matured.player.xp, 10);
    assert_eq!(matured.player.coins, 100);
    assert_eq!(matured.school("oakridge").unwrap().school_points, points_before + 10);
    assert!(matured.active_tags[0].is_matured);

    let (again, report) = advance(&matured, 90_000, &settings, &mut rng);
    assert!(report.matured.is_empty());
    assert_eq!(again.player.xp, matured.player.xp);
    assert_eq!(again.player.coins, matured.player.coins);
}

#[test]
fn matured_tag_pays_nothing_when_cleaned() {
    let mut state = enrolled("maple");
    let mut tag = roster_tag(
        "oakridge-dex",
        "oakridge",
        ("maple", "math", 2),
        ("marker", 1, 10),
        10,
        0,
        1_000,
    );
    tag.is_matured = true;
    state.active_tags.push(tag);
    let clean = GameAction::Clean {
        school_id: "maple".into(),
        class_id: "math".into(),
        desk_id: 2,
        tool_id: "sponge".into(),
    };
    let (_, outcome) = apply(&state, &clean, 50_000).unwrap();
    let ActionOutcome::Cleaned { creator_reward, fatigue, .. } = outcome else {
        panic!("expected Cleaned");
    };
    assert_eq!(creator_reward, Reward::default());
    assert_eq!(fatigue, 5.0);
}
