mod common;

use common::{enrolled, roster_tag};
use deskwars::game::types::TreasureKind;
use deskwars::game::{AdminCommand, GameError, GameSettings, TreasureWeight};
use deskwars::session::{GameStateStore, PlayerProfile};
use deskwars::storage::SnapshotStorage;
use tempfile::TempDir;

fn profile() -> PlayerProfile {
    PlayerProfile {
        id: "p1".into(),
        name: "Pat".into(),
    }
}

fn xp_only() -> Vec<TreasureWeight> {
    vec![TreasureWeight {
        kind: TreasureKind::Xp,
        weight: 1,
        min_amount: 15,
        max_amount: 15,
    }]
}

#[test]
fn treasure_overrides_last_until_restart() {
    let dir = TempDir::new().unwrap();
    let storage = || SnapshotStorage::new(dir.path(), "game_state.json");

    let mut store = GameStateStore::open(storage(), &profile(), GameSettings::default(), 0);
    assert_eq!(store.admin(&AdminCommand::SetTreasureWeights(xp_only()), 1), Ok(false));
    assert_eq!(store.admin(&AdminCommand::SetTreasureInterval(60_000), 1), Ok(false));
    assert_eq!(store.settings().treasure.weights, xp_only());
    assert_eq!(store.settings().treasure.interval_ms, 60_000);

    assert_eq!(store.admin(&AdminCommand::ForceTreasureReset, 2), Ok(true));
    let hidden: Vec<_> = store
        .state()
        .schools
        .iter()
        .flat_map(|s| s.classrooms.iter())
        .flat_map(|c| c.desks.iter())
        .filter_map(|d| d.treasure)
        .collect();
    assert!(!hidden.is_empty());
    assert!(hidden.iter().all(|t| t.kind == TreasureKind::Xp && t.amount == 15));
    drop(store);

    let reopened = GameStateStore::open(storage(), &profile(), GameSettings::default(), 3);
    assert_eq!(reopened.settings(), &GameSettings::default());
    assert_eq!(reopened.state().last_treasure_reset, 2);
}

#[test]
fn invalid_overrides_are_rejected() {
    let mut store = GameStateStore::new(enrolled("oakridge"), GameSettings::default());
    let zero = vec![TreasureWeight {
        kind: TreasureKind::Coins,
        weight: 0,
        min_amount: 1,
        max_amount: 1,
    }];
    assert!(matches!(
        store.admin(&AdminCommand::SetTreasureWeights(zero), 0),
        Err(GameError::InvalidSetting(_))
    ));
    assert!(matches!(
        store.admin(&AdminCommand::SetTreasureInterval(0), 0),
        Err(GameError::InvalidSetting(_))
    ));
    assert_eq!(store.settings(), &GameSettings::default());
}

#[test]
fn closing_a_school_clears_its_desks_and_members() {
    let mut state = enrolled("maple");
    state.active_tags.push(roster_tag(
        "oakridge-dex",
        "oakridge",
        ("maple", "math", 1),
        ("marker", 1, 10),
        10,
        0,
        60_000,
    ));
    let mut store = GameStateStore::new(state, GameSettings::default());

    assert_eq!(store.admin(&AdminCommand::DeleteSchool("maple".into()), 5), Ok(true));
    let state = store.state();
    assert!(state.school("maple").is_none());
    assert_eq!(state.player.school_id, None);
    assert!(state.active_tags.is_empty());
    assert_eq!(
        store.admin(&AdminCommand::DeleteSchool("maple".into()), 6),
        Err(GameError::SchoolNotFound("maple".into()))
    );
}

#[test]
fn admin_commands_parse_from_json() {
    let cmd: AdminCommand = serde_json::from_str(r#"{"command": "set_easter_eggs", "value": true}"#).unwrap();
    assert_eq!(cmd, AdminCommand::SetEasterEggs(true));
    let cmd: AdminCommand = serde_json::from_str(r#"{"command": "force_treasure_reset"}"#).unwrap();
    assert_eq!(cmd, AdminCommand::ForceTreasureReset);

    let mut store = GameStateStore::new(enrolled("oakridge"), GameSettings::default());
    assert_eq!(store.admin(&AdminCommand::SetEasterEggs(true), 0), Ok(true));
    assert!(store.state().easter_eggs_enabled);
}
