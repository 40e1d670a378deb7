use deskwars::game::progression::{award, award_school_points, xp_threshold, Reward};
use deskwars::game::seed::seed_schools;

#[test]
fn one_big_award_crosses_a_level() {
    let (mut level, mut xp, mut coins) = (1, 0, 0);
    let gained = award(&mut level, &mut xp, &mut coins, Reward::new(120, 0));
    assert_eq!(gained, 1);
    assert_eq!(level, 2);
    assert_eq!(xp, 120);
    assert_eq!(coins, 100);
}

#[test]
fn level_is_maximal_after_any_award() {
    for start_xp in [0u64, 49, 50, 139, 140, 269, 1_000] {
        for gain in [0u64, 1, 10, 90, 131, 5_000] {
            let (mut level, mut xp, mut coins) = (1, 0, 0);
            award(&mut level, &mut xp, &mut coins, Reward::new(start_xp, 0));
            let before = level;
            let gained = award(&mut level, &mut xp, &mut coins, Reward::new(gain, 0));
            assert_eq!(level, before + gained);
            assert!(xp >= xp_threshold(level));
            assert!(xp < xp_threshold(level + 1), "xp {} should not reach level {}", xp, level + 1);
            assert_eq!(coins, 100 * (level as u64 - 1));
        }
    }
}

#[test]
fn several_levels_in_one_award() {
    let (mut level, mut xp, mut coins) = (1, 0, 5);
    let gained = award(&mut level, &mut xp, &mut coins, Reward::new(300, 7));
    assert_eq!(gained, 3);
    assert_eq!(level, 4);
    assert_eq!(coins, 5 + 7 + 300);
}

#[test]
fn school_growth_only_appends_classrooms() {
    let mut school = seed_schools().remove(0);
    let mut last_ids: Vec<String> = school.classrooms.iter().map(|c| c.id.clone()).collect();
    for _ in 0..30 {
        award_school_points(&mut school, 150);
        let ids: Vec<String> = school.classrooms.iter().map(|c| c.id.clone()).collect();
        assert!(ids.len() >= last_ids.len());
        assert_eq!(&ids[..last_ids.len()], &last_ids[..]);
        last_ids = ids;
    }
    assert_eq!(school.classrooms.len(), 8);
}
