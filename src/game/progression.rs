//! XP curve, level-up handling, school levels and fatigue costs.

use super::catalog::{
    classroom_count, BASE_CLEAN_FATIGUE, CLASSROOM_POOL, FATIGUE_DECAY_PER_TICK, LEVEL_UP_BONUS,
};
use super::types::{Classroom, School};

/// Coins and XP granted together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reward {
    pub xp: u64,
    pub coins: u64,
}

impl Reward {
    pub fn new(xp: u64, coins: u64) -> Self {
        Self { xp, coins }
    }

    pub fn is_empty(&self) -> bool {
        self.xp == 0 && self.coins == 0
    }
}

/// Cumulative XP needed to reach `level`: 0, 50, 140, 270, ...
pub fn xp_threshold(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let n = (level - 1) as u64;
    50 * n + 20 * n * (n - 1)
}

/// Credit a reward and raise the level as many times as the new XP allows.
/// Every level gained adds [`LEVEL_UP_BONUS`] coins. Returns levels gained.
pub fn award(level: &mut u32, xp: &mut u64, coins: &mut u64, reward: Reward) -> u32 {
    *xp = xp.saturating_add(reward.xp);
    *coins = coins.saturating_add(reward.coins);
    let mut gained = 0;
    while *xp >= xp_threshold(*level + 1) {
        *level += 1;
        *coins = coins.saturating_add(LEVEL_UP_BONUS);
        gained += 1;
    }
    gained
}

/// Points needed to reach school `level`.
pub fn school_threshold(level: u32) -> u64 {
    let n = level.saturating_sub(1) as u64;
    100 * n * n
}

/// Add points and raise the school level while over threshold, then grow
/// the classroom list to match. Returns levels gained.
pub fn award_school_points(school: &mut School, points: u64) -> u32 {
    school.school_points = school.school_points.saturating_add(points);
    let mut gained = 0;
    while school.school_points >= school_threshold(school.level + 1) {
        school.level += 1;
        gained += 1;
    }
    if gained > 0 {
        sync_classrooms(school);
    }
    gained
}

/// Append pool classrooms until the count matches the school level. Never
/// removes rooms.
pub fn sync_classrooms(school: &mut School) {
    let target = classroom_count(school.level);
    for (id, name) in CLASSROOM_POOL.iter() {
        if school.classrooms.len() >= target {
            break;
        }
        if school.classroom(id).is_none() {
            school.classrooms.push(Classroom::new(id, name));
        }
    }
}

/// Fatigue added by cleaning a tag of `tag_power` with a tool of
/// `cleaner_power`. Free when the tool outclasses the tag; otherwise doubles
/// per level of deficit.
pub fn clean_fatigue_cost(cleaner_power: u32, tag_power: u32) -> f64 {
    if cleaner_power > tag_power {
        return 0.0;
    }
    let deficit = (tag_power - cleaner_power).min(16) as i32;
    BASE_CLEAN_FATIGUE * 2f64.powi(deficit)
}

pub fn decay_fatigue(fatigue: f64) -> f64 {
    (fatigue - FATIGUE_DECAY_PER_TICK).max(0.0)
}

/// Reward owed to a tag's creator when it is cleaned at `progress`.
/// Coins are halved, XP is not.
pub fn partial_reward(tool_power: u32, total_cost: u64, progress: f64) -> Reward {
    let p = progress.clamp(0.0, 1.0);
    let full_xp = tool_power as u64 * super::catalog::XP_PER_TOOL_POWER;
    Reward {
        xp: (full_xp as f64 * p).floor() as u64,
        coins: (total_cost as f64 * p / 2.0).floor() as u64,
    }
}
