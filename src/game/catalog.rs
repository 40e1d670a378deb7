//! Item catalog and gameplay tuning constants.
//!
//! Tools carry a `power` used both for rewards (tagging tools) and for the
//! fatigue comparison when cleaning (cleaning tools). Costs are in coins,
//! durations in milliseconds.

pub const DESKS_PER_CLASSROOM: usize = 5;
pub const BLACKBOARD_CAP: usize = 5;
pub const GLOBAL_LOG_CAP: usize = 50;
pub const GRAFFITI_CAP: usize = 30;
pub const APPLIED_REWARD_CAP: usize = 200;

pub const STARTING_COINS: u64 = 100;
pub const STARTER_ITEMS: [&str; 2] = ["marker", "sponge"];
/// Coins granted for every level gained.
pub const LEVEL_UP_BONUS: u64 = 100;

pub const TAG_OVER_SURCHARGE: u64 = 10;
pub const XP_PER_TOOL_POWER: u64 = 10;
pub const CLEAN_XP_PER_POWER: u64 = 5;
pub const CLEAN_SCHOOL_POINTS: u64 = 5;
pub const MATURE_SCHOOL_POINTS_PER_POWER: u64 = 10;

pub const BASE_CLEAN_FATIGUE: f64 = 5.0;
/// Fatigue removed per one-second tick.
pub const FATIGUE_DECAY_PER_TICK: f64 = 1.0;

pub const SEARCH_COOLDOWN_MS: i64 = 10_000;
pub const ENERGY_DRINK_IMMUNITY_MS: i64 = 30_000;

pub const MAX_BACKPACK_LEVEL: u32 = 5;
pub const BACKPACK_UPGRADE_BASE_COST: u64 = 100;

/// Rooms a school unlocks, in order.
pub const CLASSROOM_POOL: [(&str, &str); 8] = [
    ("math", "Math"),
    ("science", "Science"),
    ("art", "Art"),
    ("history", "History"),
    ("music", "Music"),
    ("gym", "Gym"),
    ("library", "Library"),
    ("chem-lab", "Chemistry Lab"),
];

/// Classroom count by school level (index 0 unused).
pub const CLASSROOMS_BY_LEVEL: [usize; 8] = [0, 2, 3, 4, 5, 6, 7, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    TagTool,
    CleanTool,
    Consumable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ItemKind,
    pub power: u32,
    pub cost: u64,
    /// Maturation time for tags placed with this tool.
    pub duration_ms: i64,
}

pub const ITEMS: [ItemSpec; 9] = [
    ItemSpec { id: "marker", name: "Marker", kind: ItemKind::TagTool, power: 1, cost: 10, duration_ms: 60_000 },
    ItemSpec { id: "spray_can", name: "Spray Can", kind: ItemKind::TagTool, power: 2, cost: 20, duration_ms: 120_000 },
    ItemSpec { id: "paint_roller", name: "Paint Roller", kind: ItemKind::TagTool, power: 3, cost: 40, duration_ms: 300_000 },
    ItemSpec { id: "neon_spray", name: "Neon Spray", kind: ItemKind::TagTool, power: 4, cost: 80, duration_ms: 600_000 },
    ItemSpec { id: "sponge", name: "Sponge", kind: ItemKind::CleanTool, power: 1, cost: 10, duration_ms: 0 },
    ItemSpec { id: "scrubber", name: "Scrubber", kind: ItemKind::CleanTool, power: 2, cost: 30, duration_ms: 0 },
    ItemSpec { id: "solvent", name: "Solvent", kind: ItemKind::CleanTool, power: 3, cost: 60, duration_ms: 0 },
    ItemSpec { id: "pressure_washer", name: "Pressure Washer", kind: ItemKind::CleanTool, power: 4, cost: 120, duration_ms: 0 },
    ItemSpec { id: "energy_drink", name: "Energy Drink", kind: ItemKind::Consumable, power: 0, cost: 25, duration_ms: 0 },
];

pub const ENERGY_DRINK: &str = "energy_drink";

pub fn item(id: &str) -> Option<&'static ItemSpec> {
    ITEMS.iter().find(|i| i.id == id)
}

pub fn tag_tools() -> impl Iterator<Item = &'static ItemSpec> {
    ITEMS.iter().filter(|i| i.kind == ItemKind::TagTool)
}

pub fn backpack_size(backpack_level: u32) -> usize {
    4 + 2 * backpack_level.max(1) as usize
}

/// Price of the next backpack level, doubling per level owned.
pub fn backpack_upgrade_cost(current_level: u32) -> u64 {
    let exp = current_level.max(1).saturating_sub(1).min(30);
    BACKPACK_UPGRADE_BASE_COST.saturating_mul(1u64 << exp)
}

/// Classrooms a school of `level` is entitled to, capped at the pool size.
pub fn classroom_count(level: u32) -> usize {
    let idx = (level as usize).min(CLASSROOMS_BY_LEVEL.len() - 1);
    CLASSROOMS_BY_LEVEL[idx].min(CLASSROOM_POOL.len())
}
