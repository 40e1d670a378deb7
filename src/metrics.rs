//! Process-wide session counters.
//! Cheap relaxed atomics; read them with [`snapshot`].
use std::sync::atomic::{AtomicU64, Ordering};

static UPDATES_APPLIED: AtomicU64 = AtomicU64::new(0);
static UPDATES_REJECTED: AtomicU64 = AtomicU64::new(0);
static TAGS_MATURED: AtomicU64 = AtomicU64::new(0);
static REWARDS_APPLIED: AtomicU64 = AtomicU64::new(0);
static REMOTE_FAILURES: AtomicU64 = AtomicU64::new(0);

pub fn inc_updates_applied() {
    UPDATES_APPLIED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_updates_rejected() {
    UPDATES_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn add_tags_matured(n: u64) {
    TAGS_MATURED.fetch_add(n, Ordering::Relaxed);
}

pub fn add_rewards_applied(n: u64) {
    REWARDS_APPLIED.fetch_add(n, Ordering::Relaxed);
}

pub fn inc_remote_failures() {
    REMOTE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub updates_applied: u64,
    pub updates_rejected: u64,
    pub tags_matured: u64,
    pub rewards_applied: u64,
    pub remote_failures: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        updates_applied: UPDATES_APPLIED.load(Ordering::Relaxed),
        updates_rejected: UPDATES_REJECTED.load(Ordering::Relaxed),
        tags_matured: TAGS_MATURED.load(Ordering::Relaxed),
        rewards_applied: REWARDS_APPLIED.load(Ordering::Relaxed),
        remote_failures: REMOTE_FAILURES.load(Ordering::Relaxed),
    }
}
