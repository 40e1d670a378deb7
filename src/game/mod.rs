//! Game rules: the state model and the pure transforms over it.
//!
//! Nothing in here performs I/O or reads the clock; callers pass `now` and
//! an RNG explicitly. The [`crate::session`] layer owns the live state and
//! serializes these transforms.

pub mod actions;
pub mod admin;
pub mod catalog;
pub mod errors;
pub mod npc;
pub mod progression;
pub mod seed;
pub mod settings;
pub mod tick;
pub mod types;

pub use actions::{ActionOutcome, GameAction};
pub use admin::AdminCommand;
pub use errors::GameError;
pub use npc::NpcReport;
pub use settings::{GameSettings, TreasureSettings, TreasureWeight};
pub use tick::TickReport;
pub use types::{GameState, Millis, Player, School, Tag};

/// Wall clock in epoch milliseconds.
pub fn now_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}
