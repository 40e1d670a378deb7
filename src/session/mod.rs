//! Live session: the state store, its task handle and the timer-driven host
//! loop.

pub mod driver;
pub mod handle;
pub mod store;

pub use driver::{DriverTimers, SessionDriver};
pub use handle::{start_store, StoreHandle};
pub use store::{GameStateStore, PlayerProfile};
