//! Exchange with the authoritative backend: wire documents, the backend
//! seam and the merge of fetched data into local state.

pub mod merge;
pub mod remote;
pub mod wire;

pub use merge::{merge, MergeReport};
#[cfg(feature = "remote")]
pub use remote::HttpBackend;
pub use remote::{poll, push_state, Offline, RemoteBackend};
pub use wire::{PendingReward, RemotePlayer, RemoteSnapshot, SharedState};
