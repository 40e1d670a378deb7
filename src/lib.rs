//! # Deskwars - session core for a school tagging game
//!
//! Players join a school, tag desks in rival schools with markers and spray
//! cans, scrub rival tags off their own desks and hunt for treasure hidden
//! in desks. This crate is the client-side engine behind that: it owns the
//! game state for one player on one device, advances time, simulates the
//! rest of the school population and keeps in step with a shared backend.
//!
//! ## Features
//!
//! - **Pure transforms**: every gameplay action is a function from the
//!   current state to a complete successor state or a [`game::GameError`].
//! - **Serialized updates**: one task owns the state; concurrent callers
//!   never lose each other's changes.
//! - **Tick loop**: fatigue decay, tag maturation, treasure redistribution
//!   and lesson rollover.
//! - **Ambient simulation**: roster members tag and clean on their own.
//! - **Backend sync**: periodic poll and partial merge, fire-and-forget
//!   push, once-only crediting of server-side rewards.
//! - **Local snapshot**: atomic JSON snapshot that survives restarts and
//!   tolerates old or damaged files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deskwars::config::Config;
//! use deskwars::game::now_millis;
//! use deskwars::session::{DriverTimers, GameStateStore, PlayerProfile, SessionDriver};
//! use deskwars::storage::SnapshotStorage;
//! use deskwars::sync::Offline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let profile = PlayerProfile {
//!         id: config.game.player_id.clone(),
//!         name: config.game.player_name.clone(),
//!     };
//!     let storage = SnapshotStorage::new(&config.storage.data_dir, &config.storage.snapshot_file);
//!     let store = GameStateStore::open(storage, &profile, config.game_settings(), now_millis());
//!
//!     let driver = SessionDriver::<Offline>::new(store, None, DriverTimers::from(&config.timers));
//!     let handle = driver.handle();
//!     tokio::spawn(async move {
//!         let _ = handle
//!             .dispatch(deskwars::game::GameAction::JoinSchool { school_id: "maple".into() })
//!             .await;
//!     });
//!     driver.run().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - state model, catalog, progression and the pure transforms
//! - [`session`] - the store, its task handle and the timer-driven host loop
//! - [`sync`] - backend seam, wire documents and remote merge
//! - [`storage`] - local JSON snapshot
//! - [`config`] - TOML configuration
//! - [`validation`] - player-supplied text checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     actions      ┌──────────────────┐
//! │  Presentation   │ ───────────────▶ │   StoreHandle    │
//! └─────────────────┘                  └──────────────────┘
//!                                               │ commands
//! ┌─────────────────┐  tick / npc / poll ┌──────────────────┐
//! │  SessionDriver  │ ─────────────────▶ │  GameStateStore  │ ──▶ snapshot
//! └─────────────────┘                    └──────────────────┘
//!          │ push / poll
//! ┌─────────────────┐
//! │  RemoteBackend  │
//! └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod session;
pub mod storage;
pub mod sync;
pub mod validation;
