//! The session host loop.
//!
//! [`SessionDriver`] owns the store task and drives it from timers: a tick
//! every second, a round of ambient simulation every minute and, when a
//! backend is configured, a remote poll every few seconds. Committed
//! changes are pushed to the backend from spawned tasks so a slow network
//! never stalls gameplay. Polls are spawned too and may overlap; each one
//! is merged through the store in arrival order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use super::handle::{start_store, StoreHandle};
use super::store::GameStateStore;
use crate::config::TimersConfig;
use crate::game::{now_millis, GameState};
use crate::metrics;
use crate::sync::{poll, push_state, RemoteBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverTimers {
    pub tick: Duration,
    pub npc: Duration,
    pub poll: Duration,
}

impl Default for DriverTimers {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            npc: Duration::from_secs(60),
            poll: Duration::from_secs(5),
        }
    }
}

impl From<&TimersConfig> for DriverTimers {
    fn from(cfg: &TimersConfig) -> Self {
        Self {
            tick: Duration::from_millis(cfg.tick_ms.max(1)),
            npc: Duration::from_secs(cfg.npc_interval_seconds.max(1)),
            poll: Duration::from_secs(cfg.poll_interval_seconds.max(1)),
        }
    }
}

pub struct SessionDriver<B: RemoteBackend> {
    handle: StoreHandle,
    changes: mpsc::UnboundedReceiver<GameState>,
    backend: Option<Arc<B>>,
    player_id: String,
    timers: DriverTimers,
}

impl<B: RemoteBackend> SessionDriver<B> {
    /// Start the store task. Pass `None` for `backend` to play offline.
    pub fn new(store: GameStateStore, backend: Option<Arc<B>>, timers: DriverTimers) -> Self {
        let (tx, changes) = mpsc::unbounded_channel();
        let player_id = store.state().player.id.clone();
        let handle = start_store(store, Some(tx));
        Self {
            handle,
            changes,
            backend,
            player_id,
            timers,
        }
    }

    /// Handle for presentation code to send actions through.
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves, then flush the snapshot and stop the
    /// store.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticks = interval(self.timers.tick);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut npc_rounds = interval_at(Instant::now() + self.timers.npc, self.timers.npc);
        npc_rounds.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls = interval(self.timers.poll);
        polls.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "session started for {} ({})",
            self.player_id,
            if self.backend.is_some() { "online" } else { "offline" }
        );

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if let Some(report) = self.handle.tick(now_millis()).await {
                        if !report.matured.is_empty() {
                            debug!("{} tag(s) matured", report.matured.len());
                        }
                        if report.lesson_rolled {
                            debug!("lesson rolled over");
                        }
                    }
                }
                _ = npc_rounds.tick() => {
                    if let Some(report) = self.handle.simulate_npcs(now_millis()).await {
                        if report.player_tags_cleaned > 0 {
                            info!("{} of your tags were scrubbed", report.player_tags_cleaned);
                        }
                    }
                }
                _ = polls.tick(), if self.backend.is_some() => {
                    self.spawn_poll();
                }
                Some(state) = self.changes.recv() => {
                    self.spawn_push(state);
                }
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.handle.shutdown().await;
        let m = metrics::snapshot();
        info!(
            "session closed: {} updates applied, {} rejected, {} remote failures",
            m.updates_applied, m.updates_rejected, m.remote_failures
        );
        Ok(())
    }

    fn spawn_poll(&self) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        let handle = self.handle.clone();
        let player_id = self.player_id.clone();
        tokio::spawn(async move {
            let snapshot = poll(backend.as_ref(), &player_id).await;
            let Some(report) = handle.merge(snapshot).await else {
                return;
            };
            if report.rewards_applied > 0 {
                info!("{} backend reward(s) applied", report.rewards_applied);
            }
            if !report.acknowledge.is_empty() {
                if let Err(e) = backend.ack_rewards(&player_id, &report.acknowledge).await {
                    metrics::inc_remote_failures();
                    warn!("reward acknowledgement failed: {}", e);
                }
            }
        });
    }

    fn spawn_push(&self, state: GameState) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        tokio::spawn(async move {
            push_state(backend.as_ref(), &state).await;
        });
    }
}
