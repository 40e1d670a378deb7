//! Task wrapper around [`GameStateStore`].
//!
//! The store lives inside one spawned task and [`StoreHandle`]s send it
//! commands over an unbounded channel. Commands run strictly in arrival
//! order, so two updates sent at the same time both land: the second one
//! sees the state the first produced. Any number of handles may be cloned
//! and used from any task.

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use super::store::GameStateStore;
use crate::game::{
    now_millis, ActionOutcome, AdminCommand, GameAction, GameError, GameState, Millis, NpcReport,
    TickReport,
};
use crate::storage::StorageError;
use crate::sync::{MergeReport, RemoteSnapshot};

type Transform = Box<dyn FnOnce(&GameState) -> Result<GameState, GameError> + Send>;

pub enum StoreCommand {
    Update(Transform, oneshot::Sender<Result<(), GameError>>),
    Action(GameAction, Millis, oneshot::Sender<Result<ActionOutcome, GameError>>),
    Tick(Millis, oneshot::Sender<TickReport>),
    SimulateNpcs(Millis, oneshot::Sender<NpcReport>),
    Merge(Box<RemoteSnapshot>, oneshot::Sender<MergeReport>),
    Admin(AdminCommand, Millis, oneshot::Sender<Result<bool, GameError>>),
    Snapshot(oneshot::Sender<GameState>),
    Persist(oneshot::Sender<Result<(), StorageError>>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone, Debug)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<StoreCommand>,
}

impl StoreHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> StoreCommand) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(make(tx)).is_ok() {
            rx.await.ok()
        } else {
            None
        }
    }

    /// Run an arbitrary transform against the current state.
    pub async fn apply_update<F>(&self, transform: F) -> Result<(), GameError>
    where
        F: FnOnce(&GameState) -> Result<GameState, GameError> + Send + 'static,
    {
        self.request(|tx| StoreCommand::Update(Box::new(transform), tx))
            .await
            .unwrap_or(Err(GameError::SessionClosed))
    }

    pub async fn dispatch(&self, action: GameAction) -> Result<ActionOutcome, GameError> {
        self.dispatch_at(action, now_millis()).await
    }

    pub async fn dispatch_at(&self, action: GameAction, now: Millis) -> Result<ActionOutcome, GameError> {
        self.request(|tx| StoreCommand::Action(action, now, tx))
            .await
            .unwrap_or(Err(GameError::SessionClosed))
    }

    pub async fn tick(&self, now: Millis) -> Option<TickReport> {
        self.request(|tx| StoreCommand::Tick(now, tx)).await
    }

    pub async fn simulate_npcs(&self, now: Millis) -> Option<NpcReport> {
        self.request(|tx| StoreCommand::SimulateNpcs(now, tx)).await
    }

    pub async fn merge(&self, snapshot: RemoteSnapshot) -> Option<MergeReport> {
        self.request(|tx| StoreCommand::Merge(Box::new(snapshot), tx)).await
    }

    pub async fn admin(&self, cmd: AdminCommand) -> Result<bool, GameError> {
        let now = now_millis();
        self.request(|tx| StoreCommand::Admin(cmd, now, tx))
            .await
            .unwrap_or(Err(GameError::SessionClosed))
    }

    pub async fn snapshot(&self) -> Option<GameState> {
        self.request(StoreCommand::Snapshot).await
    }

    pub async fn persist(&self) -> Option<Result<(), StorageError>> {
        self.request(StoreCommand::Persist).await
    }

    /// Flush the snapshot and stop the store task. Later calls on any
    /// handle report the session as closed.
    pub async fn shutdown(&self) {
        let _ = self.request(StoreCommand::Shutdown).await;
    }
}

/// Spawn the store task. When `changes` is given, every committed player
/// change (actions, updates, simulation, admin, eventful ticks) sends the
/// new state there for publishing; merged remote data is not echoed back.
pub fn start_store(mut store: GameStateStore, changes: Option<mpsc::UnboundedSender<GameState>>) -> StoreHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<StoreCommand>();
    let handle = StoreHandle { tx };

    tokio::spawn(async move {
        let publish = |state: &GameState| {
            if let Some(changes) = &changes {
                let _ = changes.send(state.clone());
            }
        };

        while let Some(cmd) = rx.recv().await {
            match cmd {
                StoreCommand::Update(transform, reply) => {
                    let result = store.apply_update(transform);
                    if result.is_ok() {
                        publish(store.state());
                    }
                    let _ = reply.send(result);
                }
                StoreCommand::Action(action, now, reply) => {
                    let result = store.dispatch(&action, now);
                    if result.is_ok() {
                        publish(store.state());
                    }
                    let _ = reply.send(result);
                }
                StoreCommand::Tick(now, reply) => {
                    let report = store.tick(now);
                    if report.has_events() {
                        publish(store.state());
                    }
                    let _ = reply.send(report);
                }
                StoreCommand::SimulateNpcs(now, reply) => {
                    let report = store.simulate_npcs(now);
                    if !report.is_empty() {
                        publish(store.state());
                    }
                    let _ = reply.send(report);
                }
                StoreCommand::Merge(snapshot, reply) => {
                    let _ = reply.send(store.merge_remote(*snapshot));
                }
                StoreCommand::Admin(cmd, now, reply) => {
                    let result = store.admin(&cmd, now);
                    if matches!(result, Ok(true)) {
                        publish(store.state());
                    }
                    let _ = reply.send(result);
                }
                StoreCommand::Snapshot(reply) => {
                    let _ = reply.send(store.state().clone());
                }
                StoreCommand::Persist(reply) => {
                    let _ = reply.send(store.persist());
                }
                StoreCommand::Shutdown(done) => {
                    flush(&store);
                    let _ = done.send(());
                    debug!("store task stopped");
                    return;
                }
            }
        }
        flush(&store);
        debug!("store task stopped, all handles dropped");
    });

    handle
}

fn flush(store: &GameStateStore) {
    if let Err(e) = store.persist() {
        warn!("final snapshot save failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seed::fresh_state;
    use crate::game::GameSettings;

    #[tokio::test]
    async fn closed_store_reports_session_closed() {
        let store = GameStateStore::new(fresh_state("p1", "Pat", 0), GameSettings::default());
        let handle = start_store(store, None);
        handle.shutdown().await;
        assert_eq!(
            handle.dispatch(GameAction::LeaveSchool).await,
            Err(GameError::SessionClosed)
        );
        assert!(handle.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn rejected_action_is_not_published() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = GameStateStore::new(fresh_state("p1", "Pat", 0), GameSettings::default());
        let handle = start_store(store, Some(tx));
        assert_eq!(
            handle.dispatch(GameAction::LeaveSchool).await,
            Err(GameError::NoSchool)
        );
        handle
            .dispatch(GameAction::JoinSchool {
                school_id: "maple".into(),
            })
            .await
            .unwrap();
        let published = rx.recv().await.unwrap();
        assert_eq!(published.player.school_id.as_deref(), Some("maple"));
        assert!(rx.try_recv().is_err());
    }
}
