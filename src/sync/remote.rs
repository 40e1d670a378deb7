//! Backend access.
//!
//! [`RemoteBackend`] is the seam the session driver talks through;
//! [`HttpBackend`] is the JSON-over-HTTP implementation and tests plug in
//! an in-memory fake. [`poll`] and [`push_state`] wrap the individual calls
//! so a failing endpoint only costs its own part of the exchange.

use std::future::Future;

use anyhow::{anyhow, Result};
use log::warn;

use super::wire::{PendingReward, RemotePlayer, RemoteSnapshot, SharedState};
use crate::game::types::{GameState, Player, School};
use crate::metrics;

pub trait RemoteBackend: Send + Sync + 'static {
    /// `Ok(None)` when the backend has no record for this player yet.
    fn fetch_player(&self, player_id: &str) -> impl Future<Output = Result<Option<RemotePlayer>>> + Send;
    fn push_player(&self, player: &Player) -> impl Future<Output = Result<()>> + Send;
    fn fetch_schools(&self) -> impl Future<Output = Result<Vec<School>>> + Send;
    fn push_schools(&self, schools: &[School]) -> impl Future<Output = Result<()>> + Send;
    fn fetch_shared(&self) -> impl Future<Output = Result<SharedState>> + Send;
    fn push_shared(&self, shared: &SharedState) -> impl Future<Output = Result<()>> + Send;
    fn fetch_rewards(&self, player_id: &str) -> impl Future<Output = Result<Vec<PendingReward>>> + Send;
    fn ack_rewards(&self, player_id: &str, ids: &[String]) -> impl Future<Output = Result<()>> + Send;
}

/// Fetch every part of the remote view. Failures are logged and counted;
/// the matching part of the snapshot is left empty.
pub async fn poll<B: RemoteBackend>(backend: &B, player_id: &str) -> RemoteSnapshot {
    let mut snapshot = RemoteSnapshot::default();

    match backend.fetch_player(player_id).await {
        Ok(player) => snapshot.player = player,
        Err(e) => failed("fetch player", &e),
    }
    match backend.fetch_schools().await {
        Ok(schools) => snapshot.schools = Some(schools),
        Err(e) => failed("fetch schools", &e),
    }
    match backend.fetch_shared().await {
        Ok(shared) => snapshot.shared = Some(shared),
        Err(e) => failed("fetch game state", &e),
    }
    match backend.fetch_rewards(player_id).await {
        Ok(rewards) => snapshot.rewards = rewards,
        Err(e) => failed("fetch rewards", &e),
    }
    snapshot
}

/// Publish the local view: player record, schools and shared world.
pub async fn push_state<B: RemoteBackend>(backend: &B, state: &GameState) {
    if let Err(e) = backend.push_player(&state.player).await {
        failed("push player", &e);
    }
    if let Err(e) = backend.push_schools(&state.schools).await {
        failed("push schools", &e);
    }
    if let Err(e) = backend.push_shared(&SharedState::from_state(state)).await {
        failed("push game state", &e);
    }
}

fn failed(what: &str, err: &anyhow::Error) {
    metrics::inc_remote_failures();
    warn!("remote {} failed: {}", what, err);
}

/// Stand-in used when the binary is built without HTTP support. Every call
/// fails, so the driver keeps playing from local state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RemoteBackend for Offline {
    async fn fetch_player(&self, _player_id: &str) -> Result<Option<RemotePlayer>> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn push_player(&self, _player: &Player) -> Result<()> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn fetch_schools(&self) -> Result<Vec<School>> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn push_schools(&self, _schools: &[School]) -> Result<()> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn fetch_shared(&self) -> Result<SharedState> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn push_shared(&self, _shared: &SharedState) -> Result<()> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn fetch_rewards(&self, _player_id: &str) -> Result<Vec<PendingReward>> {
        Err(anyhow!("remote sync unavailable"))
    }
    async fn ack_rewards(&self, _player_id: &str, _ids: &[String]) -> Result<()> {
        Err(anyhow!("remote sync unavailable"))
    }
}

#[cfg(feature = "remote")]
pub use http::HttpBackend;

#[cfg(feature = "remote")]
mod http {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use log::debug;
    use reqwest::{Method, StatusCode};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::time::timeout;

    use super::RemoteBackend;
    use crate::config::RemoteConfig;
    use crate::game::types::{Player, School};
    use crate::sync::wire::{AckBody, PendingReward, RemotePlayer, SharedState};

    /// JSON backend rooted at `base_url`.
    #[derive(Debug, Clone)]
    pub struct HttpBackend {
        base_url: String,
        timeout: Duration,
        client: reqwest::Client,
    }

    impl HttpBackend {
        pub fn new(config: &RemoteConfig) -> Self {
            Self {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout: config.timeout(),
                client: reqwest::Client::new(),
            }
        }

        pub fn player_url(&self, player_id: &str) -> String {
            format!("{}/players/{}", self.base_url, urlencoding::encode(player_id))
        }

        pub fn rewards_url(&self, player_id: &str) -> String {
            format!("{}/rewards", self.player_url(player_id))
        }

        pub fn ack_url(&self, player_id: &str) -> String {
            format!("{}/rewards/ack", self.player_url(player_id))
        }

        pub fn schools_url(&self) -> String {
            format!("{}/schools", self.base_url)
        }

        pub fn shared_url(&self) -> String {
            format!("{}/game-state", self.base_url)
        }

        async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
            timeout(self.timeout, request.send())
                .await
                .map_err(|_| anyhow!("Request timeout after {}s", self.timeout.as_secs()))?
                .map_err(|e| anyhow!("HTTP request failed: {}", e))
        }

        /// GET a JSON document; `None` on 404.
        async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
            debug!("GET {}", url);
            let response = self.send(self.client.get(url)).await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(anyhow!("{} returned status: {}", url, response.status()));
            }
            let body = response
                .json()
                .await
                .map_err(|e| anyhow!("Failed to parse JSON response from {}: {}", url, e))?;
            Ok(Some(body))
        }

        async fn send_json<T: Serialize + ?Sized>(&self, method: Method, url: &str, body: &T) -> Result<()> {
            debug!("{} {}", method, url);
            let response = self.send(self.client.request(method, url).json(body)).await?;
            if !response.status().is_success() {
                return Err(anyhow!("{} returned status: {}", url, response.status()));
            }
            Ok(())
        }
    }

    impl RemoteBackend for HttpBackend {
        async fn fetch_player(&self, player_id: &str) -> Result<Option<RemotePlayer>> {
            self.get_json(&self.player_url(player_id)).await
        }

        async fn push_player(&self, player: &Player) -> Result<()> {
            self.send_json(Method::PUT, &self.player_url(&player.id), player).await
        }

        async fn fetch_schools(&self) -> Result<Vec<School>> {
            Ok(self.get_json(&self.schools_url()).await?.unwrap_or_default())
        }

        async fn push_schools(&self, schools: &[School]) -> Result<()> {
            self.send_json(Method::PUT, &self.schools_url(), schools).await
        }

        async fn fetch_shared(&self) -> Result<SharedState> {
            Ok(self.get_json(&self.shared_url()).await?.unwrap_or_default())
        }

        async fn push_shared(&self, shared: &SharedState) -> Result<()> {
            self.send_json(Method::PUT, &self.shared_url(), shared).await
        }

        async fn fetch_rewards(&self, player_id: &str) -> Result<Vec<PendingReward>> {
            Ok(self.get_json(&self.rewards_url(player_id)).await?.unwrap_or_default())
        }

        async fn ack_rewards(&self, player_id: &str, ids: &[String]) -> Result<()> {
            self.send_json(Method::POST, &self.ack_url(player_id), &AckBody { ids }).await
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_poll_yields_empty_snapshot() {
        let before = metrics::snapshot().remote_failures;
        let snapshot = poll(&Offline, "p1").await;
        assert_eq!(snapshot, RemoteSnapshot::default());
        assert!(metrics::snapshot().remote_failures >= before + 4);
    }
}
