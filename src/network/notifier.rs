//! Outbound peer notifications
//!
//! After a block is sealed every neighbor is told to clear its pending
//! transactions; after a local admission the transaction is relayed to
//! them. Both are fire-and-forget: the outcome is logged and never fed
//! back into the ledger.

use crate::core::TransactionRequest;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;

/// Per-request timeout for peer calls
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect timeout for peer calls
const NOTIFY_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors from a single peer delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Sink for the ledger's outbound peer traffic
pub trait PeerNotifier: Send + Sync {
    /// Ask `peer` to drop its pending transactions
    fn clear_transactions(&self, peer: &str);

    /// Forward an admitted transaction to `peer`
    fn relay_transaction(&self, peer: &str, request: &TransactionRequest);
}

/// Notifier for a ledger without a network
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl PeerNotifier for NoopNotifier {
    fn clear_transactions(&self, _peer: &str) {}

    fn relay_transaction(&self, _peer: &str, _request: &TransactionRequest) {}
}

/// Delivers notifications over HTTP on the given tokio runtime
pub struct HttpNotifier {
    client: Client,
    runtime: Handle,
}

impl HttpNotifier {
    pub fn new(runtime: Handle) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .connect_timeout(NOTIFY_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self { client, runtime })
    }

    fn endpoint(peer: &str) -> String {
        format!("http://{}/transactions", peer)
    }

    fn dispatch(&self, action: &'static str, peer: &str, request: RequestBuilder) {
        let peer = peer.to_string();
        self.runtime.spawn(async move {
            match deliver(request).await {
                Ok(status) => log::info!("action={}, peer={}, status={}", action, peer, status),
                Err(e) => log::warn!("action={}, peer={}, error={}", action, peer, e),
            }
        });
    }
}

impl PeerNotifier for HttpNotifier {
    fn clear_transactions(&self, peer: &str) {
        let request = self.client.delete(Self::endpoint(peer));
        self.dispatch("clear_transactions", peer, request);
    }

    fn relay_transaction(&self, peer: &str, request: &TransactionRequest) {
        let request = self.client.put(Self::endpoint(peer)).json(request);
        self.dispatch("relay_transaction", peer, request);
    }
}

async fn deliver(request: RequestBuilder) -> Result<StatusCode, NotifyError> {
    let response = request.send().await?;
    Ok(response.status())
}

/// Notifier that records every call, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    pub cleared: parking_lot::Mutex<Vec<String>>,
    pub relayed: parking_lot::Mutex<Vec<(String, TransactionRequest)>>,
}

#[cfg(test)]
impl PeerNotifier for RecordingNotifier {
    fn clear_transactions(&self, peer: &str) {
        self.cleared.lock().push(peer.to_string());
    }

    fn relay_transaction(&self, peer: &str, request: &TransactionRequest) {
        self.relayed.lock().push((peer.to_string(), request.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::delete, Json, Router};
    use tokio::sync::mpsc;

    async fn spawn_peer() -> (String, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let app = Router::new()
            .route(
                "/transactions",
                delete(|State(tx): State<mpsc::UnboundedSender<String>>| async move {
                    let _ = tx.send("DELETE".to_string());
                })
                .put(
                    |State(tx): State<mpsc::UnboundedSender<String>>,
                     Json(req): Json<TransactionRequest>| async move {
                        let _ = tx.send(format!("PUT {:?}", req.value));
                    },
                ),
            )
            .with_state(tx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr.to_string(), rx)
    }

    #[tokio::test]
    async fn test_http_notifier_clears_peer_pool() {
        let (peer, mut rx) = spawn_peer().await;
        let notifier = HttpNotifier::new(Handle::current()).unwrap();

        notifier.clear_transactions(&peer);

        let hit = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(hit.as_deref(), Some("DELETE"));
    }

    #[tokio::test]
    async fn test_http_notifier_relays_transaction() {
        let (peer, mut rx) = spawn_peer().await;
        let notifier = HttpNotifier::new(Handle::current()).unwrap();

        let request = TransactionRequest {
            value: Some(2.5),
            ..Default::default()
        };
        notifier.relay_transaction(&peer, &request);

        let hit = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(hit.as_deref(), Some("PUT Some(2.5)"));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_not_fatal() {
        let notifier = HttpNotifier::new(Handle::current()).unwrap();
        // Nothing listens on port 1; the failure is only logged
        notifier.clear_transactions("127.0.0.1:1");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
