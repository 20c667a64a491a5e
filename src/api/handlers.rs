//! REST API handlers for ledger operations

use crate::config::NodeConfig;
use crate::core::{
    Amount, Block, Blockchain, RequestError, SignedSubmission, Transaction, TransactionRequest,
    MINING_SENDER,
};
use crate::mining::Miner;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub blockchain: Arc<Blockchain>,
    pub config: Arc<NodeConfig>,
    /// Root token; cancelling it stops the timers and any running search
    pub shutdown: CancellationToken,
    mining_started: Arc<AtomicBool>,
}

impl ApiState {
    pub fn new(blockchain: Arc<Blockchain>, config: NodeConfig, shutdown: CancellationToken) -> Self {
        Self {
            blockchain,
            config: Arc::new(config),
            shutdown,
            mining_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the recurring miner once; later calls are no-ops.
    /// Returns whether this call started it.
    pub fn start_mining(&self) -> bool {
        if self.mining_started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let miner = Miner::new(Arc::clone(&self.blockchain), self.config.mining_interval)
            .with_timeout(self.config.mining_timeout);
        tokio::spawn(miner.run(self.shutdown.clone()));
        true
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct ChainResponse {
    pub chains: Vec<Block>,
}

#[derive(Serialize, Deserialize)]
pub struct PoolResponse {
    pub transactions: Vec<Transaction>,
    pub length: usize,
}

#[derive(Serialize, Deserialize)]
pub struct AmountResponse {
    pub amount: Amount,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    fn success() -> Json<Self> {
        Json(Self {
            message: "success".to_string(),
        })
    }

    fn fail() -> Json<Self> {
        Json(Self {
            message: "fail".to_string(),
        })
    }
}

type StatusReply = (StatusCode, Json<StatusResponse>);

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct AmountQuery {
    pub blockchain_address: String,
}

/// Decode a submission at the transport boundary. The minter identity is
/// reserved for the ledger's own rewards and never accepted from outside.
fn parse_submission(
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<SignedSubmission, String> {
    let Json(request) = payload.map_err(|e| e.body_text())?;

    if !request.validate() {
        return Err(RequestError::MissingFields.to_string());
    }

    let submission = request.parse().map_err(|e| e.to_string())?;
    if submission.sender == MINING_SENDER {
        return Err(RequestError::ReservedSender.to_string());
    }

    Ok(submission)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Full chain
pub async fn get_chain(State(state): State<ApiState>) -> Json<ChainResponse> {
    Json(ChainResponse {
        chains: state.blockchain.chain(),
    })
}

/// GET /transactions - Pending transactions
pub async fn get_transactions(State(state): State<ApiState>) -> Json<PoolResponse> {
    let transactions = state.blockchain.copy_pool();
    Json(PoolResponse {
        length: transactions.len(),
        transactions,
    })
}

/// POST /transactions - Submit a transaction and relay it to neighbors
pub async fn create_transaction(
    State(state): State<ApiState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> StatusReply {
    let submission = match parse_submission(payload) {
        Ok(submission) => submission,
        Err(e) => {
            log::warn!("ERROR: {}", e);
            return (StatusCode::BAD_REQUEST, StatusResponse::fail());
        }
    };

    let created = state.blockchain.create_transaction(
        &submission.sender,
        &submission.recipient,
        submission.value,
        Some(&submission.public_key),
        Some(&submission.signature),
    );

    if created {
        (StatusCode::CREATED, StatusResponse::success())
    } else {
        (StatusCode::BAD_REQUEST, StatusResponse::fail())
    }
}

/// PUT /transactions - Transaction relayed by a neighbor (not relayed again)
pub async fn add_transaction(
    State(state): State<ApiState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> StatusReply {
    let submission = match parse_submission(payload) {
        Ok(submission) => submission,
        Err(e) => {
            log::warn!("ERROR: {}", e);
            return (StatusCode::BAD_REQUEST, StatusResponse::fail());
        }
    };

    let added = state.blockchain.add_transaction(
        &submission.sender,
        &submission.recipient,
        submission.value,
        Some(&submission.public_key),
        Some(&submission.signature),
    );

    if added {
        (StatusCode::OK, StatusResponse::success())
    } else {
        (StatusCode::BAD_REQUEST, StatusResponse::fail())
    }
}

/// DELETE /transactions - A neighbor sealed a block; drop our pool
pub async fn clear_transactions(State(state): State<ApiState>) -> StatusReply {
    state.blockchain.clear_transaction_pool();
    (StatusCode::OK, StatusResponse::success())
}

/// GET /mine - Run one mining pass now. The pass stops on shutdown or
/// after the configured mining timeout.
pub async fn mine(State(state): State<ApiState>) -> StatusReply {
    let miner = Miner::new(Arc::clone(&state.blockchain), state.config.mining_interval)
        .with_timeout(state.config.mining_timeout);

    match miner.mine_once(&state.shutdown).await {
        Ok(true) => (StatusCode::OK, StatusResponse::success()),
        Ok(false) => (StatusCode::BAD_REQUEST, StatusResponse::fail()),
        Err(e) => {
            log::warn!("action=mining, status=fail, error={}", e);
            (StatusCode::SERVICE_UNAVAILABLE, StatusResponse::fail())
        }
    }
}

/// GET /mine/start - Start the recurring miner
pub async fn start_mining(State(state): State<ApiState>) -> StatusReply {
    if state.start_mining() {
        log::info!("action=start_mining, interval={:?}", state.config.mining_interval);
    }
    (StatusCode::OK, StatusResponse::success())
}

/// GET /amount?blockchain_address=... - Net balance of an address
pub async fn get_amount(
    State(state): State<ApiState>,
    Query(query): Query<AmountQuery>,
) -> Json<AmountResponse> {
    Json(AmountResponse {
        amount: state.blockchain.total_balance(&query.blockchain_address),
    })
}

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MINING_REWARD;
    use crate::wallet::Wallet;
    use std::time::Duration;

    fn state() -> ApiState {
        ApiState::new(
            Arc::new(Blockchain::new("owner")),
            NodeConfig::default(),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_submit_and_mine() {
        let state = state();
        let wallet = Wallet::new();
        let request = wallet.sign_transaction("bob", 2.0).unwrap();

        let (status, body) = create_transaction(State(state.clone()), Ok(Json(request))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0, StatusResponse { message: "success".into() });

        let Json(pool) = get_transactions(State(state.clone())).await;
        assert_eq!(pool.length, 1);

        let (status, _) = mine(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let Json(chain) = get_chain(State(state.clone())).await;
        assert_eq!(chain.chains.len(), 2);
        assert_eq!(chain.chains[1].tx_count(), 2);

        let Json(amount) = get_amount(
            State(state.clone()),
            Query(AmountQuery {
                blockchain_address: "owner".into(),
            }),
        )
        .await;
        assert_eq!(amount.amount, MINING_REWARD);
    }

    #[tokio::test]
    async fn test_mine_empty_pool_fails() {
        let (status, body) = mine(State(state())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.message, "fail");
    }

    fn unreachable_state(mining_timeout: Option<Duration>) -> ApiState {
        // 16 leading zero digits is out of reach
        let blockchain = Arc::new(Blockchain::with_difficulty("owner", 16));
        blockchain.add_transaction(MINING_SENDER, "someone", 1.0, None, None);
        let config = NodeConfig {
            mining_timeout,
            ..Default::default()
        };
        ApiState::new(blockchain, config, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_mine_stops_on_shutdown() {
        let state = unreachable_state(None);
        let pass = tokio::spawn(mine(State(state.clone())));

        tokio::time::sleep(Duration::from_millis(100)).await;
        state.shutdown.cancel();

        let (status, body) = tokio::time::timeout(Duration::from_secs(2), pass)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.0.message, "fail");
        assert_eq!(state.blockchain.chain_len(), 1);
        assert_eq!(state.blockchain.pool_len(), 1);
    }

    #[tokio::test]
    async fn test_mine_stops_after_timeout() {
        let state = unreachable_state(Some(Duration::from_millis(50)));

        let (status, _) = tokio::time::timeout(Duration::from_secs(2), mine(State(state.clone())))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.blockchain.chain_len(), 1);
        assert_eq!(state.blockchain.pool_len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_value_is_rejected() {
        let state = state();
        let wallet = Wallet::new();

        for value in [-5.0, Amount::INFINITY] {
            let request = wallet.sign_transaction("bob", value).unwrap();
            let (status, _) = create_transaction(State(state.clone()), Ok(Json(request))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(state.blockchain.pool_len(), 0);

        let (status, _) = mine(State(state.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let Json(chain) = get_chain(State(state.clone())).await;
        let json = serde_json::to_string(&chain.chains).unwrap();
        let decoded: Vec<Block> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, chain.chains);
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let state = state();
        let mut request = Wallet::new().sign_transaction("bob", 2.0).unwrap();
        request.signature = None;

        let (status, _) = create_transaction(State(state.clone()), Ok(Json(request))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.blockchain.pool_len(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_signature_is_rejected() {
        let state = state();
        let mut request = Wallet::new().sign_transaction("bob", 2.0).unwrap();
        request.signature = Some("not a signature".into());

        let (status, _) = add_transaction(State(state.clone()), Ok(Json(request))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.blockchain.pool_len(), 0);
    }

    #[tokio::test]
    async fn test_minter_sender_is_rejected_at_boundary() {
        let state = state();
        let wallet = Wallet::new();
        let tx = Transaction::new(MINING_SENDER, "mallory", 100.0);
        let signature = wallet.key_pair().sign(&tx.hash()).unwrap();
        let request = TransactionRequest {
            sender_blockchain_address: Some(MINING_SENDER.into()),
            recipient_blockchain_address: Some("mallory".into()),
            sender_public_key: Some(wallet.public_key()),
            value: Some(100.0),
            signature: Some(crate::crypto::signature_to_hex(&signature)),
        };

        let (status, _) = add_transaction(State(state.clone()), Ok(Json(request))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.blockchain.pool_len(), 0);
    }

    #[tokio::test]
    async fn test_relayed_transaction_and_clear() {
        let state = state();
        let request = Wallet::new().sign_transaction("bob", 1.0).unwrap();

        let (status, _) = add_transaction(State(state.clone()), Ok(Json(request))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.blockchain.pool_len(), 1);

        let (status, _) = clear_transactions(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.blockchain.pool_len(), 0);
    }

    #[tokio::test]
    async fn test_start_mining_is_idempotent() {
        let state = state();
        assert!(state.start_mining());
        assert!(!state.start_mining());

        let (status, _) = start_mining(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        state.shutdown.cancel();
    }
}
