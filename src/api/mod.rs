//! REST API module
//!
//! HTTP surface of a ledger node.
//!
//! # Endpoints
//!
//! ## Chain
//! - `GET /` - Full chain (`{"chains": [...]}`)
//!
//! ## Transactions
//! - `GET /transactions` - Pending transactions
//! - `POST /transactions` - Submit a signed transaction (relayed to neighbors)
//! - `PUT /transactions` - Transaction relayed by a neighbor
//! - `DELETE /transactions` - Clear the pool after a neighbor sealed a block
//!
//! ## Mining
//! - `GET /mine` - Mine one block now
//! - `GET /mine/start` - Start the recurring miner
//!
//! ## Balances
//! - `GET /amount?blockchain_address=...` - Net balance of an address

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
