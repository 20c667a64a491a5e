//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chain
        .route("/", get(handlers::get_chain))
        // Transaction pool
        .route(
            "/transactions",
            get(handlers::get_transactions)
                .post(handlers::create_transaction)
                .put(handlers::add_transaction)
                .delete(handlers::clear_transactions),
        )
        // Mining
        .route("/mine", get(handlers::mine))
        .route("/mine/start", get(handlers::start_mining))
        // Balances
        .route("/amount", get(handlers::get_amount))
        .with_state(state)
        .layer(cors)
}
