/*
 * Responsibility
 * - URL structure: /health, /products, /orders
 * - Which verb needs which credential is decided by the security chain, not here
 */
use axum::{Router, routing::get};

use crate::api::handlers::{health::health, store::acknowledge};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/products",
            get(acknowledge).post(acknowledge).delete(acknowledge),
        )
        .route(
            "/products/{id}",
            get(acknowledge).post(acknowledge).delete(acknowledge),
        )
        .route(
            "/orders",
            get(acknowledge).post(acknowledge).delete(acknowledge),
        )
        .route(
            "/orders/{id}",
            get(acknowledge).post(acknowledge).delete(acknowledge),
        )
}
