//! Multi-room realtime Texas Hold'em server
//!
//! Exposes the server components for integration testing.

pub mod actor;
pub mod broadcast;
pub mod config;
pub mod game;
pub mod store;
pub mod ws;

use axum::{routing::get, Router};
use std::sync::Arc;

/// Creates the application router
pub fn create_app(registry: Arc<actor::RoomRegistry>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(registry)
}

/// Test helper: a registry backed by the in-memory store, single-node.
pub fn create_test_registry(config: config::Config) -> Arc<actor::RoomRegistry> {
    Arc::new(actor::RoomRegistry::new(
        store::Store::memory(),
        broadcast::Fabric::local(),
        Arc::new(config),
    ))
}
