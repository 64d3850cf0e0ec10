//! HTTP and WebSocket gateway for esprelay.
//!
//! Exposes the REST polling API, the Prometheus exposition endpoint and
//! the real-time WebSocket channel over one axum router.

pub mod server;
mod ws;

pub use server::{create_router, run_server, AppState, ConnectionGuard, ConnectionLimiter};
