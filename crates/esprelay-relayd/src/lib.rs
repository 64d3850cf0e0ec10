//! esprelay relay daemon.
//!
//! Main application that wires together all components:
//! - Shared state store and device liveness tracking
//! - Broadcast hub for real-time clients
//! - HTTP/WebSocket gateway
//! - Synthetic data simulator

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
