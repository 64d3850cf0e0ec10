//! Shared state store and device liveness tracking.
//!
//! This crate owns the single process-wide state image and the device
//! link state machine:
//! - `StateStore`: canonical control/monitoring state behind one lock
//! - `DeviceLink`: reconciles the two device liveness signals
//!   (persistent channel, HTTP push lease) into one status
//! - `run_liveness_monitor`: periodic expiry of the push lease

pub mod device_link;
pub mod liveness;
pub mod store;

pub use device_link::{DeviceLink, LinkStatus};
pub use liveness::run_liveness_monitor;
pub use store::{StateSnapshot, StateStore};
