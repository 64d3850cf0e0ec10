//! Broadcast hub and real-time event fan-out.
//!
//! Maintains the set of connected real-time clients and pushes state
//! changes to them:
//! - `BroadcastHub`: client registry, connect-time snapshot sync,
//!   sender-excluded control fan-out, device handshake handling
//! - `ServerEvent` / `ClientEvent`: the wire event vocabulary
//!
//! Every mutate-then-broadcast section runs under one sequencing lock,
//! so all clients observe broadcasts in the order the mutations were
//! applied.

pub mod events;
pub mod hub;

pub use events::{ClientEvent, ControlFrame, ControlUpdate, ServerEvent};
pub use hub::BroadcastHub;
