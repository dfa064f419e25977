//! # Common Components
//!
//! Pieces shared by the sender and the receiver.
//!
//! ## Modules
//!
//! - [`config`]: Endpoint configuration and streaming tunables
//! - [`error`]: Error taxonomy for both roles
//! - [`framing`]: The newline-terminated size header
//! - [`stream`]: Chunked copy loop used in both directions
//! - [`progress`]: Progress observations and console rendering
//! - [`session`]: Per-transfer state machine and counters

pub mod config;
pub mod error;
pub mod framing;
pub mod progress;
pub mod session;
pub mod stream;
