//! # File Transmitter
//!
//! Point-to-point file transfer over a single TCP connection.
//!
//! One side runs a [`Sender`], the other a [`Receiver`]. The wire format is a
//! decimal byte count, a newline, then exactly that many raw bytes:
//!
//! ```text
//! 48\n<48 payload bytes>
//! ```
//!
//! Everything is blocking and single-shot: one connection, one file, then the
//! operation returns.

pub mod common;
pub mod metrics;
pub mod receiver;
pub mod sender;
pub mod transfer;

pub use common::config::{TransferConfig, TransferOptions};
pub use common::error::{ErrorKind, TransferError};
pub use common::progress::{ConsoleProgress, NoProgress, Progress, ProgressObserver};
pub use metrics::{TransferMetrics, TransferReport};
pub use receiver::{Listening, Receiver};
pub use sender::Sender;
pub use transfer::{Role, Transfer, TransferSummary};

/// Send `config.filename` to `config.address:config.port` with default options.
pub fn send(config: TransferConfig) -> Result<TransferSummary, TransferError> {
    Sender::new(config, TransferOptions::default()).send(&mut NoProgress)
}

/// Receive one file on `config.address:config.port` into `output.txt`.
pub fn receive(config: TransferConfig) -> Result<TransferSummary, TransferError> {
    Receiver::new(config, TransferOptions::default()).receive(&mut NoProgress)
}
