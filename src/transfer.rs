//! # Transfer Roles
//!
//! [`Sender`](crate::Sender) and [`Receiver`](crate::Receiver) are the two
//! halves of the protocol. The [`Transfer`] trait lets the command line pick
//! one and run it without caring which.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::common::config::TransferConfig;
use crate::common::error::TransferError;
use crate::common::progress::ProgressObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Send,
    Receive,
}

impl Role {
    /// Past-tense verb used in progress lines.
    pub fn verb(self) -> &'static str {
        match self {
            Role::Send => "Sent",
            Role::Receive => "Received",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Send => f.write_str("send"),
            Role::Receive => f.write_str("receive"),
        }
    }
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub role: Role,
    /// Payload bytes moved; equals the header's byte count
    pub bytes: u64,
    /// Number of chunks written
    pub chunks: u64,
    pub elapsed: Duration,
    pub peer: Option<SocketAddr>,
}

/// One side of a single-shot transfer.
pub trait Transfer {
    fn role(&self) -> Role;

    fn config(&self) -> &TransferConfig;

    /// Run the transfer to completion, reporting progress to `observer`.
    fn run(&self, observer: &mut dyn ProgressObserver) -> Result<TransferSummary, TransferError>;
}
