//! # Transfer Configuration
//!
//! Per-transfer settings shared by the sender and the receiver.
//!
//! [`TransferConfig`] is what the command line hands over (where to connect or
//! listen, and which file to send). [`TransferOptions`] holds the tunables that
//! would otherwise be module-level constants, so callers and tests can shrink
//! the chunk size or redirect the output file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Size of each chunk read from the source and written to the destination.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Upper bound on the bytes inspected while looking for the header newline.
pub const MAX_HEADER_LEN: usize = 1024;

/// Destination file the receiver writes to, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "output.txt";

/// Endpoint and source file for one transfer.
///
/// Immutable once built; consumed by a single [`Sender`](crate::Sender) or
/// [`Receiver`](crate::Receiver) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Host to connect to (sender) or bind on (receiver), e.g. "127.0.0.1"
    pub address: String,
    /// TCP port; 0 lets the receiver pick an ephemeral port
    pub port: u16,
    /// File to transmit. Only meaningful for the sender.
    pub filename: Option<PathBuf>,
}

impl TransferConfig {
    /// Configuration for sending `filename` to `address:port`.
    pub fn sender(address: impl Into<String>, port: u16, filename: impl Into<PathBuf>) -> Self {
        Self {
            address: address.into(),
            port,
            filename: Some(filename.into()),
        }
    }

    /// Configuration for listening on `address:port`.
    pub fn receiver(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            filename: None,
        }
    }

    /// `host:port` rendering used in logs and error messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Tunables for the streaming loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Maximum bytes moved per read/write pair
    pub chunk_size: usize,
    /// Maximum bytes buffered while searching for the end of the header
    pub max_header_len: usize,
    /// Where the receiver stores the payload
    pub output_path: PathBuf,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_header_len: MAX_HEADER_LEN,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl TransferOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_header_len(mut self, max_header_len: usize) -> Self {
        self.max_header_len = max_header_len;
        self
    }

    pub fn with_output_path(mut self, output_path: impl AsRef<Path>) -> Self {
        self.output_path = output_path.as_ref().to_path_buf();
        self
    }

    /// Chunk size actually used by the copy loops. A zero chunk would never
    /// make progress, so it is raised to one byte.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
