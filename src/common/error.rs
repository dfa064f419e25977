//! # Transfer Errors
//!
//! Every failure a send or receive can hit is folded into a [`TransferError`]
//! before it leaves the operation. [`ErrorKind`] is the flat classification
//! that callers match on and that ends up in metrics reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    FileNotFound,
    ConnectionRefused,
    SocketError,
    ProtocolError,
    TruncatedTransfer,
    IoError,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::ConnectionRefused => "ConnectionRefused",
            ErrorKind::SocketError => "SocketError",
            ErrorKind::ProtocolError => "ProtocolError",
            ErrorKind::TruncatedTransfer => "TruncatedTransfer",
            ErrorKind::IoError => "IOError",
            ErrorKind::Unexpected => "Unexpected",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file {} not found", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("connection refused to {address}")]
    ConnectionRefused { address: String },

    #[error("socket error while {context}: {source}")]
    Socket {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("transfer truncated: received {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("error encountered: {0}")]
    Unexpected(String),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::FileNotFound { .. } => ErrorKind::FileNotFound,
            TransferError::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            TransferError::Socket { .. } => ErrorKind::SocketError,
            TransferError::Protocol(_) => ErrorKind::ProtocolError,
            TransferError::Truncated { .. } => ErrorKind::TruncatedTransfer,
            TransferError::Io { .. } => ErrorKind::IoError,
            TransferError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn socket(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Socket {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let refused = TransferError::ConnectionRefused {
            address: "127.0.0.1:12345".to_string(),
        };
        assert_eq!(refused.kind(), ErrorKind::ConnectionRefused);
        assert_eq!(refused.to_string(), "connection refused to 127.0.0.1:12345");

        let truncated = TransferError::Truncated {
            received: 1,
            expected: 3,
        };
        assert_eq!(truncated.kind(), ErrorKind::TruncatedTransfer);
        assert_eq!(
            truncated.to_string(),
            "transfer truncated: received 1 of 3 bytes"
        );

        let io = TransferError::io(
            "creating output.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.kind(), ErrorKind::IoError);
        assert_eq!(io.to_string(), "I/O error while creating output.txt: denied");
    }

    #[test]
    fn test_messages_are_single_line() {
        let missing = TransferError::FileNotFound {
            path: PathBuf::from("nonexistent_file.txt"),
        };
        assert_eq!(missing.to_string(), "file nonexistent_file.txt not found");
        assert!(!missing.to_string().contains('\n'));
        assert_eq!(ErrorKind::IoError.to_string(), "IOError");
    }
}
