//! # Transfer Session
//!
//! Ephemeral bookkeeping for one send or receive. Both roles walk the same
//! state machine exactly once:
//!
//! ```text
//! Init -> Connected -> HeaderExchanged -> Streaming -> Done
//!   \________\______________\_______________\________> Failed
//! ```
//!
//! The socket and file handles are not stored here; they live on the stack
//! of the operation that opened them and are closed when it returns.

use log::debug;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::common::error::TransferError;
use crate::transfer::{Role, TransferSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Init,
    Connected,
    HeaderExchanged,
    Streaming,
    Done,
    Failed,
}

impl TransferState {
    pub fn can_advance_to(self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Done, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Init, Connected)
            | (Connected, HeaderExchanged)
            | (HeaderExchanged, Streaming)
            | (Streaming, Done) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct TransferSession {
    role: Role,
    state: TransferState,
    expected_size: u64,
    bytes_moved: u64,
    chunks: u64,
    peer: Option<SocketAddr>,
    started: Instant,
}

impl TransferSession {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: TransferState::Init,
            expected_size: 0,
            bytes_moved: 0,
            chunks: 0,
            peer: None,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn bytes_moved(&self) -> u64 {
        self.bytes_moved
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn advance(&mut self, next: TransferState) -> Result<(), TransferError> {
        if !self.state.can_advance_to(next) {
            return Err(TransferError::Unexpected(format!(
                "invalid {} state transition {:?} -> {:?}",
                self.role, self.state, next
            )));
        }
        debug!("{} session: {:?} -> {:?}", self.role, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Record the peer and move to `Connected`.
    pub fn connected(&mut self, peer: Option<SocketAddr>) -> Result<(), TransferError> {
        self.peer = peer;
        self.advance(TransferState::Connected)
    }

    /// Record the announced payload size and move to `HeaderExchanged`.
    pub fn header_exchanged(&mut self, expected_size: u64) -> Result<(), TransferError> {
        self.expected_size = expected_size;
        self.advance(TransferState::HeaderExchanged)
    }

    /// Record the cumulative byte count after a chunk.
    pub fn record_chunk(&mut self, bytes_moved: u64) {
        debug_assert!(bytes_moved >= self.bytes_moved);
        debug_assert!(bytes_moved <= self.expected_size);
        self.bytes_moved = bytes_moved;
        self.chunks += 1;
    }

    pub fn fail(&mut self) {
        if self.state.can_advance_to(TransferState::Failed) {
            debug!("{} session: {:?} -> Failed", self.role, self.state);
            self.state = TransferState::Failed;
        }
    }

    /// Move to `Done` and produce the summary handed back to the caller.
    pub fn finish(&mut self) -> Result<TransferSummary, TransferError> {
        if self.bytes_moved != self.expected_size {
            return Err(TransferError::Unexpected(format!(
                "session finished with {} of {} bytes",
                self.bytes_moved, self.expected_size
            )));
        }
        self.advance(TransferState::Done)?;
        Ok(TransferSummary {
            role: self.role,
            bytes: self.bytes_moved,
            chunks: self.chunks,
            elapsed: self.elapsed(),
            peer: self.peer,
        })
    }
}
