//! # Receiver
//!
//! Single-shot server: binds, accepts exactly one connection, reads the size
//! header and writes exactly that many bytes to the configured output path.
//!
//! ## Lifecycle
//!
//! ```text
//! Receiver::listen()  -> Listening   (socket bound, not yet accepting)
//! Listening::accept() -> one transfer, then the listener is dropped
//! ```
//!
//! [`Receiver::receive`] does both in one call. Splitting them lets callers
//! bind port 0 and learn the real port before a sender connects.
//!
//! A peer that disconnects early leaves the partial output on disk; there is
//! no rollback.

use log::{info, warn};
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::net::{SocketAddr, TcpListener};

use crate::common::config::{TransferConfig, TransferOptions};
use crate::common::error::TransferError;
use crate::common::framing::read_header;
use crate::common::progress::{Progress, ProgressObserver};
use crate::common::session::{TransferSession, TransferState};
use crate::common::stream::{copy_exact, CopyError};
use crate::transfer::{Role, Transfer, TransferSummary};

pub struct Receiver {
    config: TransferConfig,
    options: TransferOptions,
}

impl Receiver {
    pub fn new(config: TransferConfig, options: TransferOptions) -> Self {
        Self { config, options }
    }

    /// Bind the listening socket without accepting yet.
    pub fn listen(&self) -> Result<Listening, TransferError> {
        let endpoint = self.config.endpoint();
        let listener = TcpListener::bind((self.config.address.as_str(), self.config.port))
            .map_err(|e| match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    TransferError::io(format!("binding {}", endpoint), e)
                }
                _ => TransferError::socket(format!("binding {}", endpoint), e),
            })?;

        let shown = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or(endpoint);
        info!("👂 Listening on {}...", shown);

        Ok(Listening {
            listener,
            options: self.options.clone(),
        })
    }

    /// Listen, accept one connection and store its payload.
    pub fn receive(
        &self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, TransferError> {
        self.listen()?.accept(observer)
    }
}

impl Transfer for Receiver {
    fn role(&self) -> Role {
        Role::Receive
    }

    fn config(&self) -> &TransferConfig {
        &self.config
    }

    fn run(&self, observer: &mut dyn ProgressObserver) -> Result<TransferSummary, TransferError> {
        self.receive(observer)
    }
}

/// A bound listener waiting for its one sender.
pub struct Listening {
    listener: TcpListener,
    options: TransferOptions,
}

impl Listening {
    pub fn local_addr(&self) -> Result<SocketAddr, TransferError> {
        self.listener
            .local_addr()
            .map_err(|e| TransferError::socket("reading listener address", e))
    }

    /// Block until one connection arrives, then receive its payload.
    ///
    /// Consumes the handle: the listening socket is closed when this returns,
    /// whatever the outcome, so no second connection is ever serviced.
    pub fn accept(
        self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, TransferError> {
        let mut session = TransferSession::new(Role::Receive);

        let outcome = self.accept_one(&mut session, observer);
        match outcome {
            Ok(summary) => {
                info!(
                    "✅ Received {} bytes into {}",
                    summary.bytes,
                    self.options.output_path.display()
                );
                observer.on_complete(Role::Receive, summary.bytes);
                Ok(summary)
            }
            Err(e) => {
                session.fail();
                Err(e)
            }
        }
    }

    fn accept_one(
        &self,
        session: &mut TransferSession,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, TransferError> {
        let (stream, peer) = self
            .listener
            .accept()
            .map_err(|e| TransferError::socket("accepting connection", e))?;
        info!("🔗 Connection from {} established", peer);
        session.connected(Some(peer))?;

        receive_from(stream, &self.options, session, observer)?;
        session.finish()
    }
}

/// Read the header and payload from `stream` into the output file.
///
/// The output file is only created once the header parsed, so a malformed
/// header never touches the filesystem.
pub(crate) fn receive_from<R: Read>(
    mut stream: R,
    options: &TransferOptions,
    session: &mut TransferSession,
    observer: &mut dyn ProgressObserver,
) -> Result<(), TransferError> {
    let header = read_header(&mut stream, options.max_header_len)?;
    let expected = header.payload_len;
    session.header_exchanged(expected)?;
    info!("📦 Expecting {} bytes", expected);

    if header.leftover.len() as u64 > expected {
        warn!(
            "⚠️  Ignoring {} bytes past the announced payload",
            header.leftover.len() as u64 - expected
        );
    }

    let output = &options.output_path;
    let mut file = File::create(output)
        .map_err(|e| TransferError::io(format!("creating {}", output.display()), e))?;

    session.advance(TransferState::Streaming)?;

    // Bytes that arrived with the header go through the same loop as the rest.
    let mut source = Cursor::new(header.leftover).chain(stream);
    let chunk_size = options.effective_chunk_size();
    copy_exact(&mut source, &mut file, expected, chunk_size, |received| {
        session.record_chunk(received);
        observer.on_progress(Role::Receive, Progress::new(received, expected));
    })
    .map_err(|e| match e {
        CopyError::Read(e) => TransferError::Unexpected(e.to_string()),
        CopyError::Write(e) => TransferError::io(format!("writing {}", output.display()), e),
        CopyError::UnexpectedEof { copied, expected } => TransferError::Truncated {
            received: copied,
            expected,
        },
    })?;

    Ok(())
}
