//! # Sender
//!
//! Connects to a listening receiver, announces the file size and streams the
//! file in fixed-size chunks.
//!
//! The source file is checked before any socket is created, so a bad path
//! never results in a connection attempt. The socket and file are locals of
//! [`Sender::send`] and are closed on every return path.

use log::info;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;

use crate::common::config::{TransferConfig, TransferOptions};
use crate::common::error::TransferError;
use crate::common::framing::encode_header;
use crate::common::progress::{Progress, ProgressObserver};
use crate::common::session::{TransferSession, TransferState};
use crate::common::stream::{copy_exact, CopyError};
use crate::transfer::{Role, Transfer, TransferSummary};

pub struct Sender {
    config: TransferConfig,
    options: TransferOptions,
}

impl Sender {
    pub fn new(config: TransferConfig, options: TransferOptions) -> Self {
        Self { config, options }
    }

    /// Send the configured file to the configured endpoint.
    ///
    /// # Errors
    ///
    /// * [`FileNotFound`](TransferError::FileNotFound) - the source does not exist (no socket is opened)
    /// * [`Io`](TransferError::Io) - the source cannot be stat'ed, opened or read
    /// * [`ConnectionRefused`](TransferError::ConnectionRefused) - nothing listens on the endpoint
    /// * [`Socket`](TransferError::Socket) - connecting or sending the header failed
    /// * [`Unexpected`](TransferError::Unexpected) - the connection broke mid-stream
    pub fn send(
        &self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, TransferError> {
        let path = self.config.filename.as_deref().ok_or_else(|| {
            TransferError::Unexpected("no source file configured for sending".to_string())
        })?;

        let filesize = source_size(path)?;
        let mut file = File::open(path).map_err(|e| classify_file_error(path, "opening", e))?;

        let mut session = TransferSession::new(Role::Send);
        match self.transfer(&mut file, filesize, &mut session, observer) {
            Ok(summary) => {
                info!(
                    "✅ Sent {} bytes to {} in {} chunks",
                    summary.bytes,
                    self.config.endpoint(),
                    summary.chunks
                );
                observer.on_complete(Role::Send, summary.bytes);
                Ok(summary)
            }
            Err(e) => {
                session.fail();
                Err(e)
            }
        }
    }

    fn transfer(
        &self,
        file: &mut File,
        filesize: u64,
        session: &mut TransferSession,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TransferSummary, TransferError> {
        let mut stream = self.connect(session)?;
        self.stream_file(&mut stream, file, filesize, session, observer)?;
        session.finish()
    }

    fn connect(&self, session: &mut TransferSession) -> Result<TcpStream, TransferError> {
        let endpoint = self.config.endpoint();
        info!("📡 Connecting to {}", endpoint);

        let stream = TcpStream::connect((self.config.address.as_str(), self.config.port))
            .map_err(|e| match e.kind() {
                io::ErrorKind::ConnectionRefused => TransferError::ConnectionRefused {
                    address: endpoint.clone(),
                },
                _ => TransferError::socket(format!("connecting to {}", endpoint), e),
            })?;

        session.connected(stream.peer_addr().ok())?;
        info!("🔗 Connected to {}", endpoint);
        Ok(stream)
    }

    /// Write the header, then the file body, to an already connected stream.
    pub(crate) fn stream_file<W, R>(
        &self,
        stream: &mut W,
        file: &mut R,
        filesize: u64,
        session: &mut TransferSession,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(), TransferError>
    where
        W: Write + ?Sized,
        R: Read + ?Sized,
    {
        stream
            .write_all(&encode_header(filesize))
            .and_then(|()| stream.flush())
            .map_err(|e| TransferError::socket("sending header", e))?;
        session.header_exchanged(filesize)?;
        info!("📦 Announced {} bytes", filesize);

        session.advance(TransferState::Streaming)?;
        let chunk_size = self.options.effective_chunk_size();
        copy_exact(file, stream, filesize, chunk_size, |sent| {
            session.record_chunk(sent);
            observer.on_progress(Role::Send, Progress::new(sent, filesize));
        })
        .map_err(|e| self.classify_copy_error(e))?;

        Ok(())
    }

    fn classify_copy_error(&self, err: CopyError) -> TransferError {
        let source = self
            .config
            .filename
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match err {
            CopyError::Read(e) => TransferError::io(format!("reading {}", source), e),
            CopyError::Write(e) => TransferError::Unexpected(e.to_string()),
            CopyError::UnexpectedEof { copied, expected } => TransferError::io(
                format!("reading {}", source),
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file shrank to {} of {} bytes during transfer", copied, expected),
                ),
            ),
        }
    }
}

impl Transfer for Sender {
    fn role(&self) -> Role {
        Role::Send
    }

    fn config(&self) -> &TransferConfig {
        &self.config
    }

    fn run(&self, observer: &mut dyn ProgressObserver) -> Result<TransferSummary, TransferError> {
        self.send(observer)
    }
}

/// Byte length of a readable regular file.
fn source_size(path: &Path) -> Result<u64, TransferError> {
    let metadata = fs::metadata(path).map_err(|e| classify_file_error(path, "inspecting", e))?;
    if !metadata.is_file() {
        return Err(TransferError::io(
            format!("inspecting {}", path.display()),
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(metadata.len())
}

fn classify_file_error(path: &Path, action: &str, err: io::Error) -> TransferError {
    match err.kind() {
        io::ErrorKind::NotFound => TransferError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => TransferError::io(format!("{} {}", action, path.display()), err),
    }
}
