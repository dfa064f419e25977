//! # Transmitter Binary Entry Point
//!
//! Thin wrapper that parses the command line and runs one side of a transfer.
//!
//! ## Usage
//!
//! ```bash
//! # On the receiving machine (writes ./output.txt)
//! cargo run --bin transmitter -- recv 0.0.0.0 12345
//!
//! # On the sending machine
//! cargo run --bin transmitter -- send notes.txt 192.168.1.20 12345
//! ```
//!
//! Optional flags:
//! - `--verbose`: debug-level logging
//! - `--metrics-output <path>`: write a JSON report of the transfer
//!
//! Exit status is 0 on success (or when only help was printed) and 1 when
//! the transfer fails. A metrics file that cannot be written is logged and
//! does not change the exit status.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use env_logger::Builder;
use log::{error, info, LevelFilter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use file_transmitter::common::config::DEFAULT_CHUNK_SIZE;
use file_transmitter::{
    ConsoleProgress, Receiver, Sender, Transfer, TransferConfig, TransferError, TransferMetrics,
    TransferOptions, TransferSummary,
};

/// File transmitter utility
///
/// Transfers a single file between networked computers over TCP. Use `send`
/// to transmit a file to a remote host and `recv` to receive one. All
/// transfers are handled as binary data.
#[derive(Parser, Debug)]
#[command(name = "transmitter", author, version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to write a JSON transfer report (optional)
    #[arg(long, global = true)]
    metrics_output: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a file
    Send {
        /// File to send
        filename: PathBuf,
        /// Target IP address
        ip: String,
        /// Target port
        port: u16,
        /// Bytes per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Receive a file into ./output.txt
    Recv {
        /// Listening IP address
        ip: String,
        /// Listening port
        port: u16,
        /// Bytes per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

fn build_transfer(command: Command) -> Box<dyn Transfer> {
    match command {
        Command::Send {
            filename,
            ip,
            port,
            chunk_size,
        } => Box::new(Sender::new(
            TransferConfig::sender(ip, port, filename),
            TransferOptions::default().with_chunk_size(chunk_size),
        )),
        Command::Recv {
            ip,
            port,
            chunk_size,
        } => Box::new(Receiver::new(
            TransferConfig::receiver(ip, port),
            TransferOptions::default().with_chunk_size(chunk_size),
        )),
    }
}

/// Print the one-line error for a failed transfer.
///
/// Returns whether the transfer succeeded. Runs before anything else that can
/// fail so the transfer's own error always reaches the user.
fn report_result<P: Write, E: Write>(
    result: &Result<TransferSummary, TransferError>,
    progress: &mut ConsoleProgress<P>,
    err_out: &mut E,
) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            progress.abandon();
            let _ = writeln!(err_out, "Error: {}", e);
            false
        }
    }
}

fn export_metrics(
    metrics: &TransferMetrics,
    result: &Result<TransferSummary, TransferError>,
    output_path: &str,
) -> anyhow::Result<()> {
    metrics
        .finish(result)
        .export_to_json(output_path)
        .with_context(|| format!("writing metrics to {}", output_path))?;
    info!("📊 Metrics exported to: {}", output_path);
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logger(args.verbose);

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let transfer = build_transfer(command);
    let metrics = TransferMetrics::start(transfer.role(), transfer.config().clone());

    let mut progress = ConsoleProgress::stdout();
    let result = transfer.run(&mut progress);
    let succeeded = report_result(&result, &mut progress, &mut io::stderr());

    // A failed report never changes the exit status of the transfer itself.
    if let Some(output_path) = args.metrics_output.as_deref() {
        if let Err(e) = export_metrics(&metrics, &result, output_path) {
            error!("❌ {:#}", e);
        }
    }

    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
