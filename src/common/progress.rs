//! # Progress Reporting
//!
//! Both roles emit a [`Progress`] observation after every chunk and a
//! completion signal once the payload is fully moved. Rendering is left to
//! the [`ProgressObserver`] the caller plugs in.

use std::io::{self, Stdout, Write};

use crate::transfer::Role;

/// Bytes moved so far out of the announced total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub bytes_moved: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(bytes_moved: u64, total: u64) -> Self {
        Self { bytes_moved, total }
    }

    /// Completion percentage in `0.0..=100.0`. An empty payload counts as done.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.bytes_moved as f64 / self.total as f64 * 100.0
    }
}

pub trait ProgressObserver {
    /// Called after each chunk is written.
    fn on_progress(&mut self, role: Role, progress: Progress);

    /// Called once when the whole payload has been moved.
    fn on_complete(&mut self, _role: Role, _total: u64) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _role: Role, _progress: Progress) {}
}

/// Single-line console renderer: `\rSent 4096/10000 bytes (41.0%)`.
pub struct ConsoleProgress<W: Write = Stdout> {
    out: W,
    line_open: bool,
}

impl ConsoleProgress<Stdout> {
    /// Renderer writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    /// Renderer writing to any sink, e.g. a `Vec<u8>` in tests.
    pub fn new(out: W) -> Self {
        Self {
            out,
            line_open: false,
        }
    }

    /// Terminate a half-drawn progress line so later output starts cleanly.
    pub fn abandon(&mut self) {
        if self.line_open {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
            self.line_open = false;
        }
    }

    /// Give back the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressObserver for ConsoleProgress<W> {
    fn on_progress(&mut self, role: Role, progress: Progress) {
        // Console output is best effort; a closed stdout must not abort the transfer.
        let _ = write!(
            self.out,
            "\r{} {}/{} bytes ({:.1}%)",
            role.verb(),
            progress.bytes_moved,
            progress.total,
            progress.percentage()
        );
        let _ = self.out.flush();
        self.line_open = true;
    }

    fn on_complete(&mut self, role: Role, _total: u64) {
        let message = match role {
            Role::Send => "File transmission complete!",
            Role::Receive => "File received and saved!",
        };
        let _ = writeln!(self.out, "\n{}", message);
        let _ = self.out.flush();
        self.line_open = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Observer that keeps every observation, for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) seen: Vec<Progress>,
    }

    impl ProgressObserver for Recorder {
        fn on_progress(&mut self, _role: Role, progress: Progress) {
            self.seen.push(progress);
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Progress::new(0, 0).percentage(), 100.0);
        assert_eq!(Progress::new(24, 48).percentage(), 50.0);
        assert_eq!(Progress::new(48, 48).percentage(), 100.0);
    }

    #[test]
    fn test_console_rendering() {
        let mut console = ConsoleProgress::new(Vec::new());
        console.on_progress(Role::Send, Progress::new(4096, 10000));
        console.on_progress(Role::Send, Progress::new(10000, 10000));
        console.on_complete(Role::Send, 10000);

        let text = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(
            text,
            "\rSent 4096/10000 bytes (41.0%)\rSent 10000/10000 bytes (100.0%)\nFile transmission complete!\n"
        );
    }

    #[test]
    fn test_console_abandon_closes_line() {
        let mut console = ConsoleProgress::new(Vec::new());
        console.abandon();
        console.on_progress(Role::Receive, Progress::new(1, 3));
        console.abandon();

        let text = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(text, "\rReceived 1/3 bytes (33.3%)\n");
    }
}
