//! The simulation's own timestamped log output (component, §4.9), distinct
//! from the crate's internal `log`/`env_logger` diagnostics. Every dispatch
//! event the donor prints with `printf`/`fprintf` goes through here instead,
//! so monitor output, file output, and "both" output share one formatting path.

use std::fmt;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use crate::error::SimError;

/// Who a log line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The simulator itself (start/stop banners, idle notices).
    Os,
    /// A specific process.
    Process(u32),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Os => write!(f, "OS"),
            Self::Process(pid) => write!(f, "Process {pid}"),
        }
    }
}

/// A destination for the simulation's timestamped log lines.
pub trait LogSink {
    /// Emits one line, timestamped at `timestamp_us` simulated microseconds,
    /// attributed to `actor`, describing `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying destination (typically a file)
    /// cannot be written to.
    fn emit(&mut self, timestamp_us: u64, actor: Actor, message: &str) -> Result<(), SimError>;
}

fn format_line(timestamp_us: u64, actor: Actor, message: &str) -> String {
    let hours = (timestamp_us / 3_600_000_000) % 24;
    let minutes = (timestamp_us / 60_000_000) % 60;
    let seconds = (timestamp_us / 1_000_000) % 60;
    let micros = timestamp_us % 1_000_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{micros:06}, {actor}: {message}\n")
}

/// Writes every line to stdout, as the donor does when `logTo` is `Monitor`.
#[derive(Debug, Default)]
pub struct MonitorSink;

impl LogSink for MonitorSink {
    fn emit(&mut self, timestamp_us: u64, actor: Actor, message: &str) -> Result<(), SimError> {
        print!("{}", format_line(timestamp_us, actor, message));
        Ok(())
    }
}

/// Writes every line to a configured file, with a header banner, as the donor
/// does when `logTo` is `File`.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Creates (truncating) the log file at `path` and writes its header banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the header cannot be
    /// written.
    pub fn create(path: &Path, header: &str) -> Result<Self, SimError> {
        let mut file = File::create(path).map_err(|source| SimError::LogFileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        writeln!(file, "{header}").map_err(|source| SimError::LogFileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl LogSink for FileSink {
    fn emit(&mut self, timestamp_us: u64, actor: Actor, message: &str) -> Result<(), SimError> {
        self.file
            .write_all(format_line(timestamp_us, actor, message).as_bytes())
            .map_err(|source| SimError::LogFileAccess {
                path: std::path::PathBuf::new(),
                source,
            })
    }
}

/// Writes every line to both a monitor sink and a file sink, as the donor
/// does when `logTo` is `Both`.
#[derive(Debug)]
pub struct BothSink {
    monitor: MonitorSink,
    file: FileSink,
}

impl BothSink {
    /// Pairs a monitor sink with a file sink so every line goes to both.
    #[must_use]
    pub fn new(file: FileSink) -> Self {
        Self {
            monitor: MonitorSink,
            file,
        }
    }
}

impl LogSink for BothSink {
    fn emit(&mut self, timestamp_us: u64, actor: Actor, message: &str) -> Result<(), SimError> {
        self.monitor.emit(timestamp_us, actor, message)?;
        self.file.emit(timestamp_us, actor, message)
    }
}
