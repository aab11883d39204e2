//! Configuration file parser (§6), out of the core's scope but needed to
//! drive the scheduler end to end. Grounded on the donor's `getConfigData`
//! (`ConfigAccess.c`): exact header/footer text, nine required keys, and
//! per-key range validation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, LogDestination};
use crate::error::ConfigError;
use crate::policy::SchedulingPolicy;

const HEADER: &str = "Start Simulator Configuration File:";
const FOOTER: &str = "End Simulator Configuration File.";

/// The `Log To` key's value, before `Log File Path` (order-free in the file)
/// has necessarily been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogToKind {
    Monitor,
    File,
    Both,
}

/// Parses and validates a configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, the header/footer is
/// wrong, a line's key is unrecognized, a value is out of its documented
/// range, or a required key is missing.
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&text)
}

fn parse_config_str(text: &str) -> Result<Config, ConfigError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines.next().ok_or(ConfigError::CorruptDescriptor(HEADER))?;
    if header != HEADER {
        return Err(ConfigError::CorruptDescriptor(HEADER));
    }

    let mut version: Option<f32> = None;
    let mut opcode_file_path: Option<PathBuf> = None;
    let mut scheduling_policy: Option<SchedulingPolicy> = None;
    let mut quantum_cycles: Option<u32> = None;
    let mut mem_available_kb: Option<u32> = None;
    let mut proc_cycle_ms: Option<u32> = None;
    let mut io_cycle_ms: Option<u32> = None;
    let mut log_to_kind: Option<LogToKind> = None;
    let mut log_file_path: Option<PathBuf> = None;

    for line in lines.by_ref() {
        if line == FOOTER {
            break;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ConfigError::CorruptPrompt(line.to_string()))?;
        let key = key.trim();
        let value = value.trim().trim_end_matches('.').trim();

        match key {
            "Version/Phase" => {
                let v: f32 = value
                    .parse()
                    .map_err(|_| out_of_range("Version/Phase", value))?;
                if !(0.0..=10.00).contains(&v) {
                    return Err(out_of_range("Version/Phase", value));
                }
                version = Some(v);
            }
            "File Path" => {
                if value.is_empty() {
                    return Err(out_of_range("File Path", value));
                }
                opcode_file_path = Some(PathBuf::from(value));
            }
            "CPU Scheduling Code" => {
                scheduling_policy =
                    Some(SchedulingPolicy::parse(value).ok_or_else(|| out_of_range("CPU Scheduling Code", value))?);
            }
            "Quantum Time (cycles)" => {
                let v: u32 = value
                    .parse()
                    .map_err(|_| out_of_range("Quantum Time (cycles)", value))?;
                if v > 100 {
                    return Err(out_of_range("Quantum Time (cycles)", value));
                }
                quantum_cycles = Some(v);
            }
            "Memory Available (KB)" => {
                let v: u32 = value
                    .parse()
                    .map_err(|_| out_of_range("Memory Available (KB)", value))?;
                if v > 102_400 {
                    return Err(out_of_range("Memory Available (KB)", value));
                }
                mem_available_kb = Some(v);
            }
            "Processor Cycle Time (msec)" => {
                let v: u32 = value
                    .parse()
                    .map_err(|_| out_of_range("Processor Cycle Time (msec)", value))?;
                if !(1..=1000).contains(&v) {
                    return Err(out_of_range("Processor Cycle Time (msec)", value));
                }
                proc_cycle_ms = Some(v);
            }
            "I/O Cycle Time (msec)" => {
                let v: u32 = value
                    .parse()
                    .map_err(|_| out_of_range("I/O Cycle Time (msec)", value))?;
                if !(1..=10_000).contains(&v) {
                    return Err(out_of_range("I/O Cycle Time (msec)", value));
                }
                io_cycle_ms = Some(v);
            }
            "Log To" => {
                log_to_kind = Some(match value.to_ascii_lowercase().as_str() {
                    "monitor" => LogToKind::Monitor,
                    "file" => LogToKind::File,
                    "both" => LogToKind::Both,
                    _ => return Err(out_of_range("Log To", value)),
                });
            }
            "Log File Path" => {
                if value.is_empty() {
                    return Err(out_of_range("Log File Path", value));
                }
                log_file_path = Some(PathBuf::from(value));
            }
            other => return Err(ConfigError::CorruptPrompt(other.to_string())),
        }
    }

    let version = version.ok_or(ConfigError::IncompleteFile("Version/Phase"))?;
    let opcode_file_path = opcode_file_path.ok_or(ConfigError::IncompleteFile("File Path"))?;
    let scheduling_policy = scheduling_policy.ok_or(ConfigError::IncompleteFile("CPU Scheduling Code"))?;
    let quantum_cycles = quantum_cycles.ok_or(ConfigError::IncompleteFile("Quantum Time (cycles)"))?;
    let mem_available_kb = mem_available_kb.ok_or(ConfigError::IncompleteFile("Memory Available (KB)"))?;
    let proc_cycle_ms = proc_cycle_ms.ok_or(ConfigError::IncompleteFile("Processor Cycle Time (msec)"))?;
    let io_cycle_ms = io_cycle_ms.ok_or(ConfigError::IncompleteFile("I/O Cycle Time (msec)"))?;
    let log_to_kind = log_to_kind.ok_or(ConfigError::IncompleteFile("Log To"))?;
    let log_to = match log_to_kind {
        LogToKind::Monitor => LogDestination::Monitor,
        LogToKind::File => LogDestination::File(log_file_path.ok_or(ConfigError::IncompleteFile("Log File Path"))?),
        LogToKind::Both => LogDestination::Both(log_file_path.ok_or(ConfigError::IncompleteFile("Log File Path"))?),
    };

    Ok(Config {
        version,
        opcode_file_path,
        scheduling_policy,
        quantum_cycles,
        mem_available_kb,
        proc_cycle_ms,
        io_cycle_ms,
        log_to,
    })
}

fn out_of_range(key: &'static str, value: &str) -> ConfigError {
    ConfigError::DataOutOfRange {
        key,
        value: value.to_string(),
    }
}
