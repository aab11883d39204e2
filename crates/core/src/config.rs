//! Configuration data model (component F, §6). Field-for-field match to the
//! donor's `ConfigDataType` struct (`ConfigAccess.h`); parsing lives in
//! [`crate::parse::config`].

use std::path::PathBuf;

use crate::policy::SchedulingPolicy;

/// Where the simulation's own timestamped log lines are written. The file
/// variants carry their path directly so a validated `Config` can never be
/// missing one, rather than leaving it a separately-validated `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Standard output only.
    Monitor,
    /// A file only.
    File(PathBuf),
    /// Both standard output and a file.
    Both(PathBuf),
}

/// Fully validated simulation configuration, parsed from a config file (§6).
#[derive(Debug, Clone)]
pub struct Config {
    /// Config file format version, echoed in log output but not otherwise used.
    pub version: f32,
    /// Path to the op-code program file (the config key is `File Path`).
    pub opcode_file_path: PathBuf,
    /// Scheduling policy selected for this run.
    pub scheduling_policy: SchedulingPolicy,
    /// Quantum length, in cycles, for `RR-P`. Ignored by other policies.
    pub quantum_cycles: u32,
    /// Total memory available to the MMU, in the same units as `M` op offsets.
    pub mem_available_kb: u32,
    /// Milliseconds of simulated time per `P` op cycle.
    pub proc_cycle_ms: u32,
    /// Milliseconds of simulated time per `I`/`O` op cycle.
    pub io_cycle_ms: u32,
    /// Where to write the simulation's own log lines.
    pub log_to: LogDestination,
}
