//! Error taxonomy for configuration parsing, op-code parsing, and the scheduler.
//!
//! Mirrors the donor C simulator's error codes (`ConfigAccess.h`, `MetaDataAccess.h`,
//! `Simulator.h`) as typed, `Display`-able enums instead of integer codes.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading and validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be opened or read.
    #[error("config file access error for {path}: {source}")]
    FileAccess {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The header or footer banner did not match the expected text exactly.
    #[error("corrupt descriptor: {0}")]
    CorruptDescriptor(&'static str),

    /// A line's key did not match any recognized configuration prompt.
    #[error("corrupt prompt: {0:?}")]
    CorruptPrompt(String),

    /// A recognized key's value fell outside its documented domain.
    #[error("data out of range for {key}: {value:?}")]
    DataOutOfRange {
        /// The configuration key whose value was rejected.
        key: &'static str,
        /// The raw value text that failed validation.
        value: String,
    },

    /// The file ended before every required key was seen.
    #[error("incomplete configuration file: missing {0}")]
    IncompleteFile(&'static str),
}

/// Errors that can occur while reading and validating an op-code file.
#[derive(Debug, Error)]
pub enum OpCodeError {
    /// The op-code file could not be opened or read.
    #[error("op-code file access error for {path}: {source}")]
    FileAccess {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The header or footer banner did not match the expected text exactly.
    #[error("corrupt descriptor: {0}")]
    CorruptDescriptor(&'static str),

    /// An op-code's leading letter was not one of `S,A,P,M,I,O`.
    #[error("corrupt op-code letter: {0:?}")]
    CorruptLetter(char),

    /// An op-code's name was not in the recognized catalog.
    #[error("corrupt op-code name: {0:?}")]
    CorruptName(String),

    /// An op-code's value was missing, non-numeric, or more than 9 digits.
    #[error("corrupt op-code value: {0:?}")]
    CorruptValue(String),

    /// `S`/`A` start and end counts did not match.
    #[error("unbalanced start/end op-codes")]
    UnbalancedStartEnd,
}

/// Fatal scheduler errors. Runtime per-process faults (segmentation faults)
/// are not represented here — they terminate only the offending process and
/// are reported through the log sink, not through `Result`.
#[derive(Debug, Error)]
pub enum SimError {
    /// Propagated from configuration parsing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Propagated from op-code parsing.
    #[error(transparent)]
    OpCode(#[from] OpCodeError),

    /// The op-code program could not be partitioned into well-formed PCBs.
    #[error("PCB initialization error")]
    PcbInitialization,

    /// The configured log file could not be created or written.
    #[error("log file access error for {path}: {source}")]
    LogFileAccess {
        /// Path that could not be opened for writing.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
