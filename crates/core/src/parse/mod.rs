//! File parsers for the configuration and op-code formats (§6). Out of the
//! core scheduler's scope per §1, but implemented here so the crate is
//! runnable end to end from a config file path.

pub mod config;
pub mod opcode;
