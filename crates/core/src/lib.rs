//! Core of a discrete-event operating-system process scheduler simulator.
//!
//! A [`scheduler::Scheduler`] drives a [`pcb::PcbQueue`] through the process
//! lifecycle under one of five [`policy::SchedulingPolicy`] variants,
//! consulting an [`mmu::Mmu`] for segmented memory operations and an
//! [`interrupt::InterruptQueue`] for asynchronous I/O completions, against an
//! immutable [`opcode::Program`]. Every decision is emitted through a
//! [`sink::LogSink`] as a strictly time-ordered line.
//!
//! Configuration and op-code file parsing ([`parse`]) and the CLI entry point
//! are outside this crate's core, but are implemented here so the simulator
//! is runnable end to end.

pub mod clock;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod mmu;
pub mod opcode;
pub mod parse;
pub mod pcb;
pub mod policy;
pub mod scheduler;
pub mod sink;
pub mod stats;

pub use config::Config;
pub use error::{ConfigError, OpCodeError, SimError};
pub use scheduler::Scheduler;
pub use stats::Stats;
