//! Command-line entry point for the OS process scheduler simulator.
//!
//! Reads a configuration file, loads the op-code program it names, runs the
//! simulation, and prints a final counter summary. All input and fatal
//! scheduler errors are reported as a single `FATAL ERROR: ..., Program
//! aborted` line on stderr with exit code 1 (§7).

use std::path::PathBuf;
use std::process;

use clap::Parser;

use ossim_core::clock::SimClock;
use ossim_core::config::LogDestination;
use ossim_core::error::SimError;
use ossim_core::parse::{config as parse_config, opcode as parse_opcode};
use ossim_core::sink::{BothSink, FileSink, MonitorSink};
use ossim_core::Scheduler;

#[derive(Parser, Debug)]
#[command(name = "ossim", author, version, about = "Discrete-event OS process scheduler simulator")]
struct Cli {
    /// Path to the simulator configuration file.
    config_path: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli.config_path) {
        Ok(()) => process::exit(0),
        Err(message) => {
            eprintln!("FATAL ERROR: {message}, Program aborted");
            process::exit(1);
        }
    }
}

fn run(config_path: &PathBuf) -> Result<(), SimError> {
    log::info!("loading configuration from {}", config_path.display());
    let config = parse_config::parse_config_file(config_path)?;

    log::info!("loading op-code program from {}", config.opcode_file_path.display());
    let program = parse_opcode::parse_opcode_file(&config.opcode_file_path)?;

    let header = format!(
        "Simulator log - version {:.2}, policy {:?}, quantum {}, memory {} KB",
        config.version, config.scheduling_policy, config.quantum_cycles, config.mem_available_kb
    );

    let log_to = config.log_to.clone();
    let clock = SimClock::new();

    let stats = match log_to {
        LogDestination::Monitor => {
            let mut scheduler = Scheduler::new(config, program, clock, MonitorSink);
            scheduler.run()?
        }
        LogDestination::File(path) => {
            let sink = FileSink::create(&path, &header)?;
            let mut scheduler = Scheduler::new(config, program, clock, sink);
            scheduler.run()?
        }
        LogDestination::Both(path) => {
            let file_sink = FileSink::create(&path, &header)?;
            let sink = BothSink::new(file_sink);
            let mut scheduler = Scheduler::new(config, program, clock, sink);
            scheduler.run()?
        }
    };

    println!("{stats}");
    Ok(())
}
