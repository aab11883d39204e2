//! End-to-end dispatch scenarios (§8), exercised against the public
//! `Scheduler` API with a deterministic clock and a line-capturing sink.

use std::cell::RefCell;
use std::rc::Rc;

use ossim_core::clock::SimClock;
use ossim_core::config::{Config, LogDestination};
use ossim_core::error::SimError;
use ossim_core::opcode::{OpCode, OpLetter as L, OpName as N, Program};
use ossim_core::policy::SchedulingPolicy;
use ossim_core::sink::{Actor, LogSink};
use ossim_core::Scheduler;

#[derive(Debug, Default, Clone)]
struct VecSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl LogSink for VecSink {
    fn emit(&mut self, timestamp_us: u64, actor: Actor, message: &str) -> Result<(), SimError> {
        self.lines.borrow_mut().push(format!("{timestamp_us} {actor}: {message}"));
        Ok(())
    }
}

fn config(policy: SchedulingPolicy, quantum: u32, proc_cycle_ms: u32, io_cycle_ms: u32, mem_kb: u32) -> Config {
    Config {
        version: 1.0,
        opcode_file_path: "program.mdf".into(),
        scheduling_policy: policy,
        quantum_cycles: quantum,
        mem_available_kb: mem_kb,
        proc_cycle_ms,
        io_cycle_ms,
        log_to: LogDestination::Monitor,
    }
}

fn run(config: Config, program: Program) -> (ossim_core::Stats, Vec<String>) {
    let sink = VecSink::default();
    let mut scheduler = Scheduler::new(config, program, SimClock::new(), sink.clone());
    let stats = scheduler.run().expect("scenario program is well-formed");
    let lines = sink.lines.borrow().clone();
    (stats, lines)
}

/// Scenario 1: FCFS-N, one process.
#[test]
fn fcfs_n_single_process_runs_to_completion() {
    let cfg = config(SchedulingPolicy::FcfsN, 0, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 3),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, lines) = run(cfg, program);
    assert_eq!(stats.processes_dispatched, 1);
    assert_eq!(stats.total_simulated_ms, 30);
    assert!(lines.iter().any(|l| l.contains("OS: Process 0 selected with 30 ms remaining")));
    assert!(lines.iter().any(|l| l.contains("OS: Process 0 ended and set in EXIT state")));
}

/// Scenario 2: SJF-N, two processes; the shorter job runs first.
#[test]
fn sjf_n_selects_shorter_job_first() {
    let cfg = config(SchedulingPolicy::SjfN, 0, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 10),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 3),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (_, lines) = run(cfg, program);
    let first_selected = lines.iter().find(|l| l.contains("selected with")).unwrap();
    assert!(first_selected.contains("OS: Process 1 selected with 30 ms remaining"));
}

/// Scenario 3: RR-P, two processes, quantum 2; completion order follows
/// admission order even though execution interleaves.
#[test]
fn rr_p_two_processes_complete_in_admission_order() {
    let cfg = config(SchedulingPolicy::RrP, 2, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 5),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 5),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, lines) = run(cfg, program);
    assert_eq!(stats.processes_dispatched, 2);
    let exits: Vec<&String> = lines.iter().filter(|l| l.contains("ended and set in EXIT state")).collect();
    assert_eq!(exits.len(), 2);
    assert!(exits[0].contains("OS: Process 0 ended and set in EXIT state"));
    assert!(exits[1].contains("OS: Process 1 ended and set in EXIT state"));
}

/// Scenario 4: MMU allocate failure segfaults and skips the rest of the program.
#[test]
fn mmu_allocate_failure_segfaults_process() {
    let cfg = config(SchedulingPolicy::FcfsN, 0, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::M, N::Allocate, 1_002_000),
        OpCode::new(L::P, N::Run, 99),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, lines) = run(cfg, program);
    assert_eq!(stats.segmentation_faults, 1);
    assert!(!lines.iter().any(|l| l.contains("run operation start")));
}

/// Scenario 5: allocate then access within bounds succeeds; access beyond the
/// allocation's length segfaults.
#[test]
fn mmu_access_beyond_allocation_length_segfaults() {
    let cfg = config(SchedulingPolicy::FcfsN, 0, 10, 10, 2000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::M, N::Allocate, 1000),
        OpCode::new(L::M, N::Access, 500),
        OpCode::new(L::M, N::Access, 1500),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, _) = run(cfg, program);
    assert_eq!(stats.segmentation_faults, 1);
}

/// Scenario 6: SRTF-P among initially-ready PCBs dispatches the one with
/// shorter remaining time first.
#[test]
fn srtf_p_dispatches_shorter_remaining_process_first() {
    let cfg = config(SchedulingPolicy::SrtfP, 4, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 10),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 1),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (_, lines) = run(cfg, program);
    let first_selected = lines.iter().find(|l| l.contains("selected with")).unwrap();
    assert!(first_selected.contains("OS: Process 1 selected with"));
}

/// Boundary: a P op with value 0 advances the cursor without a context switch.
#[test]
fn p_op_with_zero_value_does_not_consume_wall_time() {
    let cfg = config(SchedulingPolicy::FcfsN, 0, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 0),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, _) = run(cfg, program);
    assert_eq!(stats.total_simulated_ms, 0);
}

/// Boundary: quantum of 1 under RR-P forces a context switch after every
/// single cycle of a P op.
#[test]
fn rr_p_quantum_one_switches_every_cycle() {
    let cfg = config(SchedulingPolicy::RrP, 1, 10, 10, 1000);
    let program = Program::new(vec![
        OpCode::new(L::S, N::Start, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 3),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::A, N::Start, 0),
        OpCode::new(L::P, N::Run, 3),
        OpCode::new(L::A, N::End, 0),
        OpCode::new(L::S, N::End, 0),
    ]);

    let (stats, lines) = run(cfg, program);
    assert_eq!(stats.processes_dispatched, 2);
    let ready_transitions = lines.iter().filter(|l| l.contains("set in READY state")).count();
    assert!(ready_transitions >= 4);
}
