//! The scheduler (component E): policy-driven selection and execution loop,
//! the orchestrator tying together the op-code program, PCB queue, MMU, and
//! interrupt queue. Translated from `runSimulator` (`Simulator.c`); the
//! non-preemptive and preemptive dispatch loops are kept as two distinct
//! methods, mirroring the donor's own branch rather than unifying them behind
//! one generic loop that would obscure the very different control flow each
//! uses.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::SimError;
use crate::interrupt::InterruptQueue;
use crate::mmu::{Mmu, MmuOutcome};
use crate::opcode::{OpLetter, OpName, Program};
use crate::pcb::{Pcb, PcbQueue, ProcessState};
use crate::sink::{Actor, LogSink};
use crate::stats::Stats;

/// Owns every piece of simulation state and runs one complete simulation.
#[derive(Debug)]
pub struct Scheduler<C: Clock, S: LogSink> {
    config: Config,
    program: Program,
    pcbs: PcbQueue,
    mmu: Mmu,
    interrupts: InterruptQueue,
    clock: C,
    sink: S,
    stats: Stats,
}

impl<C: Clock, S: LogSink> Scheduler<C, S> {
    /// Builds a scheduler for one run, with an empty PCB queue; [`Self::run`]
    /// performs admission and dispatch.
    #[must_use]
    pub fn new(config: Config, program: Program, clock: C, sink: S) -> Self {
        let mmu = Mmu::new(config.mem_available_kb);
        Self {
            config,
            program,
            pcbs: PcbQueue::new(),
            mmu,
            interrupts: InterruptQueue::new(),
            clock,
            sink,
            stats: Stats::new(),
        }
    }

    /// Runs the simulation to completion and returns its final counters.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PcbInitialization`] if the op-code program cannot
    /// be partitioned into well-formed PCBs, or a log sink error if the
    /// configured destination cannot be written to.
    pub fn run(&mut self) -> Result<Stats, SimError> {
        self.log_os("System Start")?;

        self.admit_processes()?;
        self.log_os("Create Process Control Blocks")?;
        self.log_os("All processes initialized in New state")?;

        self.pcbs.set_all(ProcessState::Ready);
        self.log_os("All processes now set in Ready state")?;

        if self.config.scheduling_policy.is_preemptive() {
            self.run_preemptive()?;
        } else {
            self.run_non_preemptive()?;
        }

        self.stats.total_simulated_ms = self.clock.now_us() / 1000;

        self.pcbs.sort(self.config.scheduling_policy);
        self.mmu.clear_all();
        self.log_os("System stop")?;
        self.log_os("End Simulation - Complete")?;

        Ok(self.stats)
    }

    fn log_os(&mut self, message: impl AsRef<str>) -> Result<(), SimError> {
        let now = self.clock.now_us();
        self.sink.emit(now, Actor::Os, message.as_ref())
    }

    fn log_proc(&mut self, pid: u32, message: impl AsRef<str>) -> Result<(), SimError> {
        let now = self.clock.now_us();
        self.sink.emit(now, Actor::Process(pid), message.as_ref())
    }

    /// Walks the op-code program, creating one PCB per `A(start)`/`A(end)`
    /// pair and computing its remaining time from the cycles between them.
    /// PIDs are assigned densely in admission order (§3).
    fn admit_processes(&mut self) -> Result<(), SimError> {
        let mut next_pid = 0u32;
        let mut seen_end = false;

        for (idx, op) in self.program.iter() {
            match (op.letter, op.name) {
                (OpLetter::A, OpName::Start) => {
                    let cursor = idx + 1;
                    let time_remaining = Self::calculate_time_remaining(
                        &self.program,
                        cursor,
                        self.config.proc_cycle_ms,
                        self.config.io_cycle_ms,
                    );
                    self.pcbs.admit(Pcb::new(next_pid, cursor, time_remaining));
                }
                (OpLetter::A, OpName::End) => next_pid += 1,
                (OpLetter::S, OpName::End) => {
                    seen_end = true;
                    break;
                }
                _ => {}
            }
        }

        if !seen_end {
            return Err(SimError::PcbInitialization);
        }
        Ok(())
    }

    fn calculate_time_remaining(program: &Program, start_cursor: usize, proc_cycle_ms: u32, io_cycle_ms: u32) -> u64 {
        let mut total = 0u64;
        let mut cursor = start_cursor;
        while let Some(op) = program.get(cursor) {
            match op.letter {
                OpLetter::A if op.name == OpName::End => break,
                OpLetter::P => total += u64::from(op.value) * u64::from(proc_cycle_ms),
                OpLetter::I | OpLetter::O => total += u64::from(op.value) * u64::from(io_cycle_ms),
                _ => {}
            }
            cursor += 1;
        }
        total
    }

    fn mmu_outcome(&mut self, pid: u32, name: OpName, segment: u32, base: u32, offset: u32) -> MmuOutcome {
        match name {
            OpName::Allocate => self.mmu.allocate(pid, segment, base, offset),
            OpName::Access => self.mmu.access(pid, segment, base, offset),
            _ => MmuOutcome::Fail,
        }
    }

    /// FCFS-N / SJF-N: one process runs to `A(end)`, a segmentation fault, or
    /// the end of its program before the next is ever selected. No `BLOCKED`
    /// state, no interrupt queue use (§4.5).
    fn run_non_preemptive(&mut self) -> Result<(), SimError> {
        loop {
            self.pcbs.sort(self.config.scheduling_policy);
            let Some(idx) = self.pcbs.next_ready_index() else {
                break;
            };
            let Some(pcb) = self.pcbs.get(idx) else { break };
            let pid = pcb.pid;
            let time_remaining = pcb.time_remaining_ms;
            self.log_os(format!("Process {pid} selected with {time_remaining} ms remaining"))?;
            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                pcb.state = ProcessState::Running;
            }

            loop {
                let Some(cursor) = self.pcbs.pcb_by_pid(pid).and_then(|p| p.cursor) else {
                    break;
                };
                let Some(op) = self.program.get(cursor).copied() else {
                    break;
                };

                match op.letter {
                    OpLetter::A if op.name == OpName::End => {
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.state = ProcessState::Exit;
                        }
                        break;
                    }
                    OpLetter::P => {
                        self.log_proc(pid, format!("{} operation start", op.name))?;
                        self.clock.advance_us(u64::from(op.value) * u64::from(self.config.proc_cycle_ms) * 1000);
                        self.log_proc(pid, format!("{} operation end", op.name))?;
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.time_remaining_ms = pcb
                                .time_remaining_ms
                                .saturating_sub(u64::from(op.value) * u64::from(self.config.proc_cycle_ms));
                            pcb.cursor = Some(cursor + 1);
                        }
                    }
                    OpLetter::I | OpLetter::O => {
                        self.log_proc(pid, format!("{} operation start", op.name))?;
                        self.clock.advance_us(u64::from(op.value) * u64::from(self.config.io_cycle_ms) * 1000);
                        self.log_proc(pid, format!("{} operation end", op.name))?;
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.time_remaining_ms = pcb
                                .time_remaining_ms
                                .saturating_sub(u64::from(op.value) * u64::from(self.config.io_cycle_ms));
                            pcb.cursor = Some(cursor + 1);
                        }
                    }
                    OpLetter::M => {
                        let (segment, base, offset) = op.memory_command();
                        let outcome = self.mmu_outcome(pid, op.name, segment, base, offset);
                        if outcome.is_ok() {
                            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                                pcb.cursor = Some(cursor + 1);
                            }
                        } else {
                            self.log_proc(pid, format!("{} operation failed, segmentation fault", op.name))?;
                            self.stats.segmentation_faults += 1;
                            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                                pcb.state = ProcessState::Exit;
                            }
                            break;
                        }
                    }
                    OpLetter::S | OpLetter::A => {
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.cursor = Some(cursor + 1);
                        }
                    }
                }
            }

            self.log_os(format!("Process {pid} ended and set in EXIT state"))?;
            self.mmu.clear_all();
            self.stats.processes_dispatched += 1;
        }
        Ok(())
    }

    /// SRTF-P / FCFS-P / RR-P: the outer loop runs until every PCB has
    /// exited, idling on the interrupt queue whenever nothing is ready, and
    /// slicing each selection's run into at most `quantum` cycles (§4.5).
    fn run_preemptive(&mut self) -> Result<(), SimError> {
        while !self.pcbs.all_ended() {
            if !self.pcbs.any_ready() && !self.idle_until_ready()? {
                break;
            }
            if self.pcbs.all_ended() {
                break;
            }

            self.pcbs.sort(self.config.scheduling_policy);
            let Some(idx) = self.pcbs.next_ready_index() else {
                continue;
            };
            let Some(pcb) = self.pcbs.get(idx) else { continue };
            let pid = pcb.pid;
            let time_remaining = pcb.time_remaining_ms;
            self.log_os(format!("Process {pid} selected with {time_remaining} ms remaining"))?;
            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                pcb.state = ProcessState::Running;
            }

            let (blocked, exited) = self.run_quantum(pid)?;
            self.finish_slice(pid, blocked, exited)?;
        }
        Ok(())
    }

    /// Repeatedly drains ready interrupts (or advances the clock to the next
    /// one) until some PCB becomes `READY`. Returns `false` if the queue is
    /// exhausted with nothing left to wait for, which indicates every
    /// remaining PCB is stuck — a state the scheduler has no recovery from.
    fn idle_until_ready(&mut self) -> Result<bool, SimError> {
        while !self.pcbs.any_ready() && !self.pcbs.all_ended() {
            let now = self.clock.now_us();
            if self.interrupts.peek_ready(now) {
                self.deliver_one_interrupt()?;
            } else if let Some(record) = self.interrupts.peek() {
                let target = record.ending_time_us;
                self.clock.advance_us(target.saturating_sub(now));
            } else {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn deliver_one_interrupt(&mut self) -> Result<(), SimError> {
        let Some(record) = self.interrupts.pop() else {
            return Ok(());
        };
        self.log_os(format!("Interrupt called by process {}", record.pid))?;
        self.log_proc(record.pid, format!("{} {} end", record.op_name, record.op_type))?;
        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(record.pid) {
            pcb.state = ProcessState::Ready;
        }
        self.log_os(format!("Process {} set in READY state", record.pid))?;
        Ok(())
    }

    /// Runs one process for up to `config.quantum_cycles` cycles, or until it
    /// blocks on I/O, exits, or a ready interrupt preempts it. Returns
    /// `(blocked, exited)`.
    fn run_quantum(&mut self, pid: u32) -> Result<(bool, bool), SimError> {
        let mut quantum = self.config.quantum_cycles;
        let mut blocked = false;
        let mut exited = false;

        loop {
            if quantum == 0 {
                break;
            }
            let Some(pcb) = self.pcbs.pcb_by_pid(pid) else {
                exited = true;
                break;
            };
            if pcb.time_remaining_ms == 0 {
                exited = true;
                break;
            }
            let Some(cursor) = pcb.cursor else {
                exited = true;
                break;
            };
            let Some(op) = self.program.get(cursor).copied() else {
                exited = true;
                break;
            };

            match op.letter {
                OpLetter::A if op.name == OpName::End => {
                    exited = true;
                    break;
                }
                OpLetter::I | OpLetter::O => {
                    let now = self.clock.now_us();
                    let ending = now + u64::from(op.value) * u64::from(self.config.io_cycle_ms) * 1000;
                    self.log_proc(pid, format!("{} operation start", op.name))?;
                    if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                        pcb.time_remaining_ms = pcb
                            .time_remaining_ms
                            .saturating_sub(u64::from(op.value) * u64::from(self.config.io_cycle_ms));
                        pcb.cursor = Some(cursor + 1);
                    }
                    // Known discrepancy preserved from the donor: both I and O
                    // ops are posted with opType "input" (see design notes).
                    self.interrupts.add(pid, "input", op.name, ending);
                    blocked = true;
                    break;
                }
                OpLetter::P => {
                    let residual = self
                        .pcbs
                        .pcb_by_pid(pid)
                        .and_then(|p| p.residual)
                        .unwrap_or(op.value);
                    if residual == op.value {
                        self.log_proc(pid, format!("{} operation start", op.name))?;
                    }
                    if op.value == 0 {
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.cursor = Some(cursor + 1);
                            pcb.residual = None;
                        }
                        continue;
                    }

                    self.clock.advance_us(u64::from(self.config.proc_cycle_ms) * 1000);
                    let new_residual = residual - 1;
                    if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                        pcb.time_remaining_ms = pcb.time_remaining_ms.saturating_sub(u64::from(self.config.proc_cycle_ms));
                        pcb.residual = Some(new_residual);
                    }
                    quantum -= 1;

                    if new_residual == 0 {
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.cursor = Some(cursor + 1);
                            pcb.residual = None;
                        }
                        break;
                    }
                    if self.interrupts.peek_ready(self.clock.now_us()) {
                        break;
                    }
                }
                OpLetter::M => {
                    let (segment, base, offset) = op.memory_command();
                    let outcome = self.mmu_outcome(pid, op.name, segment, base, offset);
                    if outcome.is_ok() {
                        if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                            pcb.cursor = Some(cursor + 1);
                        }
                    } else {
                        self.log_proc(pid, format!("{} operation failed, segmentation fault", op.name))?;
                        self.stats.segmentation_faults += 1;
                        exited = true;
                        break;
                    }
                }
                OpLetter::S | OpLetter::A => {
                    if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                        pcb.cursor = Some(cursor + 1);
                    }
                }
            }
        }

        Ok((blocked, exited))
    }

    /// Disposition after one quantum slice: exit, block, or drain interrupts
    /// and return the process (or a sibling) to `READY` (§4.5 step 4).
    fn finish_slice(&mut self, pid: u32, blocked: bool, exited: bool) -> Result<(), SimError> {
        let time_remaining = self.pcbs.pcb_by_pid(pid).map_or(0, |p| p.time_remaining_ms);

        if exited || time_remaining == 0 {
            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                pcb.state = ProcessState::Exit;
            }
            self.log_os(format!("Process {pid} ended and set in EXIT state"))?;
            self.stats.processes_dispatched += 1;
            return Ok(());
        }

        if blocked {
            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                pcb.state = ProcessState::Blocked;
            }
            self.log_os(format!("Process {pid} set in BLOCKED state"))?;
            return Ok(());
        }

        if self.interrupts.peek_ready(self.clock.now_us()) {
            let still_running = self.pcbs.pcb_by_pid(pid).is_some_and(|p| matches!(p.state, ProcessState::Running));
            if still_running {
                if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                    pcb.state = ProcessState::Ready;
                }
                self.stats.context_switches += 1;
            }
            while self.interrupts.peek_ready(self.clock.now_us()) {
                self.deliver_one_interrupt()?;
            }
        }

        let still_running = self.pcbs.pcb_by_pid(pid).is_some_and(|p| matches!(p.state, ProcessState::Running));
        if still_running {
            self.log_proc(pid, "operation end")?;
            if let Some(pcb) = self.pcbs.pcb_mut_by_pid(pid) {
                pcb.state = ProcessState::Ready;
            }
            self.log_os(format!("Process {pid} set in READY state"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::config::LogDestination;
    use crate::opcode::{OpCode, OpLetter as L, OpName as N};
    use crate::policy::SchedulingPolicy;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

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

    fn base_config(policy: SchedulingPolicy) -> Config {
        Config {
            version: 1.0,
            opcode_file_path: "program.mdf".into(),
            scheduling_policy: policy,
            quantum_cycles: 2,
            mem_available_kb: 1000,
            proc_cycle_ms: 10,
            io_cycle_ms: 10,
            log_to: LogDestination::Monitor,
        }
    }

    fn single_process_program(run_value: u32) -> Program {
        Program::new(vec![
            OpCode::new(L::S, N::Start, 0),
            OpCode::new(L::A, N::Start, 0),
            OpCode::new(L::P, N::Run, run_value),
            OpCode::new(L::A, N::End, 0),
            OpCode::new(L::S, N::End, 0),
        ])
    }

    #[test]
    fn fcfs_n_runs_one_process_to_exit_with_expected_total_time() {
        let config = base_config(SchedulingPolicy::FcfsN);
        let program = single_process_program(3);
        let sink = VecSink::default();
        let mut scheduler = Scheduler::new(config, program, SimClock::new(), sink.clone());

        let stats = scheduler.run().unwrap();
        assert_eq!(stats.processes_dispatched, 1);
        assert_eq!(stats.total_simulated_ms, 30);

        let lines = sink.lines.borrow();
        assert!(lines.iter().any(|l| l.contains("OS: Process 0 selected with 30 ms remaining")));
        assert!(lines.iter().any(|l| l.contains("OS: Process 0 ended and set in EXIT state")));
    }

    #[test]
    fn sjf_n_selects_shorter_job_first() {
        let config = base_config(SchedulingPolicy::SjfN);
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
        let sink = VecSink::default();
        let mut scheduler = Scheduler::new(config, program, SimClock::new(), sink.clone());
        scheduler.run().unwrap();

        let lines = sink.lines.borrow();
        let first_selected = lines.iter().find(|l| l.contains("selected with")).unwrap();
        assert!(first_selected.contains("OS: Process 1 selected with 30 ms remaining"));
    }

    #[test]
    fn mmu_allocate_failure_segfaults_and_skips_remaining_ops() {
        let mut config = base_config(SchedulingPolicy::FcfsN);
        config.mem_available_kb = 1000;
        let program = Program::new(vec![
            OpCode::new(L::S, N::Start, 0),
            OpCode::new(L::A, N::Start, 0),
            OpCode::new(L::M, N::Allocate, 1_002_000),
            OpCode::new(L::P, N::Run, 99),
            OpCode::new(L::A, N::End, 0),
            OpCode::new(L::S, N::End, 0),
        ]);
        let sink = VecSink::default();
        let mut scheduler = Scheduler::new(config, program, SimClock::new(), sink.clone());
        let stats = scheduler.run().unwrap();

        assert_eq!(stats.segmentation_faults, 1);
        let lines = sink.lines.borrow();
        assert!(!lines.iter().any(|l| l.contains("run operation start")));
    }

    #[test]
    fn rr_p_with_quantum_one_switches_after_every_cycle() {
        let mut config = base_config(SchedulingPolicy::RrP);
        config.quantum_cycles = 1;
        let program = Program::new(vec![
            OpCode::new(L::S, N::Start, 0),
            OpCode::new(L::A, N::Start, 0),
            OpCode::new(L::P, N::Run, 2),
            OpCode::new(L::A, N::End, 0),
            OpCode::new(L::A, N::Start, 0),
            OpCode::new(L::P, N::Run, 2),
            OpCode::new(L::A, N::End, 0),
            OpCode::new(L::S, N::End, 0),
        ]);
        let sink = VecSink::default();
        let mut scheduler = Scheduler::new(config, program, SimClock::new(), sink.clone());
        let stats = scheduler.run().unwrap();

        assert_eq!(stats.processes_dispatched, 2);
        let lines = sink.lines.borrow();
        let switch_count = lines.iter().filter(|l| l.contains("set in READY state")).count();
        assert!(switch_count >= 2);
    }
}
