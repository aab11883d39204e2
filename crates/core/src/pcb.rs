//! Process control blocks and the PCB queue (component D).
//!
//! The donor walks a singly linked list of PCBs and mutates `currentOpCode`'s
//! value in place across quantum slices. Here the program is immutable
//! ([`crate::opcode::Program`]); each [`Pcb`] instead carries a `cursor` into
//! it and an optional `residual` tracking an in-progress `P` op's remaining
//! cycles across preemptions.

use crate::policy::SchedulingPolicy;

/// A process's lifecycle state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Admitted but not yet initialized onto the ready queue.
    New,
    /// Eligible to be dispatched.
    Ready,
    /// Currently holding the CPU.
    Running,
    /// Waiting on an I/O interrupt.
    Blocked,
    /// Finished; terminal state.
    Exit,
}

/// One process control block.
#[derive(Debug, Clone)]
pub struct Pcb {
    /// Process identifier, assigned in program order starting at 0.
    pub pid: u32,
    /// Current lifecycle state.
    pub state: ProcessState,
    /// Index into the owning [`crate::opcode::Program`] of the next op to
    /// execute, or `None` once the process has run off the end of its program.
    pub cursor: Option<usize>,
    /// Estimated total CPU+I/O time remaining, in milliseconds, used by
    /// SJF-N and SRTF-P to rank processes.
    pub time_remaining_ms: u64,
    /// Cycles remaining on an in-progress `P` op that was preempted mid-run.
    /// `None` when the process is not in the middle of a `P` op.
    pub residual: Option<u32>,
}

impl Pcb {
    /// Creates a new PCB in the `New` state, positioned at `cursor` in its program.
    #[must_use]
    pub fn new(pid: u32, cursor: usize, time_remaining_ms: u64) -> Self {
        Self {
            pid,
            state: ProcessState::New,
            cursor: Some(cursor),
            time_remaining_ms,
            residual: None,
        }
    }
}

/// The collection of all PCBs in the simulation, in admission order.
#[derive(Debug, Clone, Default)]
pub struct PcbQueue {
    procs: Vec<Pcb>,
}

impl PcbQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new PCB, appending it in program order.
    pub fn admit(&mut self, pcb: Pcb) {
        self.procs.push(pcb);
    }

    /// Number of PCBs, regardless of state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    /// Whether the queue holds no PCBs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Sets every PCB's state to `state`, used for the New→Ready transition.
    pub fn set_all(&mut self, state: ProcessState) {
        for pcb in &mut self.procs {
            pcb.state = state;
        }
    }

    /// Sorts the queue in place according to `policy`. FCFS variants leave
    /// admission order untouched; SJF-N and SRTF-P sort by ascending
    /// `time_remaining_ms`, with admission order as the tie-break.
    pub fn sort(&mut self, policy: SchedulingPolicy) {
        if !policy.reorders_queue() {
            return;
        }
        self.procs.sort_by(|a, b| a.time_remaining_ms.cmp(&b.time_remaining_ms));
    }

    /// Borrows the PCB at Vec index `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&Pcb> {
        self.procs.get(i)
    }

    /// Mutably borrows the PCB at Vec index `i`.
    pub fn get_mut(&mut self, i: usize) -> Option<&mut Pcb> {
        self.procs.get_mut(i)
    }

    /// Finds a PCB by PID via linear scan. Needed because `sort` reorders
    /// the backing `Vec`, so a PID's index is not stable across a sort.
    pub fn pcb_mut_by_pid(&mut self, pid: u32) -> Option<&mut Pcb> {
        self.procs.iter_mut().find(|p| p.pid == pid)
    }

    /// Finds a PCB by PID via linear scan (read-only).
    #[must_use]
    pub fn pcb_by_pid(&self, pid: u32) -> Option<&Pcb> {
        self.procs.iter().find(|p| p.pid == pid)
    }

    /// True once every PCB has reached `Exit`.
    #[must_use]
    pub fn all_ended(&self) -> bool {
        self.procs.iter().all(|p| matches!(p.state, ProcessState::Exit))
    }

    /// True if any PCB is currently `Ready`.
    #[must_use]
    pub fn any_ready(&self) -> bool {
        self.procs.iter().any(|p| matches!(p.state, ProcessState::Ready))
    }

    /// Index of the first `Ready` PCB in current queue order, if any. After a
    /// `sort` this is the next process the policy would dispatch.
    #[must_use]
    pub fn next_ready_index(&self) -> Option<usize> {
        self.procs.iter().position(|p| matches!(p.state, ProcessState::Ready))
    }

    /// Iterates all PCBs in current queue order.
    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.procs.iter()
    }

    /// Mutably iterates all PCBs in current queue order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pcb> {
        self.procs.iter_mut()
    }
}
