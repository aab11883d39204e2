//! Interrupt queue (component C): pending I/O completions ordered by when
//! they're due.
//!
//! Translated from the donor's sorted-insert linked list (`InterruptHandling.c`)
//! into a `Vec` kept sorted on every insert. Ties on `ending_time_us` are broken
//! by insertion order via a monotonic sequence number, since the donor's
//! mid-insert loop stops at the first strictly-later entry and so preserves
//! insertion order among equal timestamps.

/// One pending interrupt: the process it will wake, the operation that caused
/// it, and when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptRecord {
    /// The PID that will be unblocked when this interrupt is delivered.
    pub pid: u32,
    /// The donor's discrepancy is preserved here: both `I` and `O` ops record
    /// `"input"`, never `"output"` (see the design notes).
    pub op_type: String,
    /// Catalog name of the op that caused the interrupt.
    pub op_name: crate::opcode::OpName,
    /// Absolute simulated time, in microseconds, at which the interrupt fires.
    pub ending_time_us: u64,
    /// Insertion order, used only to break ties on `ending_time_us`.
    seq: u64,
}

/// A time-ordered queue of pending interrupts.
#[derive(Debug, Clone, Default)]
pub struct InterruptQueue {
    entries: Vec<InterruptRecord>,
    next_seq: u64,
}

impl InterruptQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending interrupts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue has no pending interrupts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a new interrupt, keeping the queue sorted by `ending_time_us`
    /// and, among equal times, by insertion order.
    pub fn add(&mut self, pid: u32, op_type: impl Into<String>, op_name: crate::opcode::OpName, ending_time_us: u64) {
        let record = InterruptRecord {
            pid,
            op_type: op_type.into(),
            op_name,
            ending_time_us,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let pos = self
            .entries
            .iter()
            .position(|e| e.ending_time_us > ending_time_us)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
    }

    /// True iff the head of the queue is due at or before `now_us`.
    #[must_use]
    pub fn peek_ready(&self, now_us: u64) -> bool {
        self.entries.first().is_some_and(|e| e.ending_time_us <= now_us)
    }

    /// Borrows the head of the queue without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&InterruptRecord> {
        self.entries.first()
    }

    /// Removes and returns the head of the queue, if any.
    pub fn pop(&mut self) -> Option<InterruptRecord> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}
