//! Memory management unit (component B).
//!
//! Tracks segment allocations in a flat, insertion-ordered table and validates
//! `allocate`/`access` requests against it. Translated from the donor's recursive
//! linked list (`MMU.c`) into a `Vec`-backed table; semantics are unchanged.

/// One live allocation: owning PID, segment, base, and the allocation's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmuEntry {
    /// The PID that owns this allocation.
    pub pid: u32,
    /// The segment index requested at allocation time.
    pub segment: u32,
    /// The base address of the allocation; unique among live entries.
    pub base: u32,
    /// The length of the allocation, in the same units as `access`'s `offset`.
    pub offset: u32,
}

/// The outcome of an `allocate` or `access` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuOutcome {
    /// The request was valid and (for `allocate`) has been recorded.
    Ok,
    /// The request violates the MMU's invariants; the caller should fault the process.
    Fail,
}

impl MmuOutcome {
    /// True for `Ok`.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// The MMU's allocation table and remaining-memory counter.
#[derive(Debug, Clone)]
pub struct Mmu {
    entries: Vec<MmuEntry>,
    mem_total: u32,
    mem_remaining: u32,
}

impl Mmu {
    /// Creates an empty table with `mem_total` KB of configured memory.
    #[must_use]
    pub fn new(mem_total: u32) -> Self {
        Self {
            entries: Vec::new(),
            mem_total,
            mem_remaining: mem_total,
        }
    }

    /// Memory currently available for new allocations.
    #[must_use]
    pub fn mem_remaining(&self) -> u32 {
        self.mem_remaining
    }

    /// Live allocation entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[MmuEntry] {
        &self.entries
    }

    /// Attempts to record a new allocation.
    ///
    /// Fails if any live entry already has this `base`, or if `offset` exceeds
    /// the memory currently remaining. Does not coalesce or defragment.
    pub fn allocate(&mut self, pid: u32, segment: u32, base: u32, offset: u32) -> MmuOutcome {
        if self.entries.iter().any(|e| e.base == base) || offset > self.mem_remaining {
            return MmuOutcome::Fail;
        }

        self.entries.push(MmuEntry {
            pid,
            segment,
            base,
            offset,
        });
        self.mem_remaining -= offset;
        MmuOutcome::Ok
    }

    /// Validates a read/write request against a prior allocation.
    ///
    /// Succeeds iff some live entry matches `(pid, segment, base)` and its
    /// recorded length is at least `offset`. The first matching entry (in
    /// insertion order) is authoritative; no state is changed either way.
    #[must_use]
    pub fn access(&self, pid: u32, segment: u32, base: u32, offset: u32) -> MmuOutcome {
        let matched = self
            .entries
            .iter()
            .find(|e| e.pid == pid && e.segment == segment && e.base == base);

        match matched {
            Some(entry) if offset <= entry.offset => MmuOutcome::Ok,
            _ => MmuOutcome::Fail,
        }
    }

    /// Drops every live entry and restores `mem_remaining` to the configured total.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.mem_remaining = self.mem_total;
    }
}
