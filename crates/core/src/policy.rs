//! Scheduling policies (§4.3, §6).
//!
//! The donor dispatches on a `cpuSchedCode` string at each call site that
//! needs policy-specific behavior. Here that's collapsed into one tagged enum
//! with two queries (`reorders_queue`, `is_preemptive`) that every call site
//! shares, rather than re-testing the code string everywhere it matters.

/// The five scheduling policies named in the configuration file (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// First-come, first-served, non-preemptive.
    FcfsN,
    /// Shortest job first, non-preemptive.
    SjfN,
    /// Shortest remaining time first, preemptive.
    SrtfP,
    /// First-come, first-served, preemptive (in name only: never preempts).
    FcfsP,
    /// Round robin, preemptive, quantum-sliced.
    RrP,
}

impl SchedulingPolicy {
    /// Parses a configuration file's `Scheduling Code` value. Case-insensitive;
    /// `"none"` maps to `FcfsN`, matching the donor's default.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" | "FCFS-N" => Some(Self::FcfsN),
            "SJF-N" => Some(Self::SjfN),
            "SRTF-P" => Some(Self::SrtfP),
            "FCFS-P" => Some(Self::FcfsP),
            "RR-P" => Some(Self::RrP),
            _ => None,
        }
    }

    /// Whether this policy reorders the ready queue by remaining time rather
    /// than leaving it in admission order.
    #[must_use]
    pub fn reorders_queue(self) -> bool {
        matches!(self, Self::SjfN | Self::SrtfP)
    }

    /// Whether a running process can be preempted before it blocks or exits.
    #[must_use]
    pub fn is_preemptive(self) -> bool {
        matches!(self, Self::SrtfP | Self::FcfsP | Self::RrP)
    }

    /// Whether this policy slices CPU bursts into fixed quanta.
    #[must_use]
    pub fn is_quantum_sliced(self) -> bool {
        matches!(self, Self::RrP)
    }
}
