//! Progress phases
//!
//! Pure mapping from percent complete to the phase shown next to the
//! progress bar. Ranges are half-open and contiguous; 100 is the final
//! phase, and anything above 100 is treated as 100.

use std::ops::RangeInclusive;

/// Phase of a running simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// [0, 20)
    CreatingEnvironment,
    /// [20, 40)
    ReplicatingTopology,
    /// [40, 60)
    ApplyingChanges,
    /// [60, 80)
    SimulatingTraffic,
    /// [80, 95)
    RunningAnalysis,
    /// [95, 100]
    Finalizing,
}

impl Phase {
    /// Every phase in order
    pub const ALL: [Phase; 6] = [
        Phase::CreatingEnvironment,
        Phase::ReplicatingTopology,
        Phase::ApplyingChanges,
        Phase::SimulatingTraffic,
        Phase::RunningAnalysis,
        Phase::Finalizing,
    ];

    /// Phase for a percentage
    #[inline]
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            0..=19 => Phase::CreatingEnvironment,
            20..=39 => Phase::ReplicatingTopology,
            40..=59 => Phase::ApplyingChanges,
            60..=79 => Phase::SimulatingTraffic,
            80..=94 => Phase::RunningAnalysis,
            _ => Phase::Finalizing,
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::CreatingEnvironment => "Creating virtualized environment",
            Phase::ReplicatingTopology => "Replicating network topology and endpoints",
            Phase::ApplyingChanges => "Applying configuration changes",
            Phase::SimulatingTraffic => "Simulating traffic and analyzing impact",
            Phase::RunningAnalysis => "Running AI analysis on results",
            Phase::Finalizing => "Finalizing report and recommendations",
        }
    }

    /// Percentages covered by this phase
    #[must_use]
    pub const fn range(self) -> RangeInclusive<u8> {
        match self {
            Phase::CreatingEnvironment => 0..=19,
            Phase::ReplicatingTopology => 20..=39,
            Phase::ApplyingChanges => 40..=59,
            Phase::SimulatingTraffic => 60..=79,
            Phase::RunningAnalysis => 80..=94,
            Phase::Finalizing => 95..=100,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a percentage
#[inline]
#[must_use]
pub const fn phase_label(percent: u8) -> &'static str {
    Phase::from_percent(percent).label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(phase_label(0), "Creating virtualized environment");
        assert_eq!(phase_label(19), "Creating virtualized environment");
        assert_eq!(phase_label(20), "Replicating network topology and endpoints");
        assert_eq!(phase_label(40), "Applying configuration changes");
        assert_eq!(phase_label(60), "Simulating traffic and analyzing impact");
        assert_eq!(phase_label(80), "Running AI analysis on results");
        assert_eq!(phase_label(94), "Running AI analysis on results");
        assert_eq!(phase_label(95), "Finalizing report and recommendations");
        assert_eq!(phase_label(100), "Finalizing report and recommendations");
    }

    #[test]
    fn out_of_range_is_final() {
        assert_eq!(Phase::from_percent(u8::MAX), Phase::Finalizing);
    }

    #[test]
    fn ranges_are_contiguous() {
        let mut next = 0u8;
        for phase in Phase::ALL {
            let range = phase.range();
            assert_eq!(*range.start(), next);
            next = range.end() + 1;
        }
        assert_eq!(next, 101);
    }
}
