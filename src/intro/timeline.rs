//! Timing table and phase values
//!
//! The schedule is plain data: each entry opens a phase at `start_ms` and
//! keeps its window open for `duration_ms`. Windows overlap on purpose so
//! layers cross-fade instead of cutting.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Segment of the timeline that is active or already completed.
///
/// Layers must compare with [`Phase::has_crossed`], never equality: the
/// driver may jump several phases in a single frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Phase(pub u8);

impl Phase {
    /// Nothing has started
    pub const IDLE: Phase = Phase(0);
    /// Noise overlay and grid
    pub const BOOT: Phase = Phase(1);
    pub const PARTICLES: Phase = Phase(2);
    pub const LOGO: Phase = Phase(3);
    pub const RINGS: Phase = Phase(4);
    pub const TITLE: Phase = Phase(5);
    /// Flare sweep; most layers leave here
    pub const FLARE: Phase = Phase(6);

    /// True once the timeline has reached `threshold`
    #[inline]
    pub fn has_crossed(self, threshold: Phase) -> bool {
        self >= threshold
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {}", self.0)
    }
}

/// One row of the timing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub name: String,
    /// Offset from sequence start
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl PhaseEntry {
    pub fn new(name: impl Into<String>, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            start_ms,
            duration_ms,
        }
    }

    #[inline]
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// Read-only timing table. Phase `n` corresponds to entry `n - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    entries: Vec<PhaseEntry>,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self::new(vec![
            PhaseEntry::new("boot", 0.0, 800.0),
            PhaseEntry::new("particles", 400.0, 1400.0),
            PhaseEntry::new("logo", 1400.0, 1600.0),
            PhaseEntry::new("rings", 2400.0, 1800.0),
            PhaseEntry::new("title", 3400.0, 1600.0),
            PhaseEntry::new("flare", 4600.0, 1400.0),
        ])
    }
}

impl PhaseSchedule {
    pub fn new(entries: Vec<PhaseEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PhaseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry that opens `phase` (phase 0 has none)
    pub fn entry(&self, phase: Phase) -> Option<&PhaseEntry> {
        (phase.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
    }

    /// Highest phase value the schedule can reach
    pub fn final_phase(&self) -> Phase {
        Phase(self.entries.len().min(u8::MAX as usize) as u8)
    }

    /// Run length: the latest window end
    pub fn total_ms(&self) -> f64 {
        self.entries
            .iter()
            .map(PhaseEntry::end_ms)
            .fold(0.0, f64::max)
    }

    /// Phase reached after `elapsed_ms`: the number of entries already started.
    /// Non-decreasing in `elapsed_ms` whatever the entry order.
    pub fn phase_at(&self, elapsed_ms: f64) -> Phase {
        let crossed = self
            .entries
            .iter()
            .filter(|e| e.start_ms <= elapsed_ms)
            .count();
        Phase(crossed.min(u8::MAX as usize) as u8)
    }

    /// Reject schedules that would not give a clean monotonic phase
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.entries.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if self.entries.len() > u8::MAX as usize {
            return Err(ScheduleError::TooManyPhases(self.entries.len()));
        }

        let mut previous_ms = 0.0;
        for entry in &self.entries {
            if !entry.start_ms.is_finite() || entry.start_ms < 0.0 {
                return Err(ScheduleError::InvalidStart {
                    name: entry.name.clone(),
                    start_ms: entry.start_ms,
                });
            }
            if !entry.duration_ms.is_finite() || entry.duration_ms <= 0.0 {
                return Err(ScheduleError::InvalidDuration {
                    name: entry.name.clone(),
                    duration_ms: entry.duration_ms,
                });
            }
            if entry.start_ms < previous_ms {
                return Err(ScheduleError::OutOfOrder {
                    name: entry.name.clone(),
                    start_ms: entry.start_ms,
                    previous_ms,
                });
            }
            previous_ms = entry.start_ms;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_shape() {
        let schedule = PhaseSchedule::default();
        assert!(schedule.validate().is_ok());
        assert_eq!(schedule.len(), 6);
        assert_eq!(schedule.final_phase(), Phase::FLARE);
        assert_eq!(schedule.total_ms(), 6000.0);

        let starts: Vec<f64> = schedule.entries().iter().map(|e| e.start_ms).collect();
        assert_eq!(starts, vec![0.0, 400.0, 1400.0, 2400.0, 3400.0, 4600.0]);
    }

    #[test]
    fn test_windows_overlap() {
        let schedule = PhaseSchedule::default();
        // Each window opens before the previous one closes
        for pair in schedule.entries().windows(2) {
            assert!(pair[1].start_ms < pair[0].end_ms(), "{}", pair[1].name);
        }
    }

    #[test]
    fn test_phase_at_thresholds() {
        let schedule = PhaseSchedule::default();
        assert_eq!(schedule.phase_at(-1.0), Phase::IDLE);
        assert_eq!(schedule.phase_at(0.0), Phase::BOOT);
        assert_eq!(schedule.phase_at(399.9), Phase::BOOT);
        assert_eq!(schedule.phase_at(400.0), Phase::PARTICLES);
        assert_eq!(schedule.phase_at(4700.0), Phase::FLARE);
        assert_eq!(schedule.phase_at(10_000.0), Phase::FLARE);
    }

    #[test]
    fn test_entry_lookup() {
        let schedule = PhaseSchedule::default();
        assert!(schedule.entry(Phase::IDLE).is_none());
        assert_eq!(schedule.entry(Phase::LOGO).map(|e| e.name.as_str()), Some("logo"));
        assert!(schedule.entry(Phase(7)).is_none());
    }

    #[test]
    fn test_has_crossed_is_threshold_not_equality() {
        assert!(Phase::FLARE.has_crossed(Phase::RINGS));
        assert!(Phase::RINGS.has_crossed(Phase::RINGS));
        assert!(!Phase::LOGO.has_crossed(Phase::RINGS));
    }

    #[test]
    fn test_validate_rejects_bad_rows() {
        assert_eq!(PhaseSchedule::new(vec![]).validate(), Err(ScheduleError::Empty));

        let negative = PhaseSchedule::new(vec![PhaseEntry::new("a", 0.0, -5.0)]);
        assert!(matches!(
            negative.validate(),
            Err(ScheduleError::InvalidDuration { .. })
        ));

        let unordered = PhaseSchedule::new(vec![
            PhaseEntry::new("a", 500.0, 100.0),
            PhaseEntry::new("b", 100.0, 100.0),
        ]);
        assert!(matches!(
            unordered.validate(),
            Err(ScheduleError::OutOfOrder { .. })
        ));

        let nan_start = PhaseSchedule::new(vec![PhaseEntry::new("a", f64::NAN, 100.0)]);
        assert!(matches!(
            nan_start.validate(),
            Err(ScheduleError::InvalidStart { .. })
        ));
    }
}
