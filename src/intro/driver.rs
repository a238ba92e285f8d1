//! Phase driver
//!
//! Owns the one phase value every layer reads. Time comes in as wall-clock
//! deltas, so a throttled host pauses the run instead of skipping ahead.

use super::timeline::{Phase, PhaseSchedule};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, not started
    Idle,
    Running,
    /// Final window elapsed (or skipped); completion has fired
    Completed,
    /// Torn down before completing; completion will never fire
    Cancelled,
}

/// What one `advance` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub from: Phase,
    pub to: Phase,
    /// Completion fired during this step
    pub completed: bool,
}

impl PhaseStep {
    fn unchanged(phase: Phase) -> Self {
        Self {
            from: phase,
            to: phase,
            completed: false,
        }
    }

    /// At least one threshold was crossed
    pub fn crossed(&self) -> bool {
        self.to > self.from
    }
}

type CompletionCallback = Box<dyn FnOnce()>;

/// Advances the phase over the timing table
pub struct PhaseDriver {
    schedule: PhaseSchedule,
    state: DriverState,
    elapsed_ms: f64,
    phase: Phase,
    on_complete: Option<CompletionCallback>,
}

impl std::fmt::Debug for PhaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseDriver")
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("phase", &self.phase)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

impl PhaseDriver {
    pub fn new(schedule: PhaseSchedule) -> Self {
        Self {
            schedule,
            state: DriverState::Idle,
            elapsed_ms: 0.0,
            phase: Phase::IDLE,
            on_complete: None,
        }
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    #[inline]
    pub fn current_phase(&self) -> Phase {
        self.phase
    }

    /// Sequence clock: milliseconds of run time actually played
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn is_complete(&self) -> bool {
        self.state == DriverState::Completed
    }

    /// Fraction of the run played (0-1)
    pub fn progress(&self) -> f32 {
        let total = self.schedule.total_ms();
        if total <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / total).clamp(0.0, 1.0) as f32
    }

    /// Register the fire-once completion callback.
    ///
    /// Replaces a callback that has not fired yet. Fires immediately when the
    /// run already completed; dropped when the driver was cancelled.
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        match self.state {
            DriverState::Completed => callback(),
            DriverState::Cancelled => {}
            DriverState::Idle | DriverState::Running => {
                self.on_complete = Some(Box::new(callback));
            }
        }
    }

    /// Begin the run. Returns false (and does nothing) unless Idle.
    pub fn start(&mut self) -> bool {
        if self.state != DriverState::Idle {
            return false;
        }
        self.state = DriverState::Running;
        self.elapsed_ms = 0.0;
        log::info!(
            "Intro started: {} phases over {}ms",
            self.schedule.len(),
            self.schedule.total_ms()
        );
        self.settle();
        true
    }

    /// Feed a wall-clock delta. Non-positive or non-finite deltas are ignored.
    pub fn advance(&mut self, delta_ms: f64) -> PhaseStep {
        if self.state != DriverState::Running || !delta_ms.is_finite() || delta_ms <= 0.0 {
            return PhaseStep::unchanged(self.phase);
        }
        let from = self.phase;
        self.elapsed_ms += delta_ms;
        let completed = self.settle();
        PhaseStep {
            from,
            to: self.phase,
            completed,
        }
    }

    /// Skip to completion. Works from Idle or Running.
    pub fn finish(&mut self) -> PhaseStep {
        let from = self.phase;
        match self.state {
            DriverState::Idle | DriverState::Running => {
                log::info!("Intro skipped at {:.0}ms ({})", self.elapsed_ms, from);
                self.elapsed_ms = self.schedule.total_ms();
                self.phase = self.phase.max(self.schedule.final_phase());
                self.complete();
                PhaseStep {
                    from,
                    to: self.phase,
                    completed: true,
                }
            }
            DriverState::Completed | DriverState::Cancelled => PhaseStep::unchanged(from),
        }
    }

    /// Stop for teardown; an unfired completion callback is dropped
    pub fn cancel(&mut self) {
        self.on_complete = None;
        if matches!(self.state, DriverState::Idle | DriverState::Running) {
            log::debug!("Phase driver cancelled at {:.0}ms", self.elapsed_ms);
            self.state = DriverState::Cancelled;
        }
    }

    /// Recompute the phase from elapsed time; returns true if completion fired
    fn settle(&mut self) -> bool {
        let total = self.schedule.total_ms();
        let next = self.schedule.phase_at(self.elapsed_ms);
        if next > self.phase {
            log::debug!("{} -> {} at {:.0}ms", self.phase, next, self.elapsed_ms);
            self.phase = next;
        }

        if self.elapsed_ms >= total {
            self.elapsed_ms = total;
            self.phase = self.phase.max(self.schedule.final_phase());
            self.complete();
            return true;
        }
        false
    }

    fn complete(&mut self) {
        self.state = DriverState::Completed;
        log::info!("Intro complete");
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intro::timeline::PhaseEntry;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(driver: &mut PhaseDriver) -> Rc<Cell<u32>> {
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        driver.on_complete(move || f.set(f.get() + 1));
        fired
    }

    #[test]
    fn test_idle_until_started() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.current_phase(), Phase::IDLE);

        // Advancing before start does nothing
        driver.advance(500.0);
        assert_eq!(driver.current_phase(), Phase::IDLE);
        assert_eq!(driver.elapsed_ms(), 0.0);

        assert!(driver.start());
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(driver.current_phase(), Phase::BOOT);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        assert!(driver.start());
        driver.advance(1500.0);
        assert!(!driver.start());
        assert_eq!(driver.elapsed_ms(), 1500.0);
        assert_eq!(driver.current_phase(), Phase::LOGO);
    }

    #[test]
    fn test_reaches_final_phase_and_completes_once() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        let fired = counter(&mut driver);
        driver.start();

        let mut t = 0.0;
        while t < 4700.0 {
            driver.advance(50.0);
            t += 50.0;
        }
        assert!(driver.current_phase() >= Phase(6));
        assert_eq!(fired.get(), 0);

        while t < 6000.0 {
            driver.advance(50.0);
            t += 50.0;
        }
        assert_eq!(fired.get(), 1);
        assert!(driver.is_complete());

        // Later frames and skips never fire again
        driver.advance(50.0);
        driver.finish();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_large_delta_jumps_multiple_phases() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        driver.start();
        let step = driver.advance(2500.0);
        assert_eq!(step.from, Phase::BOOT);
        assert_eq!(step.to, Phase::RINGS);
        assert!(step.crossed());
        assert!(!step.completed);
    }

    #[test]
    fn test_bad_deltas_ignored() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        driver.start();
        driver.advance(1000.0);
        driver.advance(-400.0);
        driver.advance(f64::NAN);
        driver.advance(f64::INFINITY);
        assert_eq!(driver.elapsed_ms(), 1000.0);
    }

    #[test]
    fn test_finish_skips_to_completion() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        let fired = counter(&mut driver);
        driver.start();
        driver.advance(900.0);

        let step = driver.finish();
        assert!(step.completed);
        assert_eq!(driver.current_phase(), Phase::FLARE);
        assert_eq!(driver.progress(), 1.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_cancel_drops_callback() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        let fired = counter(&mut driver);
        driver.start();
        driver.advance(1000.0);
        driver.cancel();
        assert_eq!(driver.state(), DriverState::Cancelled);

        driver.advance(10_000.0);
        driver.finish();
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_callback_registered_after_completion_fires_immediately() {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        driver.start();
        driver.advance(7000.0);
        let fired = counter(&mut driver);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_overlapping_custom_schedule() {
        let schedule = PhaseSchedule::new(vec![
            PhaseEntry::new("a", 0.0, 1000.0),
            PhaseEntry::new("b", 100.0, 200.0),
        ]);
        let mut driver = PhaseDriver::new(schedule);
        let fired = counter(&mut driver);
        driver.start();
        driver.advance(400.0);
        // Last phase crossed, but window "a" still open
        assert_eq!(driver.current_phase(), Phase(2));
        assert_eq!(fired.get(), 0);
        driver.advance(600.0);
        assert_eq!(fired.get(), 1);
    }
}
