//! Shared layer contract
//!
//! Every visual layer reacts to phase threshold crossings only. The
//! `Presence` helper owns the enter/exit opacity curve most layers need.

use super::timeline::Phase;
use super::tween::{AnimatedValue, Easing};

/// Phase thresholds a layer listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub enter: Phase,
    /// `None` keeps the layer on screen until teardown
    pub exit: Option<Phase>,
}

impl Thresholds {
    pub const fn new(enter: Phase, exit: Option<Phase>) -> Self {
        Self { enter, exit }
    }

    /// Whether `phase` falls inside the visible window
    pub fn contains(&self, phase: Phase) -> bool {
        phase.has_crossed(self.enter) && !self.exit.is_some_and(|exit| phase.has_crossed(exit))
    }
}

/// Local curve constant: where to go, how long, how
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub target: f32,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Curve {
    pub const fn new(target: f32, duration_ms: f64, easing: Easing) -> Self {
        Self {
            target,
            duration_ms,
            easing,
        }
    }
}

/// Crossing observed by one `Presence::sync`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    None,
    Entered,
    Exited,
}

/// Enter/exit opacity state for one layer
#[derive(Debug, Clone)]
pub struct Presence {
    thresholds: Thresholds,
    enter: Curve,
    exit: Curve,
    entered: bool,
    exited: bool,
    /// Sequence time of the enter crossing
    entered_at: Option<f64>,
    exited_at: Option<f64>,
    opacity: AnimatedValue,
}

impl Presence {
    pub fn new(thresholds: Thresholds, enter: Curve, exit: Curve) -> Self {
        Self {
            thresholds,
            enter,
            exit,
            entered: false,
            exited: false,
            entered_at: None,
            exited_at: None,
            opacity: AnimatedValue::new(0.0),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// React to the current phase. Exit wins over enter; a layer whose whole
    /// window was jumped over snaps to hidden instead of flashing.
    pub fn sync(&mut self, phase: Phase, now_ms: f64) -> Crossing {
        let exit_crossed = self
            .thresholds
            .exit
            .is_some_and(|exit| phase.has_crossed(exit));

        if exit_crossed && !self.exited {
            self.exited = true;
            self.exited_at = Some(now_ms);
            if self.entered {
                self.opacity.animate_to(
                    self.exit.target,
                    self.exit.duration_ms,
                    self.exit.easing,
                    now_ms,
                );
            } else {
                self.entered = true;
                self.opacity.set(self.exit.target);
            }
            return Crossing::Exited;
        }

        if !self.entered && phase.has_crossed(self.thresholds.enter) {
            self.entered = true;
            self.entered_at = Some(now_ms);
            self.opacity.animate_to(
                self.enter.target,
                self.enter.duration_ms,
                self.enter.easing,
                now_ms,
            );
            return Crossing::Entered;
        }

        Crossing::None
    }

    pub fn opacity(&self, now_ms: f64) -> f32 {
        self.opacity.sample(now_ms)
    }

    /// Entered and not yet told to leave
    pub fn is_showing(&self) -> bool {
        self.entered_at.is_some() && !self.exited
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Milliseconds since the enter crossing, if it happened
    pub fn since_enter(&self, now_ms: f64) -> Option<f64> {
        self.entered_at.map(|t| (now_ms - t).max(0.0))
    }

    pub fn since_exit(&self, now_ms: f64) -> Option<f64> {
        self.exited_at.map(|t| (now_ms - t).max(0.0))
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.opacity.is_animating(now_ms)
    }

    pub fn cancel(&mut self, now_ms: f64) {
        self.opacity.cancel(now_ms);
    }
}

/// Uniform contract of the seven visual layers
pub trait Layer {
    fn name(&self) -> &'static str;

    fn thresholds(&self) -> Thresholds;

    /// Current enter/exit opacity (0 hidden)
    fn opacity(&self, now_ms: f64) -> f32;

    /// Observe this frame's phase; start curves on crossings
    fn sync(&mut self, phase: Phase, now_ms: f64);

    /// In-flight, delayed or repeating curves
    fn pending(&self, now_ms: f64) -> usize;

    /// Stop every curve where it is
    fn cancel(&mut self, now_ms: f64);
}

/// Count animating values
pub(crate) fn count_animating<'a>(
    values: impl IntoIterator<Item = &'a AnimatedValue>,
    now_ms: f64,
) -> usize {
    values
        .into_iter()
        .filter(|v| v.is_animating(now_ms))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence(enter: u8, exit: Option<u8>) -> Presence {
        Presence::new(
            Thresholds::new(Phase(enter), exit.map(Phase)),
            Curve::new(1.0, 300.0, Easing::OutQuad),
            Curve::new(0.0, 200.0, Easing::InQuad),
        )
    }

    #[test]
    fn test_thresholds_contains() {
        let t = Thresholds::new(Phase(2), Some(Phase(5)));
        assert!(!t.contains(Phase(1)));
        assert!(t.contains(Phase(2)));
        assert!(t.contains(Phase(4)));
        assert!(!t.contains(Phase(5)));
        assert!(Thresholds::new(Phase(2), None).contains(Phase(200)));
    }

    #[test]
    fn test_enter_then_exit() {
        let mut p = presence(2, Some(4));
        assert_eq!(p.sync(Phase(1), 0.0), Crossing::None);
        assert_eq!(p.opacity(0.0), 0.0);

        assert_eq!(p.sync(Phase(2), 100.0), Crossing::Entered);
        assert_eq!(p.sync(Phase(3), 200.0), Crossing::None);
        assert_eq!(p.opacity(400.0), 1.0);
        assert!(p.is_showing());

        assert_eq!(p.sync(Phase(4), 500.0), Crossing::Exited);
        assert_eq!(p.opacity(700.0), 0.0);
        assert!(!p.is_showing());
        assert_eq!(p.since_exit(600.0), Some(100.0));
    }

    #[test]
    fn test_jump_over_window_never_shows() {
        let mut p = presence(2, Some(4));
        assert_eq!(p.sync(Phase(6), 100.0), Crossing::Exited);
        assert_eq!(p.opacity(100.0), 0.0);
        assert!(!p.is_animating(100.0));
        assert!(p.since_enter(100.0).is_none());
    }
}
