//! Animated values
//!
//! A value ramps toward a target over a duration on the sequence clock.
//! Nothing here owns a timer: sampling is a pure function of `now_ms`, so
//! pausing the clock pauses every curve and cancelling is just dropping
//! the in-flight tween.

use serde::{Deserialize, Serialize};

/// Easing curves. Input is clamped to [0, 1]; every curve maps 0 to 0 and 1 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    /// Overshoots slightly before settling
    OutBack,
    OutExpo,
    InOutSine,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::OutBack => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                let u = t - 1.0;
                1.0 + C3 * u * u * u + C1 * u * u
            }
            Easing::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::InOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// How a tween behaves past its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Hold the target
    Once,
    /// Restart from `from` every period
    Loop,
    /// Run back and forth
    PingPong,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f32,
    to: f32,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
    repeat: Repeat,
}

impl Tween {
    fn sample(&self, now_ms: f64) -> f32 {
        if now_ms <= self.start_ms {
            return self.from;
        }
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let raw = (now_ms - self.start_ms) / self.duration_ms;
        let t = match self.repeat {
            Repeat::Once => raw.min(1.0),
            Repeat::Loop => raw.fract(),
            Repeat::PingPong => {
                let cycle = raw % 2.0;
                if cycle <= 1.0 { cycle } else { 2.0 - cycle }
            }
        };
        self.from + (self.to - self.from) * self.easing.apply(t as f32)
    }

    fn is_finished(&self, now_ms: f64) -> bool {
        self.repeat == Repeat::Once && now_ms >= self.start_ms + self.duration_ms
    }
}

/// A scalar driven by at most one tween at a time
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    /// Value when no tween is attached
    rest: f32,
    tween: Option<Tween>,
}

impl AnimatedValue {
    pub fn new(value: f32) -> Self {
        Self {
            rest: value,
            tween: None,
        }
    }

    /// Ramp from the current value to `target`
    pub fn animate_to(&mut self, target: f32, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.animate_to_after(0.0, target, duration_ms, easing, now_ms);
    }

    /// Like `animate_to`, holding the current value for `delay_ms` first
    pub fn animate_to_after(
        &mut self,
        delay_ms: f64,
        target: f32,
        duration_ms: f64,
        easing: Easing,
        now_ms: f64,
    ) {
        let from = self.sample(now_ms);
        self.tween = Some(Tween {
            from,
            to: target,
            start_ms: now_ms + delay_ms.max(0.0),
            duration_ms,
            easing,
            repeat: Repeat::Once,
        });
    }

    /// Run `from -> to` forever with the given period
    pub fn repeat(
        &mut self,
        from: f32,
        to: f32,
        period_ms: f64,
        easing: Easing,
        mode: Repeat,
        now_ms: f64,
    ) {
        self.tween = Some(Tween {
            from,
            to,
            start_ms: now_ms,
            duration_ms: period_ms,
            easing,
            repeat: mode,
        });
    }

    /// Jump to a value, dropping any tween
    pub fn set(&mut self, value: f32) {
        self.rest = value;
        self.tween = None;
    }

    /// Freeze at the value sampled at `now_ms`
    pub fn cancel(&mut self, now_ms: f64) {
        self.rest = self.sample(now_ms);
        self.tween = None;
    }

    pub fn sample(&self, now_ms: f64) -> f32 {
        match &self.tween {
            Some(tween) => tween.sample(now_ms),
            None => self.rest,
        }
    }

    /// Delayed, in flight, or repeating
    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.tween.is_some_and(|t| !t.is_finished(now_ms))
    }

    /// Value the current tween settles on (rest value when idle)
    pub fn target(&self) -> f32 {
        match &self.tween {
            Some(t) if t.repeat == Repeat::Once => t.to,
            Some(t) => t.from,
            None => self.rest,
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::OutBack,
        Easing::OutExpo,
        Easing::InOutSine,
    ];

    #[test]
    fn test_easing_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", easing);
            // Clamped outside the unit range
            assert!((easing.apply(2.0) - 1.0).abs() < 1e-5);
            assert!(easing.apply(-1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_out_back_overshoots() {
        let peak = (0..100)
            .map(|i| Easing::OutBack.apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_animate_to_ramps_and_settles() {
        let mut v = AnimatedValue::new(0.0);
        v.animate_to(1.0, 1000.0, Easing::Linear, 100.0);
        assert_eq!(v.sample(100.0), 0.0);
        assert!((v.sample(600.0) - 0.5).abs() < 1e-5);
        assert!(v.is_animating(600.0));
        assert_eq!(v.sample(1100.0), 1.0);
        assert!(!v.is_animating(1100.0));
        assert_eq!(v.sample(5000.0), 1.0);
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let mut v = AnimatedValue::new(0.0);
        v.animate_to(1.0, 1000.0, Easing::Linear, 0.0);
        v.animate_to(0.0, 1000.0, Easing::Linear, 500.0);
        assert!((v.sample(500.0) - 0.5).abs() < 1e-5);
        assert!((v.sample(1000.0) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_delay_holds_value_and_counts_as_pending() {
        let mut v = AnimatedValue::new(2.0);
        v.animate_to_after(300.0, 4.0, 100.0, Easing::Linear, 0.0);
        assert_eq!(v.sample(200.0), 2.0);
        assert!(v.is_animating(200.0));
        assert_eq!(v.sample(400.0), 4.0);
    }

    #[test]
    fn test_loop_never_finishes_until_cancelled() {
        let mut v = AnimatedValue::new(0.0);
        v.repeat(0.0, 1.0, 100.0, Easing::Linear, Repeat::Loop, 0.0);
        assert!((v.sample(250.0) - 0.5).abs() < 1e-4);
        assert!(v.is_animating(1_000_000.0));

        v.cancel(250.0);
        assert!(!v.is_animating(250.0));
        assert!((v.sample(9999.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_ping_pong() {
        let mut v = AnimatedValue::new(0.0);
        v.repeat(0.0, 1.0, 100.0, Easing::Linear, Repeat::PingPong, 0.0);
        assert!((v.sample(100.0) - 1.0).abs() < 1e-4);
        assert!((v.sample(150.0) - 0.5).abs() < 1e-4);
        assert!(v.sample(199.0) < 0.05);
    }

    #[test]
    fn test_target() {
        let mut v = AnimatedValue::new(0.3);
        assert_eq!(v.target(), 0.3);
        v.animate_to(0.9, 10.0, Easing::OutQuad, 0.0);
        assert_eq!(v.target(), 0.9);
        v.set(0.1);
        assert_eq!(v.target(), 0.1);
    }
}
