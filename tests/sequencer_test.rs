//! End-to-end checks of the intro sequence with simulated time

use std::cell::Cell;
use std::rc::Rc;

use cinematic_intro::consts::FRAME_DT_MS;
use cinematic_intro::intro::layers::particles::golden_angle;
use cinematic_intro::intro::layers::{
    FlareLayer, GlitchLayer, GridLayer, NoiseLayer, ParticleLayer, RingsLayer, TypewriterLayer,
    generate_particles,
};
use cinematic_intro::intro::{Layer, PhaseDriver};
use cinematic_intro::{InterruptionPolicy, IntroConfig, IntroSequencer, Phase, PhaseSchedule};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn counted(seq: &mut IntroSequencer) -> Rc<Cell<u32>> {
    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    seq.on_complete(move || f.set(f.get() + 1));
    fired
}

/// Feed 60 Hz frames until host time `to`
fn play(seq: &mut IntroSequencer, from: f64, to: f64) -> f64 {
    let mut t = from;
    while t < to {
        t += FRAME_DT_MS;
        seq.frame(t);
    }
    t
}

fn all_layers(seed: u64) -> Vec<Box<dyn Layer>> {
    let mut rng = Pcg32::seed_from_u64(seed);
    vec![
        Box::new(NoiseLayer::new(60, false, &mut rng)),
        Box::new(GridLayer::new(false)),
        Box::new(ParticleLayer::new(60, &mut rng)),
        Box::new(GlitchLayer::new(12, false, &mut rng)),
        Box::new(RingsLayer::new(true)),
        Box::new(TypewriterLayer::new("AURUM", "WEALTH, DECODED", false, &mut rng)),
        Box::new(FlareLayer::new()),
    ]
}

#[test]
fn test_default_run_reaches_flare_then_completes_once() {
    let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(42));
    let fired = counted(&mut seq);
    seq.start(0.0);

    let mut t = 0.0;
    while t + FRAME_DT_MS <= 4700.0 {
        t += FRAME_DT_MS;
        seq.frame(t);
    }
    let frame = seq.frame(4700.0);
    assert!(frame.phase >= Phase(6), "phase {} at 4700ms", frame.phase);
    assert_eq!(fired.get(), 0);

    // First frame at or past the 6000ms mark
    play(&mut seq, 4700.0, 6000.0 + FRAME_DT_MS / 2.0);
    assert_eq!(fired.get(), 1);
    assert!(seq.is_complete());

    play(&mut seq, 6000.0, 9000.0);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_particle_field_is_stable_across_runs() {
    for seed in [1, 2] {
        let config = IntroConfig::default().with_seed(seed);
        assert_eq!(config.particle_count(), 60);
        let seq = IntroSequencer::new(&config);
        let particles = seq.particles().descriptors();
        assert_eq!(particles.len(), 60);
        for (i, p) in particles.iter().enumerate() {
            assert_eq!(p.angle, golden_angle(i));
        }
    }
}

#[test]
fn test_late_completion_listener_still_hears_it() {
    let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(8));
    seq.start(0.0);
    seq.skip();
    let fired = counted(&mut seq);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_backgrounding_with_resume_policy() {
    let config = IntroConfig {
        interruption: InterruptionPolicy::Resume,
        ..IntroConfig::default().with_seed(3)
    };
    let mut seq = IntroSequencer::new(&config);
    let fired = counted(&mut seq);
    seq.start(0.0);
    let t = play(&mut seq, 0.0, 2000.0);
    let phase = seq.phase();

    // Long gap without an explicit suspend: paused, not skipped
    seq.frame(t + 60_000.0);
    assert_eq!(seq.phase(), phase);
    assert_eq!(fired.get(), 0);

    play(&mut seq, t + 60_000.0, t + 70_000.0);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_teardown_before_start() {
    let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(4));
    let fired = counted(&mut seq);
    seq.teardown();
    assert_eq!(seq.pending_work(), 0);
    seq.start(0.0);
    play(&mut seq, 0.0, 8000.0);
    assert_eq!(fired.get(), 0);
    assert_eq!(seq.pending_work(), 0);
}

#[test]
fn test_drop_mid_sequence_never_completes() {
    let fired;
    {
        let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(6));
        fired = counted(&mut seq);
        seq.start(0.0);
        play(&mut seq, 0.0, 3000.0);
    }
    assert_eq!(fired.get(), 0);
}

proptest! {
    /// Once curves settle a layer shows exactly inside its threshold window
    #[test]
    fn prop_layer_visible_iff_inside_window(
        steps in prop::collection::vec(0u8..=3, 1..8),
        seed in any::<u64>(),
    ) {
        let mut phase = 0u8;
        let mut now = 0.0;
        let mut layers = all_layers(seed);
        for step in steps {
            phase = (phase + step).min(7);
            now += 250.0;
            for layer in layers.iter_mut() {
                layer.sync(Phase(phase), now);
            }
        }

        let settled = now + 10_000.0;
        for layer in &layers {
            let expected = layer.thresholds().contains(Phase(phase));
            prop_assert_eq!(
                layer.opacity(settled) > 0.0,
                expected,
                "{} at phase {}",
                layer.name(),
                phase
            );
        }
    }

    /// The phase never goes backwards, whatever the host feeds in
    #[test]
    fn prop_driver_phase_is_monotonic(
        deltas in prop::collection::vec(-500.0f64..2000.0, 1..60),
    ) {
        let mut driver = PhaseDriver::new(PhaseSchedule::default());
        driver.start();
        let mut last_phase = driver.current_phase();
        let mut last_elapsed = driver.elapsed_ms();
        for delta in deltas {
            driver.advance(delta);
            prop_assert!(driver.current_phase() >= last_phase);
            prop_assert!(driver.elapsed_ms() >= last_elapsed);
            last_phase = driver.current_phase();
            last_elapsed = driver.elapsed_ms();
        }
    }

    /// Completion fires once, no matter how frames and skips interleave
    #[test]
    fn prop_completion_fires_exactly_once(
        frame_ms in prop::collection::vec(1.0f64..120.0, 1..400),
        skip_at in prop::option::of(0usize..400),
        seed in any::<u64>(),
    ) {
        let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(seed));
        let fired = counted(&mut seq);
        seq.start(0.0);

        let mut t = 0.0;
        for (i, dt) in frame_ms.iter().enumerate() {
            if skip_at == Some(i) {
                seq.skip();
            }
            t += dt;
            seq.frame(t);
            prop_assert!(fired.get() <= 1);
        }
        // Let it run out
        for _ in 0..1000 {
            if seq.is_complete() {
                break;
            }
            t += FRAME_DT_MS;
            seq.frame(t);
        }
        prop_assert_eq!(fired.get(), 1);
    }

    /// Slow devices finish on the host clock, not later
    #[test]
    fn prop_slow_frames_complete_on_schedule(
        frame_ms in prop::collection::vec(100.0f64..900.0, 1..40),
        seed in any::<u64>(),
    ) {
        let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(seed));
        let fired = counted(&mut seq);
        seq.start(0.0);

        let mut t = 0.0;
        for dt in frame_ms.iter().cycle() {
            if t >= 6001.0 {
                break;
            }
            t += dt;
            seq.frame(t);
            if t < 5999.0 {
                prop_assert_eq!(fired.get(), 0, "completed early at {}ms", t);
            }
        }
        prop_assert_eq!(fired.get(), 1);
    }

    /// Generators hand back the configured count every run
    #[test]
    fn prop_particle_count_is_exact(count in 0usize..=120, seed in any::<u64>()) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let a = generate_particles(count, &mut rng);
        let b = generate_particles(count, &mut rng);
        prop_assert_eq!(a.len(), count);
        prop_assert_eq!(b.len(), count);
    }

    /// Tearing down at any point leaves nothing scheduled
    #[test]
    fn prop_teardown_clears_pending_work(stop_ms in 0.0f64..9000.0, seed in any::<u64>()) {
        let mut seq = IntroSequencer::new(&IntroConfig::default().with_seed(seed));
        seq.start(0.0);
        play(&mut seq, 0.0, stop_ms);
        seq.teardown();
        prop_assert_eq!(seq.pending_work(), 0);
        seq.frame(stop_ms + 500.0);
        prop_assert_eq!(seq.pending_work(), 0);
    }
}
