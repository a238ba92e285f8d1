//! Sequencer container
//!
//! Owns the phase driver and the seven layers. Each frame it turns wall-clock
//! time into a delta, advances the driver, reads the phase once and
//! hands that same value to every layer before sampling them.
//!
//! Layers run on the container's animation clock rather than the driver's
//! elapsed time: the two match while the run is live, but the animation clock
//! keeps going after completion or a skip so exit curves can finish.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::driver::{DriverState, PhaseDriver};
use super::layer::Layer;
use super::layers::{
    FlareFrame, FlareLayer, GlitchLayer, GridFrame, GridLayer, LogoFrame, NoiseFrame, NoiseLayer,
    ParticleLayer, ParticleSprite, RingsFrame, RingsLayer, TitleFrame, TypewriterLayer,
};
use super::timeline::Phase;
use crate::config::{IntroConfig, InterruptionPolicy};
use crate::consts::INTERRUPTION_GAP_MS;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntroFrame {
    pub phase: Phase,
    /// Driver time (sequence progress)
    pub elapsed_ms: f64,
    pub progress: f32,
    pub completed: bool,
    pub noise: NoiseFrame,
    pub grid: GridFrame,
    pub particles: Vec<ParticleSprite>,
    pub logo: LogoFrame,
    pub rings: RingsFrame,
    pub title: TitleFrame,
    pub flare: FlareFrame,
}

/// The intro: driver plus layers plus the completion hand-off
#[derive(Debug)]
pub struct IntroSequencer {
    driver: PhaseDriver,
    interruption: InterruptionPolicy,
    seed: u64,
    noise: NoiseLayer,
    grid: GridLayer,
    particles: ParticleLayer,
    glitch: GlitchLayer,
    rings: RingsLayer,
    typewriter: TypewriterLayer,
    flare: FlareLayer,
    /// Animation clock fed to layers
    clock_ms: f64,
    last_frame_ms: Option<f64>,
    suspended: bool,
    torn_down: bool,
}

impl IntroSequencer {
    /// Build the driver and every layer. All random descriptors are drawn
    /// here, once, from one seeded generator.
    pub fn new(config: &IntroConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);

        let noise = NoiseLayer::new(config.noise_dot_count(), config.reduced_motion, &mut rng);
        let particles = ParticleLayer::new(config.particle_count(), &mut rng);
        let glitch = GlitchLayer::new(
            config.corruption_square_count(),
            config.reduced_motion,
            &mut rng,
        );
        let typewriter = TypewriterLayer::new(
            &config.title,
            &config.tagline,
            config.reduced_motion,
            &mut rng,
        );

        log::info!(
            "Intro sequencer ready: seed {}, {} particles, quality {}",
            seed,
            particles.descriptors().len(),
            config.quality.as_str()
        );

        Self {
            driver: PhaseDriver::new(config.schedule.clone()),
            interruption: config.interruption,
            seed,
            noise,
            grid: GridLayer::new(config.reduced_motion),
            particles,
            glitch,
            rings: RingsLayer::new(config.quality.glow_enabled()),
            typewriter,
            flare: FlareLayer::new(),
            clock_ms: 0.0,
            last_frame_ms: None,
            suspended: false,
            torn_down: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.driver.current_phase()
    }

    pub fn driver(&self) -> &PhaseDriver {
        &self.driver
    }

    pub fn is_complete(&self) -> bool {
        self.driver.is_complete()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn particles(&self) -> &ParticleLayer {
        &self.particles
    }

    pub fn glitch(&self) -> &GlitchLayer {
        &self.glitch
    }

    /// Fire-once hand-off to the host shell
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.driver.on_complete(callback);
    }

    /// Begin the run at host time `now_ms`. No-op if already started.
    pub fn start(&mut self, now_ms: f64) {
        if self.torn_down || !self.driver.start() {
            return;
        }
        self.last_frame_ms = Some(now_ms);
        self.sync_layers();
    }

    /// Advance to host time `now_ms` and sample every layer
    pub fn frame(&mut self, now_ms: f64) -> IntroFrame {
        if !self.torn_down && !self.suspended && self.driver.state() != DriverState::Idle {
            let delta = self
                .last_frame_ms
                .map(|last| now_ms - last)
                .unwrap_or(0.0);
            self.last_frame_ms = Some(now_ms);

            if delta > INTERRUPTION_GAP_MS {
                log::info!("Frame gap of {:.0}ms, treating as interruption", delta);
                self.interrupted();
            } else if delta > 0.0 {
                // Slow frames still count in full so the schedule never drifts
                self.clock_ms += delta;
                self.driver.advance(delta);
            }
            self.sync_layers();
        }
        self.snapshot()
    }

    /// Skip straight to completion (user tap)
    pub fn skip(&mut self) {
        if self.torn_down {
            return;
        }
        self.driver.finish();
        self.sync_layers();
    }

    /// Host went to the background
    pub fn suspend(&mut self) {
        if !self.suspended && !self.torn_down {
            log::debug!("Intro suspended at {:.0}ms", self.driver.elapsed_ms());
            self.suspended = true;
        }
    }

    /// Host came back at `now_ms`
    pub fn resume(&mut self, now_ms: f64) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        self.last_frame_ms = Some(now_ms);
        self.interrupted();
    }

    /// Cancel every curve and the driver. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.driver.cancel();
        let now = self.clock_ms;
        for layer in self.layers_mut() {
            layer.cancel(now);
        }
        self.torn_down = true;
        log::info!("Intro torn down at {}", self.driver.current_phase());
    }

    /// Scheduled animation work still outstanding (0 after teardown)
    pub fn pending_work(&self) -> usize {
        let now = self.clock_ms;
        let layers: [&dyn Layer; 7] = [
            &self.noise,
            &self.grid,
            &self.particles,
            &self.glitch,
            &self.rings,
            &self.typewriter,
            &self.flare,
        ];
        layers.iter().map(|l| l.pending(now)).sum::<usize>() + self.driver.is_running() as usize
    }

    fn interrupted(&mut self) {
        match self.interruption {
            InterruptionPolicy::SkipToCompletion if self.driver.is_running() => self.skip(),
            _ => {}
        }
    }

    /// One phase read, fanned out to every layer
    fn sync_layers(&mut self) {
        let phase = self.driver.current_phase();
        let now = self.clock_ms;
        for layer in self.layers_mut() {
            layer.sync(phase, now);
        }
    }

    fn layers_mut(&mut self) -> [&mut dyn Layer; 7] {
        [
            &mut self.noise,
            &mut self.grid,
            &mut self.particles,
            &mut self.glitch,
            &mut self.rings,
            &mut self.typewriter,
            &mut self.flare,
        ]
    }

    fn snapshot(&self) -> IntroFrame {
        let now = self.clock_ms;
        IntroFrame {
            phase: self.driver.current_phase(),
            elapsed_ms: self.driver.elapsed_ms(),
            progress: self.driver.progress(),
            completed: self.driver.is_complete(),
            noise: self.noise.sample(now),
            grid: self.grid.sample(now),
            particles: self.particles.sample(now),
            logo: self.glitch.sample(now),
            rings: self.rings.sample(now),
            title: self.typewriter.sample(now),
            flare: self.flare.sample(now),
        }
    }
}

impl Drop for IntroSequencer {
    fn drop(&mut self) {
        self.teardown();
    }
}
