//! Intro configuration
//!
//! Built once at startup and passed by reference into the sequencer. On the
//! web it can be overridden from LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CORRUPTION_SQUARES, MAX_NOISE_DOTS, MAX_PARTICLES};
use crate::error::ConfigError;
use crate::intro::PhaseSchedule;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Spiral particles for this preset
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 60,
            QualityPreset::High => 100,
        }
    }

    /// Flickering dots in the noise overlay
    pub fn noise_dot_count(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 120,
            QualityPreset::High => 200,
        }
    }

    /// Corruption squares over the logo
    pub fn corruption_square_count(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 12,
            QualityPreset::High => 18,
        }
    }

    /// Whether rings and the flare get their soft glow pass
    pub fn glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// What to do when the host backgrounds the app mid-sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterruptionPolicy {
    /// Jump straight to completion on return
    #[default]
    SkipToCompletion,
    /// Continue from where the sequence paused
    Resume,
}

/// Intro configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Timing table
    pub schedule: PhaseSchedule,
    /// Element counts
    pub quality: QualityPreset,
    /// Drop flicker, scramble and idle glitch bursts
    pub reduced_motion: bool,
    pub interruption: InterruptionPolicy,
    /// Fixed seed for reproducible runs; random per cold start otherwise
    pub seed: Option<u64>,
    pub title: String,
    pub tagline: String,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            schedule: PhaseSchedule::default(),
            quality: QualityPreset::Medium,
            reduced_motion: false,
            interruption: InterruptionPolicy::SkipToCompletion,
            seed: None,
            title: "AURUM".to_string(),
            tagline: "WEALTH, DECODED".to_string(),
        }
    }
}

impl IntroConfig {
    /// Create a config from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.schedule.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Native command line, program name already stripped:
    /// `[--quality <low|medium|high>] [config.json]`. A preset given here
    /// overrides the one in the file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut quality = None;
        let mut path = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--quality" | "-q" => {
                    let name = args.next().ok_or_else(|| {
                        ConfigError::Usage("--quality needs a preset name".to_string())
                    })?;
                    let name = name.as_ref();
                    quality = Some(
                        QualityPreset::from_str(name)
                            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?,
                    );
                }
                other if path.is_none() => path = Some(other.to_string()),
                other => {
                    return Err(ConfigError::Usage(format!("unexpected argument `{}`", other)));
                }
            }
        }

        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::from_preset(quality.unwrap_or_default()),
        };
        if let Some(quality) = quality {
            config.quality = quality;
        }
        Ok(config)
    }

    /// Effective particle count (capped)
    pub fn particle_count(&self) -> usize {
        self.quality.particle_count().min(MAX_PARTICLES)
    }

    pub fn noise_dot_count(&self) -> usize {
        self.quality.noise_dot_count().min(MAX_NOISE_DOTS)
    }

    pub fn corruption_square_count(&self) -> usize {
        if self.reduced_motion {
            return 0;
        }
        self.quality
            .corruption_square_count()
            .min(MAX_CORRUPTION_SQUARES)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "cinematic_intro_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded intro config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored intro config: {}", e),
                }
            }
        }

        log::info!("Using default intro config");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScheduleError;

    #[test]
    fn test_preset_counts() {
        assert_eq!(IntroConfig::default().particle_count(), 60);
        assert_eq!(IntroConfig::from_preset(QualityPreset::Low).particle_count(), 30);
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert!(!QualityPreset::Low.glow_enabled());
    }

    #[test]
    fn test_reduced_motion_drops_corruption() {
        let config = IntroConfig {
            reduced_motion: true,
            ..IntroConfig::default()
        };
        assert_eq!(config.corruption_square_count(), 0);
        assert_eq!(IntroConfig::default().corruption_square_count(), 12);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = IntroConfig::from_json(r#"{ "quality": "High", "seed": 7 }"#).unwrap();
        assert_eq!(config.quality, QualityPreset::High);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.schedule, PhaseSchedule::default());
        assert_eq!(config.interruption, InterruptionPolicy::SkipToCompletion);
    }

    #[test]
    fn test_from_json_rejects_bad_schedule() {
        let json = r#"{ "schedule": { "entries": [
            { "name": "a", "start_ms": 0.0, "duration_ms": 0.0 }
        ] } }"#;
        match IntroConfig::from_json(json) {
            Err(ConfigError::Schedule(ScheduleError::InvalidDuration { name, .. })) => {
                assert_eq!(name, "a")
            }
            other => panic!("expected schedule error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            IntroConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_schedule() {
        let config = IntroConfig::default().with_seed(42);
        let json = config.to_json().unwrap();
        let back = IntroConfig::from_json(&json).unwrap();
        assert_eq!(back.schedule, config.schedule);
        assert_eq!(back.seed, Some(42));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            IntroConfig::load_from_path("/nonexistent/intro.json"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_args_select_preset() {
        let config = IntroConfig::from_args(["--quality", "low"]).unwrap();
        assert_eq!(config.quality, QualityPreset::Low);
        assert_eq!(config.particle_count(), 30);

        let config = IntroConfig::from_args(["-q", "HIGH"]).unwrap();
        assert_eq!(config.particle_count(), 100);

        let config = IntroConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config.quality, QualityPreset::Medium);
        assert_eq!(config.schedule, PhaseSchedule::default());
    }

    #[test]
    fn test_args_preset_overrides_file() {
        let path = std::env::temp_dir().join(format!("intro-args-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "quality": "High", "seed": 9 }"#).unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let from_file = IntroConfig::from_args([path_arg.as_str()]).unwrap();
        assert_eq!(from_file.quality, QualityPreset::High);
        assert_eq!(from_file.seed, Some(9));

        let overridden = IntroConfig::from_args([path_arg.as_str(), "--quality", "med"]).unwrap();
        assert_eq!(overridden.quality, QualityPreset::Medium);
        assert_eq!(overridden.seed, Some(9));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_args_rejects_bad_input() {
        assert!(matches!(
            IntroConfig::from_args(["--quality", "ultra"]),
            Err(ConfigError::UnknownPreset(name)) if name == "ultra"
        ));
        assert!(matches!(
            IntroConfig::from_args(["--quality"]),
            Err(ConfigError::Usage(_))
        ));
        assert!(matches!(
            IntroConfig::from_args(["a.json", "b.json"]),
            Err(ConfigError::Usage(_))
        ));
    }
}
