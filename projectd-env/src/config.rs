//! Configuration of [`EpisodeController`](crate::episode::EpisodeController).
use crate::{error::ConfigError, profile::Profile};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of the optional viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Attach a viewer once the warm-up is over.
    pub enabled: bool,

    /// Number of steps after which the viewer attaches.
    pub warmup_steps: usize,

    /// Render rate of the viewer.
    pub render_hz: u32,

    /// Make the viewer follow the car.
    pub follow_car: bool,

    /// Play engine sound while following the car.
    pub enable_sound: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            warmup_steps: 10,
            render_hz: 60,
            follow_car: false,
            enable_sound: false,
        }
    }
}

impl ViewerConfig {
    /// Enables or disables the viewer.
    pub fn enabled(mut self, v: bool) -> Self {
        self.enabled = v;
        self
    }

    /// Sets the number of steps before the viewer attaches.
    pub fn warmup_steps(mut self, v: usize) -> Self {
        self.warmup_steps = v;
        self
    }

    /// Sets the render rate.
    pub fn render_hz(mut self, v: u32) -> Self {
        self.render_hz = v;
        self
    }

    /// Makes the viewer follow the car.
    pub fn follow_car(mut self, v: bool) -> Self {
        self.follow_car = v;
        self
    }

    /// Enables engine sound.
    pub fn enable_sound(mut self, v: bool) -> Self {
        self.enable_sound = v;
        self
    }
}

/// Configuration of the drift environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEnvConfig {
    /// Directory holding the simulator's `content` tree.
    pub asset_root: PathBuf,

    /// Track directory name.
    pub track: String,

    /// Car model directory name.
    pub car_model: String,

    /// Physics tick in seconds.
    pub sim_dt: f64,

    /// Let the simulator move controls toward their targets instead of snapping.
    pub smooth_controls: bool,

    /// Viewer settings.
    pub viewer: ViewerConfig,

    /// Environment variant.
    pub profile: Profile,
}

impl Default for DriftEnvConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            track: "driftplayground".to_string(),
            car_model: "ks_toyota_supra_mkiv_drift".to_string(),
            sim_dt: 1.0 / 333.0,
            smooth_controls: true,
            viewer: ViewerConfig::default(),
            profile: Profile::default(),
        }
    }
}

impl DriftEnvConfig {
    /// Sets the asset root.
    pub fn asset_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.asset_root = v.into();
        self
    }

    /// Sets the track.
    pub fn track(mut self, v: impl Into<String>) -> Self {
        self.track = v.into();
        self
    }

    /// Sets the car model.
    pub fn car_model(mut self, v: impl Into<String>) -> Self {
        self.car_model = v.into();
        self
    }

    /// Sets the physics tick in seconds.
    pub fn sim_dt(mut self, v: f64) -> Self {
        self.sim_dt = v;
        self
    }

    /// Enables or disables smoothed controls.
    pub fn smooth_controls(mut self, v: bool) -> Self {
        self.smooth_controls = v;
        self
    }

    /// Sets the viewer configuration.
    pub fn viewer(mut self, v: ViewerConfig) -> Self {
        self.viewer = v;
        self
    }

    /// Sets the environment variant.
    pub fn profile(mut self, v: Profile) -> Self {
        self.profile = v;
        self
    }

    /// Checks every setting, including the profile's.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sim_dt.is_finite() && self.sim_dt > 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "sim_dt",
                reason: format!("{} is not a positive finite number", self.sim_dt),
            });
        }
        if self.track.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "track",
                reason: "empty name".to_string(),
            });
        }
        if self.car_model.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "car_model",
                reason: "empty name".to_string(),
            });
        }
        if self.viewer.render_hz == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "viewer.render_hz",
                reason: "must be positive".to_string(),
            });
        }
        self.profile.validate()
    }

    /// Constructs [`DriftEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DriftEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use tempdir::TempDir;

    #[test]
    fn test_defaults() {
        let config = DriftEnvConfig::default();
        config.validate().unwrap();
        assert!((config.sim_dt - 0.003003).abs() < 1e-6);
        assert!(!config.viewer.enabled);
        assert_eq!(config.viewer.warmup_steps, 10);
        assert_eq!(config.viewer.render_hz, 60);
    }

    #[test]
    fn test_rejects_non_positive_dt() {
        for dt in [0.0, -0.01, f64::NAN].iter() {
            let config = DriftEnvConfig::default().sim_dt(*dt);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidSetting { name: "sim_dt", .. })
            ));
        }
    }

    #[test]
    fn test_serde_drift_env_config() -> Result<()> {
        let config = DriftEnvConfig::default()
            .asset_root("/opt/projectd")
            .car_model("ks_toyota_ae86_drift")
            .viewer(ViewerConfig::default().enabled(true).follow_car(true))
            .profile(Profile::drift_telemetry());

        let dir = TempDir::new("drift_env_config")?;
        let path = dir.path().join("drift_env_config.yaml");
        println!("{:?}", path);

        config.save(&path)?;
        let config_ = DriftEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
