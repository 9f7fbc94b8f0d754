use directories::ProjectDirs;
use glam::Vec2;
use ik_kernel::{Goal, SolverConfig, DEFAULT_RATE_CONSTANT, DEFAULT_STEPS_PER_SECOND};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;
use viewport::ScreenConvention;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "ikarm";
const APPLICATION: &str = "ik_arm";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to resolve platform config directory")]
    MissingProjectDirs,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub chain: ChainSettings,
    pub simulation: SimulationSettings,
    pub window: WindowSettings,
}

/// Link layout. Fixed at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Length of each link from root to tip
    pub link_lengths: Vec<f32>,
    /// Chain root in chain coordinates
    pub origin: [f32; 2],
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            link_lengths: vec![100.0, 100.0, 100.0, 75.0, 75.0],
            origin: [0.0, 0.0],
        }
    }
}

impl ChainSettings {
    pub fn origin_vec(&self) -> Vec2 {
        Vec2::from_array(self.origin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Solver ticks per second; also the frame pacing target
    pub tick_rate: f32,
    /// Timestep divisor `K`, see [`SolverConfig::rate_constant`]
    pub rate_constant: f32,
    pub initial_goal: GoalSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_STEPS_PER_SECOND,
            rate_constant: DEFAULT_RATE_CONSTANT,
            initial_goal: GoalSettings::default(),
        }
    }
}

impl SimulationSettings {
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            steps_per_second: self.tick_rate,
            rate_constant: self.rate_constant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    pub position: [f32; 2],
    /// Degrees
    pub orientation: f32,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            position: [-50.0, 50.0],
            orientation: 0.0,
        }
    }
}

impl GoalSettings {
    pub fn to_goal(&self) -> Goal {
        Goal::new(Vec2::from_array(self.position), self.orientation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub screen_convention: ScreenConvention,
    /// RGB clear color
    pub background: [u8; 3],
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "IK solver".to_string(),
            screen_convention: ScreenConvention::YDown,
            background: [0, 0, 132],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Result<Self, SettingsError> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(SettingsError::MissingProjectDirs)?;
        let config_dir = dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        let path = config_dir.join(SETTINGS_FILE);
        Ok(Self { path })
    }

    /// Store backed by an explicit file instead of the platform config dir.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<UserSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(UserSettings::default());
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let settings = serde_json::from_reader(reader)?;
        Ok(settings)
    }

    pub fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, settings)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
