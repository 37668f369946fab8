use std::path::{Path, PathBuf};
use std::time::Duration;

use ninesweep_core::BoardSize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Presentation settings. The board itself is always the classic 9×9 with 10
/// mines; everything here only changes how it is shown and heard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    /// Side of one square cell, in pixels.
    pub cell_size: u32,
    pub status_bar_height: u32,
    pub target_fps: u32,
    pub asset_dir: PathBuf,
    /// Font for numbers and status text, relative paths resolve against `asset_dir`.
    pub font: PathBuf,
    pub volume: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Minesweeper".to_string(),
            cell_size: 60,
            status_bar_height: 50,
            target_fps: 60,
            asset_dir: PathBuf::from("assets"),
            font: PathBuf::from("font.ttf"),
            volume: 1.0,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_FILE: &'static str = "ninesweep.toml";

    /// Loads `explicit` when given, otherwise [`Self::DEFAULT_FILE`] if it exists,
    /// otherwise the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(Self::DEFAULT_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    log::debug!("no {} found, using defaults", Self::DEFAULT_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        config.validated()
    }

    pub const MAX_CELL_SIZE: u32 = 512;
    pub const MAX_STATUS_BAR_HEIGHT: u32 = 1024;

    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be positive"));
        }
        if self.cell_size > Self::MAX_CELL_SIZE {
            return Err(ConfigError::Invalid("cell_size must be at most 512"));
        }
        if self.status_bar_height > Self::MAX_STATUS_BAR_HEIGHT {
            return Err(ConfigError::Invalid("status_bar_height must be at most 1024"));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive"));
        }
        if !self.volume.is_finite() {
            return Err(ConfigError::Invalid("volume must be a number"));
        }
        self.volume = self.volume.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn asset_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.asset_dir.join(name)
    }

    pub fn font_path(&self) -> PathBuf {
        if self.font.is_absolute() {
            self.font.clone()
        } else {
            self.asset_path(&self.font)
        }
    }

    /// Buffer size in pixels: the grid plus the status bar underneath.
    pub fn window_size(&self, size: BoardSize) -> (u32, u32) {
        (
            u32::from(size.cols) * self.cell_size,
            u32::from(size.rows) * self.cell_size + self.status_bar_height,
        )
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}
