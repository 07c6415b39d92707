/*
 *  config.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Global configuration document and its store
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::Args;
use dirs_next::home_dir;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::plugin::PluginDescriptor;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Validation error: {0}")]
    Validation(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub animation: AnimationConfig,
    pub plugins: Vec<PluginDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Window fill colour, also the colour key used by colour-keyed windows
    pub background_color: [u8; 3],
    /// Persist the window position at shutdown
    pub remember_position: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 400,
            height: 500,
            background_color: [0, 0, 0],
            remember_position: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/model/Pet.model3.json"),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per second
    #[serde(alias = "frame_rate_ms")]
    pub fps: u32,
    /// Resolve every plugin before the first frame
    pub prewarm_plugins: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            prewarm_plugins: true,
        }
    }
}

/// Command line overrides, layered in memory over the document
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Frames per second
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,
    /// Model scale factor
    #[arg(long, value_name = "SCALE")]
    pub scale: Option<f32>,
    /// Path to a .model3.json file
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
    /// Skip resolving plugins before the first frame
    #[arg(long = "no-prewarm")]
    pub no_prewarm: bool,
}

impl AppConfig {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(fps) = overrides.fps {
            self.animation.fps = fps;
        }
        if let Some(scale) = overrides.scale {
            self.model.scale = scale;
        }
        if let Some(model) = overrides.model.as_ref() {
            self.model.model_path = model.clone();
        }
        if overrides.no_prewarm {
            self.animation.prewarm_plugins = false;
        }
    }

    /// Put any invariants here (required fields, ranges, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Validation("window width/height must be > 0".into()));
        }
        if !(1..=240).contains(&self.animation.fps) {
            return Err(ConfigError::Validation("animation fps must be 1..=240".into()));
        }
        if !(self.model.scale > 0.0) {
            return Err(ConfigError::Validation("model scale must be > 0".into()));
        }
        Ok(())
    }
}

/// TOML-backed configuration with recoverable writes
///
/// `save` writes through a sibling temp file; when anything fails the
/// in-memory document is restored from the last good copy.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: AppConfig,
    backup: AppConfig,
    overrides: Overrides,
}

impl ConfigStore {
    /// Load `path`; create it with defaults when missing and allowed
    pub fn open(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self, ConfigError> {
        let path = path.into();

        if path.exists() {
            let config = read_toml(&path)?;
            info!("Loaded configuration from {}", path.display());
            return Ok(Self::with_config(path, config));
        }

        if !create_if_missing {
            return Err(ConfigError::NotFound(path));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut store = Self::with_config(path, AppConfig::default());
        store.save()?;
        info!("Created default configuration at {}", store.path.display());
        Ok(store)
    }

    /// Copy `example` into place when `path` is missing, then open it
    pub fn open_or_seed(path: impl Into<PathBuf>, example: &Path) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() && example.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
            fs::copy(example, &path).map_err(io_error(&path))?;
            info!("Seeded {} from {}", path.display(), example.display());
        }
        Self::open(path, true)
    }

    fn with_config(path: PathBuf, config: AppConfig) -> Self {
        Self {
            path,
            backup: config.clone(),
            config,
            overrides: Overrides::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document as persisted
    pub fn document(&self) -> &AppConfig {
        &self.config
    }

    /// The document with command line overrides applied
    pub fn effective(&self) -> AppConfig {
        let mut config = self.config.clone();
        config.apply_overrides(&self.overrides);
        config
    }

    /// Layer overrides over the document and validate the result
    pub fn set_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        let mut candidate = self.config.clone();
        candidate.apply_overrides(&overrides);
        candidate.validate()?;
        self.overrides = overrides;
        Ok(())
    }

    /// Plugin descriptors, read from the current document every call
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.config.plugins
    }

    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.write() {
            Ok(()) => {
                self.backup = self.config.clone();
                debug!("Saved configuration to {}", self.path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Saving {} failed, keeping last good configuration: {}", self.path.display(), e);
                self.config = self.backup.clone();
                Err(e)
            }
        }
    }

    fn write(&self) -> Result<(), ConfigError> {
        let text = self.config.to_toml()?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text).map_err(io_error(&tmp))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(&self.path)(e));
        }
        Ok(())
    }

    /// Mutate then save; rolled back when validation or saving fails
    pub fn update<F>(&mut self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        f(&mut self.config);
        if let Err(e) = self.config.validate() {
            self.config = self.backup.clone();
            return Err(e);
        }
        self.save()
    }

    /// Re-read the document from disk
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let config = read_toml(&self.path)?;
        self.backup = config.clone();
        self.config = config;
        info!("Reloaded configuration from {}", self.path.display());
        Ok(())
    }
}

/// Try common locations in order (first hit wins).
pub fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/deskpet/config.toml
    if let Some(home) = home_dir() {
        let p = home.join(".config/deskpet/config.toml");
        if p.exists() {
            return Some(p);
        }
    }
    // project local
    let p = PathBuf::from("config.toml");
    if p.exists() {
        return Some(p);
    }
    None
}

/// Where a new configuration is created when none exists
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

fn read_toml(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(io_error(path))?;
    AppConfig::parse(&raw, path)
}
