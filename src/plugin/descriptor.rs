/*
 *  plugin/descriptor.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin descriptors as declared in the global configuration
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

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entry point invoked for init plugins when the descriptor names none
pub const DEFAULT_INIT_ENTRY: &str = "on_init";

/// File name of the per-plugin local configuration document
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

/// Behavioural role declared for a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginRole {
    /// Contributes tray menu entries, invoked on menu clicks
    Menu,
    /// Invoked once per rendered frame
    Lasting,
    /// Invoked once at startup, before the first frame
    Init,
    /// Anything else found in the configuration
    #[serde(other)]
    Unknown,
}

impl PluginRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginRole::Menu => "menu",
            PluginRole::Lasting => "lasting",
            PluginRole::Init => "init",
            PluginRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PluginRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problems that make a descriptor unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("plugin name is empty")]
    EmptyName,

    #[error("plugin name `{0}` contains a path separator")]
    NameWithSeparator(String),

    #[error("plugin `{0}` has no plugin_path")]
    EmptyPath(String),

    #[error("plugin `{0}` declares an unknown plugin_type")]
    UnknownRole(String),
}

/// One `[[plugins]]` record of the global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Stable identifier, also the cache key inside the plugin manager
    #[serde(rename = "plugin_name")]
    pub name: String,

    /// Human readable label
    #[serde(rename = "plugin_chinese_name", alias = "display_name", default)]
    pub display_name: String,

    /// Directory holding the plugin code and its local configuration
    #[serde(rename = "plugin_path")]
    pub path: PathBuf,

    /// Declared role
    #[serde(rename = "plugin_type")]
    pub role: PluginRole,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Init plugins only: entry point run at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, role: PluginRole) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            path: path.into(),
            role,
            enabled: true,
            function_name: None,
        }
    }

    pub fn with_function(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Label to show the user, falling back to the identifier
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Entry point for init plugins
    pub fn entry_point(&self) -> &str {
        self.function_name.as_deref().unwrap_or(DEFAULT_INIT_ENTRY)
    }

    /// Location of the plugin-local configuration document
    pub fn local_config_path(&self) -> PathBuf {
        self.path.join(LOCAL_CONFIG_FILE)
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.path
    }

    pub fn validate(&self) -> Result<(), DescriptorError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if name.contains('/') || name.contains('\\') {
            return Err(DescriptorError::NameWithSeparator(self.name.clone()));
        }
        if self.path.as_os_str().is_empty() {
            return Err(DescriptorError::EmptyPath(self.name.clone()));
        }
        if self.role == PluginRole::Unknown {
            return Err(DescriptorError::UnknownRole(self.name.clone()));
        }
        Ok(())
    }
}
