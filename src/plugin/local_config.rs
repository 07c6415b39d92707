/*
 *  plugin/local_config.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Per-plugin local configuration document
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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a plugin-local configuration could not be read
#[derive(Debug, Error)]
pub enum LocalConfigError {
    #[error("configuration file not found: {0}")]
    Missing(PathBuf),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[plugin]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSection {
    #[serde(alias = "name")]
    pub plugin_name: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

/// One `[[menu]]` entry, turned into a tray item by the declarative builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuEntryConfig {
    pub menu_name: String,
    pub menu_icon: String,
    pub menu_parameter: String,
    pub function_name: String,
}

/// Parsed `config.toml` living next to a plugin's code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginLocalConfig {
    pub plugin: PluginSection,
    pub menu: Vec<MenuEntryConfig>,

    /// Document text as read from disk, handed verbatim to dynamic plugins
    #[serde(skip)]
    pub raw: String,
}

impl PluginLocalConfig {
    pub fn load(path: &Path) -> Result<Self, LocalConfigError> {
        if !path.is_file() {
            return Err(LocalConfigError::Missing(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| LocalConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| LocalConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        let mut config: PluginLocalConfig = toml::from_str(raw)?;
        config.raw = raw.to_string();
        Ok(config)
    }

    /// Menu entries usable by the declarative builder
    pub fn menu_entries(&self) -> impl Iterator<Item = &MenuEntryConfig> {
        self.menu
            .iter()
            .filter(|m| !m.menu_name.is_empty() && !m.function_name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const QUICK_START: &str = r#"
[plugin]
plugin_name = "快速启动"
icon = "APPLICATION"

[[menu]]
menu_name = "Terminal"
menu_icon = "term.svg"
menu_parameter = "xterm"
function_name = "execute_command"

[[menu]]
menu_name = ""
menu_parameter = "nothing"
function_name = "execute_command"
"#;

    #[test]
    fn test_parse_sections() {
        let config = PluginLocalConfig::parse(QUICK_START).unwrap();
        assert_eq!(config.plugin.plugin_name, "快速启动");
        assert_eq!(config.plugin.icon, "APPLICATION");
        assert_eq!(config.menu.len(), 2);
        assert_eq!(config.raw, QUICK_START);

        let usable: Vec<_> = config.menu_entries().collect();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].menu_parameter, "xterm");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = PluginLocalConfig::load(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, LocalConfigError::Missing(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[plugin\nicon = ").unwrap();

        let err = PluginLocalConfig::load(&path).unwrap_err();
        assert!(matches!(err, LocalConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, QUICK_START).unwrap();

        let config = PluginLocalConfig::load(&path).unwrap();
        assert_eq!(config.menu[0].menu_name, "Terminal");
    }
}
