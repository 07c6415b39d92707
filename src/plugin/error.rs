/*
 *  plugin/error.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin load, resolution and dispatch errors
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

use std::path::PathBuf;

use thiserror::Error;

use super::contract::PluginError;
use super::descriptor::{DescriptorError, PluginRole};

/// Why a plugin's code could not be obtained
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("plugin directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("no library or built-in named `{name}` in {path}")]
    NotFound { name: String, path: PathBuf },

    #[error("failed to load {path}: {message}")]
    Library { path: PathBuf, message: String },

    #[error("ABI version mismatch: plugin {plugin} incompatible with host {host}")]
    AbiMismatch { plugin: String, host: String },

    #[error("factory failed: {0}")]
    Factory(PluginError),
}

/// Reason stored in a failed cache entry
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("config error: {0}")]
    Config(String),

    #[error("contract error: no init entry point `{0}`")]
    MissingEntry(String),

    #[error("initialization error: initialize() returned false")]
    InitializeRejected,

    #[error("initialization error: {0}")]
    InitializePanicked(PluginError),

    #[error("init entry point failed: {0}")]
    EntryFailed(PluginError),

    #[error("quarantined after update failure: {0}")]
    UpdateFailed(PluginError),
}

impl FailureReason {
    /// Short category used in reports
    pub fn category(&self) -> &'static str {
        match self {
            FailureReason::Load(_) => "load",
            FailureReason::Config(_) => "config",
            FailureReason::MissingEntry(_) => "contract",
            FailureReason::InitializeRejected | FailureReason::InitializePanicked(_) => {
                "initialize"
            }
            FailureReason::EntryFailed(_) | FailureReason::UpdateFailed(_) => "invocation",
        }
    }
}

/// Why a dispatch request produced no result
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error("plugin `{0}` is disabled")]
    Disabled(String),

    #[error("plugin `{name}` is declared {declared}, not menu")]
    NotMenu { name: String, declared: PluginRole },

    #[error("plugin `{0}` is unavailable")]
    Unavailable(String),

    #[error("plugin `{0}` does not satisfy the menu contract")]
    RoleMismatch(String),

    #[error("plugin `{name}` has no function `{function}`")]
    NoSuchAction { name: String, function: String },

    #[error("plugin `{name}` failed: {source}")]
    Invocation {
        name: String,
        #[source]
        source: PluginError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_categories() {
        let load = FailureReason::from(LoadError::MissingDirectory(PathBuf::from("x")));
        assert_eq!(load.category(), "load");
        assert_eq!(FailureReason::Config("bad".into()).category(), "config");
        assert_eq!(FailureReason::MissingEntry("on_init".into()).category(), "contract");
        assert_eq!(FailureReason::InitializeRejected.category(), "initialize");
        assert_eq!(
            FailureReason::UpdateFailed(PluginError::Failed("x".into())).category(),
            "invocation"
        );
    }

    #[test]
    fn test_messages_name_the_plugin() {
        let e = DispatchError::NoSuchAction {
            name: "QuickStart".into(),
            function: "fly".into(),
        };
        assert_eq!(e.to_string(), "plugin `QuickStart` has no function `fly`");
    }
}
