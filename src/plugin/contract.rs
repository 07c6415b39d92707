/*
 *  plugin/contract.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Capability contract every plugin satisfies
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

//! Plugin capability contract
//!
//! A plugin is exactly one of three roles. The role is fixed by the variant
//! of [`PluginInstance`] its factory returns, so the manager never has to
//! guess a plugin's shape at runtime.
//!
//! Named behaviours (menu functions, init entry points) are looked up in a
//! [`BehaviorTable`] the plugin builds once when it is created. A missing
//! name is a typed [`PluginError::NoSuchAction`], never a silent no-op.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use super::descriptor::{PluginDescriptor, PluginRole};
use super::host::HostContext;
use super::local_config::PluginLocalConfig;
use crate::menu::MenuSection;

/// Errors raised by plugin behaviour
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("no behaviour named `{0}`")]
    NoSuchAction(String),

    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error("{0}")]
    Failed(String),

    #[error("plugin panicked: {0}")]
    Panicked(String),
}

/// What a menu behaviour hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    Done,
    Message(String),
}

/// Menu behaviour bound to a plugin type
pub type MenuAction<P> = fn(&mut P, &mut dyn HostContext, &str) -> Result<ActionOutput, PluginError>;

/// Init entry point bound to a plugin type
pub type InitEntry<P> = fn(&mut P, &mut dyn HostContext) -> Result<(), PluginError>;

/// Name -> behaviour mapping built once per plugin instance
#[derive(Debug, Clone)]
pub struct BehaviorTable<F> {
    entries: Vec<(&'static str, F)>,
}

impl<F> Default for BehaviorTable<F> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<F: Copy> BehaviorTable<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behaviour; a later registration under the same name wins
    pub fn with(mut self, name: &'static str, behavior: F) -> Self {
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, behavior));
        self
    }

    pub fn get(&self, name: &str) -> Option<F> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    pub fn lookup(&self, name: &str) -> Result<F, PluginError> {
        self.get(name)
            .ok_or_else(|| PluginError::NoSuchAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }
}

/// Behaviour shared by all roles
pub trait Plugin {
    /// Called once after creation. Returning false marks the plugin
    /// unavailable for the rest of the run.
    fn initialize(&mut self) -> bool {
        true
    }

    /// Release plugin resources. Only called at application teardown.
    fn cleanup(&mut self) {}
}

/// Plugins that contribute tray menu entries
pub trait MenuPlugin: Plugin {
    fn has_action(&self, function_name: &str) -> bool;

    fn execute(
        &mut self,
        function_name: &str,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError>;

    /// Build the plugin's menu section by hand. Returning true suppresses
    /// the declarative `[[menu]]` entries of the local configuration.
    fn create_custom_menu(&mut self, _host: &mut dyn HostContext, _menu: &mut MenuSection) -> bool {
        false
    }
}

/// Plugins invoked on every frame
pub trait LastingPlugin: Plugin {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError>;
}

/// Plugins run once at startup
pub trait InitPlugin: Plugin {
    fn has_entry(&self, entry: &str) -> bool;

    fn run_entry(&mut self, entry: &str, host: &mut dyn HostContext) -> Result<(), PluginError>;
}

/// A live plugin, tagged with its role
pub enum PluginInstance {
    Menu(Box<dyn MenuPlugin>),
    Lasting(Box<dyn LastingPlugin>),
    Init(Box<dyn InitPlugin>),
}

impl PluginInstance {
    pub fn role(&self) -> PluginRole {
        match self {
            PluginInstance::Menu(_) => PluginRole::Menu,
            PluginInstance::Lasting(_) => PluginRole::Lasting,
            PluginInstance::Init(_) => PluginRole::Init,
        }
    }

    pub fn initialize(&mut self) -> bool {
        match self {
            PluginInstance::Menu(p) => p.initialize(),
            PluginInstance::Lasting(p) => p.initialize(),
            PluginInstance::Init(p) => p.initialize(),
        }
    }

    pub fn cleanup(&mut self) {
        match self {
            PluginInstance::Menu(p) => p.cleanup(),
            PluginInstance::Lasting(p) => p.cleanup(),
            PluginInstance::Init(p) => p.cleanup(),
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PluginInstance::{}", self.role())
    }
}

/// Registration entry point of a statically linked plugin
pub type PluginFactory =
    fn(&PluginDescriptor, &PluginLocalConfig) -> Result<PluginInstance, PluginError>;

/// Run plugin code, turning a panic into [`PluginError::Panicked`]
///
/// Panics must not unwind into the render loop or across an FFI boundary.
/// The caller logs the failure.
pub fn guarded<R, F>(f: F) -> Result<R, PluginError>
where
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown error".to_string()
            };
            Err(PluginError::Panicked(message))
        }
    }
}
