/*
 *  plugin/mod.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin lifecycle and dispatch
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

//! Plugin system for DeskPet
//!
//! Plugins extend the pet in one of three roles:
//!
//! - **menu** plugins contribute tray menu entries and run named
//!   behaviours when an entry is clicked
//! - **lasting** plugins are updated once per rendered frame
//! - **init** plugins run a single entry point at startup, before the
//!   first frame
//!
//! ## Architecture
//!
//! 1. **Descriptor** (`descriptor.rs`) - `[[plugins]]` records from the
//!    global configuration
//! 2. **Local configuration** (`local_config.rs`) - `config.toml` in each
//!    plugin directory
//! 3. **Contract** (`contract.rs`) - role traits and the tagged
//!    [`PluginInstance`]
//! 4. **Sources** (`loader.rs`, `registry.rs`) - built-in factories and
//!    shared libraries
//! 5. **Manager** (`manager.rs`) - one cache slot per plugin name and the
//!    three dispatch entry points
//!
//! ## Plugin directory layout
//!
//! ```text
//! assets/plugins/QuickStart/
//!     config.toml          [plugin] + [[menu]] entries
//!     libQuickStart.so     optional shared library
//! ```
//!
//! When no library is found the plugin name is looked up among the
//! built-in plugins.

pub mod contract;
pub mod descriptor;
pub mod error;
pub mod ffi;
pub mod host;
pub mod loader;
pub mod local_config;
pub mod manager;
pub mod registry;

#[cfg(feature = "plugin-system")]
pub mod adapter;

pub use contract::{
    guarded, ActionOutput, BehaviorTable, InitEntry, InitPlugin, LastingPlugin, MenuAction,
    MenuPlugin, Plugin, PluginError, PluginFactory, PluginInstance,
};
pub use descriptor::{DescriptorError, PluginDescriptor, PluginRole, DEFAULT_INIT_ENTRY};
pub use error::{DispatchError, FailureReason, LoadError};
pub use host::{HostContext, ModelControl, MotionGroup, WindowHints};
pub use loader::{CodeUnit, DiskSource, PluginLoader, PluginSource};
pub use local_config::{LocalConfigError, MenuEntryConfig, PluginLocalConfig, PluginSection};
pub use manager::{admit, find_admitted, Admission, PluginManager, PluginReport, PluginState, ReadySlot};
pub use registry::PluginRegistry;

#[cfg(feature = "plugin-system")]
pub use adapter::DynamicPlugin;
#[cfg(feature = "plugin-system")]
pub use loader::LoadedPlugin;
