/*
 *  plugins/immersive.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Startup window styling
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

use crate::plugin::{
    BehaviorTable, DEFAULT_INIT_ENTRY, HostContext, InitEntry, InitPlugin, Plugin,
    PluginDescriptor, PluginError, PluginInstance, PluginLocalConfig, WindowHints,
};

use super::on_init;

pub const NAME: &str = "Immersive";
pub const PLUS_NAME: &str = "ImmersivePlus";

/// Frameless, translucent tool window that stays above other windows
pub struct Immersive {
    entries: BehaviorTable<InitEntry<Self>>,
}

impl Immersive {
    pub fn new() -> Self {
        Self {
            entries: BehaviorTable::<InitEntry<Self>>::new()
                .with("immersive", Self::immersive)
                .with(DEFAULT_INIT_ENTRY, on_init),
        }
    }

    fn immersive(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        host.set_window_hints(WindowHints {
            frameless: true,
            stay_on_top: true,
            tool_window: true,
            translucent: true,
        });
        Ok(())
    }
}

impl Default for Immersive {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Immersive {}

impl InitPlugin for Immersive {
    fn has_entry(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    fn run_entry(&mut self, entry: &str, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let run = self.entries.lookup(entry)?;
        run(self, host)
    }
}

/// Keys out the configured background colour instead of relying on a
/// translucent surface
pub struct ImmersivePlus {
    entries: BehaviorTable<InitEntry<Self>>,
}

impl ImmersivePlus {
    pub fn new() -> Self {
        Self {
            entries: BehaviorTable::<InitEntry<Self>>::new()
                .with("immersive_plus", Self::immersive_plus)
                .with(DEFAULT_INIT_ENTRY, on_init),
        }
    }

    fn immersive_plus(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let key = host.background_color();
        host.set_color_key(Some(key));
        host.set_window_hints(WindowHints {
            frameless: true,
            stay_on_top: true,
            ..WindowHints::default()
        });
        Ok(())
    }
}

impl Default for ImmersivePlus {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ImmersivePlus {}

impl InitPlugin for ImmersivePlus {
    fn has_entry(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    fn run_entry(&mut self, entry: &str, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let run = self.entries.lookup(entry)?;
        run(self, host)
    }
}

pub fn create(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Init(Box::new(Immersive::new())))
}

pub fn create_plus(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Init(Box::new(ImmersivePlus::new())))
}
