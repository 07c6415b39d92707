/*
 *  plugin/registry.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Name to factory mapping of statically linked plugins
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

use std::collections::HashMap;

use log::debug;

use super::contract::PluginFactory;
use crate::plugins;

/// Registry of statically linked plugin factories
///
/// Each factory is the plugin's single registration entry point; it returns
/// the tagged [`PluginInstance`](super::PluginInstance) so the role is known
/// without inspecting the plugin.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every plugin shipped with the application
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(plugins::follow_mouse::NAME, plugins::follow_mouse::create);
        registry.register(plugins::visibility_toggle::NAME, plugins::visibility_toggle::create);
        registry.register(plugins::quick_start::NAME, plugins::quick_start::create);
        registry.register(plugins::countdown_timer::NAME, plugins::countdown_timer::create);
        registry.register(plugins::action_select::NAME, plugins::action_select::create);
        registry.register(plugins::emoji_selection::NAME, plugins::emoji_selection::create);
        registry.register(plugins::immersive::NAME, plugins::immersive::create);
        registry.register(plugins::immersive::PLUS_NAME, plugins::immersive::create_plus);
        registry
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register(&mut self, name: &str, factory: PluginFactory) -> &mut Self {
        debug!("Registering built-in plugin {}", name);
        self.factories.insert(name.to_string(), factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<PluginFactory> {
        self.factories.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("factories", &self.names())
            .finish()
    }
}
