/*
 *  plugins/mod.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugins shipped with DeskPet
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

//! Built-in plugins
//!
//! Each module exports its registry name and a `create` factory. The
//! factories are collected by [`PluginRegistry::with_builtins`].
//!
//! [`PluginRegistry::with_builtins`]: crate::plugin::PluginRegistry::with_builtins

pub mod action_select;
pub mod countdown_timer;
pub mod emoji_selection;
pub mod follow_mouse;
pub mod immersive;
pub mod quick_start;
pub mod visibility_toggle;

use crate::plugin::{HostContext, PluginError};

/// The conventional init entry point, which does nothing
pub(crate) fn on_init<P>(_plugin: &mut P, _host: &mut dyn HostContext) -> Result<(), PluginError> {
    Ok(())
}

/// Icon from the plugin's local configuration, or a fallback
pub(crate) fn icon_or<'a>(icon: &'a str, fallback: &'a str) -> &'a str {
    if icon.is_empty() { fallback } else { icon }
}
