/*
 *  lib.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Library root
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

//! DeskPet
//!
//! A desktop companion whose behaviour comes from plugins. Plugins are
//! listed in the global configuration, each with one of three roles:
//! menu plugins add tray entries, lasting plugins run every frame, and
//! init plugins run once before the first frame. [`plugin::PluginManager`]
//! turns that list into live instances, once per name, and keeps a failing
//! plugin from taking the rest of the pet down with it.

pub mod app;
pub mod config;
pub mod console;
pub mod menu;
pub mod model;
pub mod pacer;
pub mod pet;
pub mod plugin;
pub mod plugins;
