/*
 *  DeskPet Clock Plugin
 *
 *  A dynamic plugin for DeskPet that keeps the current local time in the
 *  pet window's title.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

//! # DeskPet Clock Plugin
//!
//! A lasting-role plugin: on every frame it formats the local time and
//! writes it into the window title, only touching the host when the text
//! changed.
//!
//! ## Usage
//!
//! Build with `cargo build --release -p deskpet-plugin-clock`, copy the
//! library into the plugin directory and list it in the configuration:
//!
//! ```toml
//! [[plugins]]
//! plugin_name = "Clock"
//! plugin_chinese_name = "Clock"
//! plugin_path = "plugins/Clock"
//! plugin_type = "lasting"
//! ```
//!
//! The plugin's own `config.toml` may set the format:
//!
//! ```toml
//! [clock]
//! format = "%H:%M"
//! ```

mod ffi;
mod plugin;

// Re-export the plugin registration function
pub use plugin::deskpet_plugin_register;
