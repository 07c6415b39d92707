/*
 *  plugin/host.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Capabilities the running pet exposes to plugins
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

//! Host capability interface
//!
//! Plugins never see the concrete window. Everything they may do to the
//! running pet goes through [`HostContext`], and model manipulation through
//! [`ModelControl`].

use std::path::Path;
use std::time::Duration;

/// Motion priorities understood by [`ModelControl`]
pub const PRIORITY_IDLE: u8 = 1;
pub const PRIORITY_NORMAL: u8 = 2;
pub const PRIORITY_FORCE: u8 = 3;

/// Window manager hints an init plugin may request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowHints {
    pub frameless: bool,
    pub stay_on_top: bool,
    pub tool_window: bool,
    pub translucent: bool,
}

/// A motion group as described by the model file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionGroup {
    pub name: String,
    /// Display names of the motions, in file order
    pub motions: Vec<String>,
}

/// Control surface of the animated model
pub trait ModelControl {
    /// Point the model's gaze/body toward a window-relative position
    fn drag(&mut self, x: f32, y: f32);

    fn motion_groups(&self) -> Vec<MotionGroup>;

    /// Start a specific motion; false when group or index does not exist
    fn start_motion(&mut self, group: &str, index: usize, priority: u8) -> bool;

    /// Start a random motion from a group; false when the group is empty
    fn start_random_motion(&mut self, group: &str, priority: u8) -> bool;

    fn stop_all_motions(&mut self);

    fn expression_ids(&self) -> Vec<String>;

    /// Apply an expression; false when the id is unknown
    fn set_expression(&mut self, id: &str) -> bool;

    fn reset_expression(&mut self);
}

/// Operations plugins are permitted to perform on the running pet
pub trait HostContext {
    /// Window origin in screen coordinates
    fn position(&self) -> (i32, i32);

    fn move_to(&mut self, x: i32, y: i32);

    fn size(&self) -> (u32, u32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Bring the window to the front
    fn raise(&mut self);

    fn set_title(&mut self, title: &str);

    fn set_window_hints(&mut self, hints: WindowHints);

    fn background_color(&self) -> [u8; 3];

    /// Make pixels of this colour transparent, or clear the key
    fn set_color_key(&mut self, key: Option<[u8; 3]>);

    /// Cursor position in screen coordinates
    fn cursor_position(&self) -> (i32, i32);

    fn model_path(&self) -> &Path;

    fn model(&mut self) -> &mut dyn ModelControl;

    /// Change the frame timer interval
    fn set_timer_interval(&mut self, interval: Duration);

    /// Ask the application to shut down after the current event
    fn quit(&mut self);
}
