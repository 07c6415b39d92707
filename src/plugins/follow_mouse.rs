/*
 *  plugins/follow_mouse.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Point the model at the cursor every frame
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
    HostContext, LastingPlugin, Plugin, PluginDescriptor, PluginError, PluginInstance,
    PluginLocalConfig,
};

pub const NAME: &str = "FollowMouse";

/// Drags the model toward the cursor, in window-relative coordinates
pub struct FollowMouse;

impl Plugin for FollowMouse {}

impl LastingPlugin for FollowMouse {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let (screen_x, screen_y) = host.cursor_position();
        let (pet_x, pet_y) = host.position();
        host.model()
            .drag((screen_x - pet_x) as f32, (screen_y - pet_y) as f32);
        Ok(())
    }
}

pub fn create(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(FollowMouse)))
}
