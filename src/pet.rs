/*
 *  pet.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  The pet window as seen by plugins
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

//! Window state of the running pet
//!
//! [`PetWindow`] is the host object handed to plugins. It keeps the state a
//! windowing backend would apply (geometry, visibility, title, hints and
//! colour key) and owns the model.

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::config::AppConfig;
use crate::model::PetModel;
use crate::plugin::host::{HostContext, ModelControl, WindowHints};

pub const DEFAULT_TITLE: &str = "DeskPet";

#[derive(Debug)]
pub struct PetWindow {
    position: (i32, i32),
    size: (u32, u32),
    visible: bool,
    title: String,
    hints: WindowHints,
    background: [u8; 3],
    color_key: Option<[u8; 3]>,
    cursor: (i32, i32),
    raised: u32,
    model: PetModel,
    timer_interval: Duration,
    interval_changed: bool,
    quit_requested: bool,
}

impl PetWindow {
    pub fn new(config: &AppConfig, model: PetModel) -> Self {
        let fps = config.animation.fps.max(1);
        Self {
            position: (config.window.x, config.window.y),
            size: (config.window.width, config.window.height),
            visible: true,
            title: DEFAULT_TITLE.to_string(),
            hints: WindowHints::default(),
            background: config.window.background_color,
            color_key: None,
            cursor: (0, 0),
            raised: 0,
            model,
            timer_interval: Duration::from_micros(u64::from(1_000_000 / fps)),
            interval_changed: false,
            quit_requested: false,
        }
    }

    /// Window with default configuration and an empty model
    pub fn headless() -> Self {
        let config = AppConfig::default();
        let model = PetModel::empty(&config.model.model_path);
        Self::new(&config, model)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn hints(&self) -> WindowHints {
        self.hints
    }

    pub fn color_key(&self) -> Option<[u8; 3]> {
        self.color_key
    }

    pub fn raise_count(&self) -> u32 {
        self.raised
    }

    pub fn timer_interval(&self) -> Duration {
        self.timer_interval
    }

    /// New timer interval requested by a plugin since the last call
    pub fn take_interval_change(&mut self) -> Option<Duration> {
        if std::mem::take(&mut self.interval_changed) {
            Some(self.timer_interval)
        } else {
            None
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Record the cursor position reported by the windowing backend
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    pub fn pet_model(&self) -> &PetModel {
        &self.model
    }

    pub fn pet_model_mut(&mut self) -> &mut PetModel {
        &mut self.model
    }
}

impl HostContext for PetWindow {
    fn position(&self) -> (i32, i32) {
        self.position
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            debug!("Pet {}", if visible { "shown" } else { "hidden" });
        }
        self.visible = visible;
    }

    fn raise(&mut self) {
        self.raised += 1;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_window_hints(&mut self, hints: WindowHints) {
        debug!("Window hints {:?}", hints);
        self.hints = hints;
    }

    fn background_color(&self) -> [u8; 3] {
        self.background
    }

    fn set_color_key(&mut self, key: Option<[u8; 3]>) {
        self.color_key = key;
    }

    fn cursor_position(&self) -> (i32, i32) {
        self.cursor
    }

    fn model_path(&self) -> &Path {
        self.model.path()
    }

    fn model(&mut self) -> &mut dyn ModelControl {
        &mut self.model
    }

    fn set_timer_interval(&mut self, interval: Duration) {
        if interval != self.timer_interval {
            self.timer_interval = interval;
            self.interval_changed = true;
        }
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.window.x = 7;
        config.animation.fps = 50;
        let pet = PetWindow::new(&config, PetModel::empty(Path::new("m.json")));

        assert_eq!(pet.position(), (7, 100));
        assert_eq!(pet.timer_interval(), Duration::from_millis(20));
        assert_eq!(pet.title(), DEFAULT_TITLE);
        assert!(pet.is_visible());
    }

    #[test]
    fn test_interval_change_taken_once() {
        let mut pet = PetWindow::headless();
        assert_eq!(pet.take_interval_change(), None);

        pet.set_timer_interval(Duration::from_millis(500));
        assert_eq!(pet.take_interval_change(), Some(Duration::from_millis(500)));
        assert_eq!(pet.take_interval_change(), None);
    }

    #[test]
    fn test_quit_flag() {
        let mut pet = PetWindow::headless();
        assert!(!pet.quit_requested());
        pet.quit();
        assert!(pet.quit_requested());
    }
}
