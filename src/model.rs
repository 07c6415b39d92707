/*
 *  model.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Animated model state and model3.json parsing
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

//! Headless model state
//!
//! The renderer is not part of this crate. [`PetModel`] reads the motion and
//! expression inventory from a `.model3.json` file and tracks what the
//! renderer would be asked to play.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::plugin::host::{ModelControl, MotionGroup};

/// Frames a started motion keeps its priority slot
pub const MOTION_FRAMES: u32 = 90;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed model {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ModelFile {
    #[serde(rename = "FileReferences", default)]
    file_references: FileReferences,
}

#[derive(Debug, Default, Deserialize)]
struct FileReferences {
    #[serde(rename = "Motions", default)]
    motions: BTreeMap<String, Vec<MotionRef>>,
    #[serde(rename = "Expressions", default)]
    expressions: Vec<ExpressionRef>,
}

#[derive(Debug, Deserialize)]
struct MotionRef {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "File", default)]
    file: String,
    #[serde(rename = "Sound")]
    sound: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpressionRef {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionInfo {
    pub name: String,
    pub file: String,
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMotion {
    pub group: String,
    pub index: usize,
    pub priority: u8,
    remaining: u32,
}

#[derive(Debug, Clone)]
pub struct PetModel {
    path: PathBuf,
    groups: Vec<(String, Vec<MotionInfo>)>,
    expressions: Vec<String>,
    scale: f32,
    gaze: (f32, f32),
    active: Option<ActiveMotion>,
    expression: Option<String>,
    frames: u64,
}

impl PetModel {
    /// A model with no motions or expressions
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            groups: Vec::new(),
            expressions: Vec::new(),
            scale: 1.0,
            gaze: (0.0, 0.0),
            active: None,
            expression: None,
            frames: 0,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(path, &raw)?;
        info!(
            "Loaded model {} ({} motion groups, {} expressions)",
            path.display(),
            model.groups.len(),
            model.expressions.len()
        );
        Ok(model)
    }

    pub fn from_json(path: &Path, raw: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(raw).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let groups = file
            .file_references
            .motions
            .into_iter()
            .map(|(group, motions)| {
                let motions = motions
                    .into_iter()
                    .map(|m| MotionInfo {
                        name: m.name.unwrap_or_else(|| motion_label(&m.file)),
                        file: m.file,
                        sound: m.sound,
                    })
                    .collect();
                (group, motions)
            })
            .collect();

        let expressions = file
            .file_references
            .expressions
            .into_iter()
            .map(|e| e.name)
            .collect();

        Ok(Self {
            groups,
            expressions,
            ..Self::empty(path)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advance one frame
    pub fn update(&mut self, scale: f32) {
        self.scale = scale;
        self.frames += 1;

        if let Some(active) = self.active.as_mut() {
            active.remaining = active.remaining.saturating_sub(1);
            if active.remaining == 0 {
                debug!("Motion {}[{}] finished", active.group, active.index);
                self.active = None;
            }
        }
    }

    pub fn motions(&self, group: &str) -> Option<&[MotionInfo]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, motions)| motions.as_slice())
    }

    pub fn active_motion(&self) -> Option<&ActiveMotion> {
        self.active.as_ref()
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn gaze(&self) -> (f32, f32) {
        self.gaze
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// File stem of a motion path, used when a motion has no `Name`
fn motion_label(file: &str) -> String {
    let stem = Path::new(file)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(file);
    stem.strip_suffix(".motion3.json").unwrap_or(stem).to_string()
}

impl ModelControl for PetModel {
    fn drag(&mut self, x: f32, y: f32) {
        self.gaze = (x, y);
    }

    fn motion_groups(&self) -> Vec<MotionGroup> {
        self.groups
            .iter()
            .map(|(name, motions)| MotionGroup {
                name: name.clone(),
                motions: motions.iter().map(|m| m.name.clone()).collect(),
            })
            .collect()
    }

    fn start_motion(&mut self, group: &str, index: usize, priority: u8) -> bool {
        let exists = self.motions(group).is_some_and(|m| index < m.len());
        if !exists {
            return false;
        }
        if self.active.as_ref().is_some_and(|a| a.priority > priority) {
            debug!("Motion {}[{}] refused, higher priority motion playing", group, index);
            return false;
        }

        self.active = Some(ActiveMotion {
            group: group.to_string(),
            index,
            priority,
            remaining: MOTION_FRAMES,
        });
        true
    }

    fn start_random_motion(&mut self, group: &str, priority: u8) -> bool {
        let count = self.motions(group).map_or(0, |m| m.len());
        if count == 0 {
            return false;
        }
        let index = rand::rng().random_range(0..count);
        self.start_motion(group, index, priority)
    }

    fn stop_all_motions(&mut self) {
        self.active = None;
    }

    fn expression_ids(&self) -> Vec<String> {
        self.expressions.clone()
    }

    fn set_expression(&mut self, id: &str) -> bool {
        if self.expressions.iter().any(|e| e == id) {
            self.expression = Some(id.to_string());
            true
        } else {
            false
        }
    }

    fn reset_expression(&mut self) {
        self.expression = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::host::{PRIORITY_FORCE, PRIORITY_IDLE, PRIORITY_NORMAL};

    const MODEL: &str = r#"{
        "Version": 3,
        "FileReferences": {
            "Moc": "Pet.moc3",
            "Motions": {
                "Idle": [
                    { "Name": "breathe", "File": "motions/idle_01.motion3.json" },
                    { "File": "motions/idle_02.motion3.json" }
                ],
                "TapBody": [
                    { "Name": "wave", "File": "motions/tap.motion3.json", "Sound": "sounds/hi.wav" }
                ]
            },
            "Expressions": [
                { "Name": "smile", "File": "expressions/smile.exp3.json" },
                { "Name": "angry", "File": "expressions/angry.exp3.json" }
            ]
        }
    }"#;

    fn model() -> PetModel {
        PetModel::from_json(Path::new("Pet.model3.json"), MODEL).unwrap()
    }

    #[test]
    fn test_parse_inventory() {
        let m = model();
        let groups = m.motion_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Idle");
        assert_eq!(groups[0].motions, vec!["breathe", "idle_02"]);
        assert_eq!(m.motions("TapBody").unwrap()[0].sound.as_deref(), Some("sounds/hi.wav"));
        assert_eq!(m.expression_ids(), vec!["smile", "angry"]);
    }

    #[test]
    fn test_malformed_json() {
        let err = PetModel::from_json(Path::new("x.json"), "{ nope").unwrap_err();
        assert!(matches!(err, ModelError::Json { .. }));
    }

    #[test]
    fn test_motion_priority() {
        let mut m = model();
        assert!(m.start_motion("TapBody", 0, PRIORITY_FORCE));
        assert!(!m.start_motion("Idle", 0, PRIORITY_IDLE));
        assert!(!m.start_motion("Idle", 9, PRIORITY_FORCE));
        assert!(!m.start_random_motion("Nope", PRIORITY_FORCE));

        for _ in 0..MOTION_FRAMES {
            m.update(1.0);
        }
        assert!(m.active_motion().is_none());
        assert!(m.start_random_motion("Idle", PRIORITY_NORMAL));
        assert_eq!(m.active_motion().unwrap().group, "Idle");

        m.stop_all_motions();
        assert!(m.active_motion().is_none());
    }

    #[test]
    fn test_expressions() {
        let mut m = model();
        assert!(m.set_expression("smile"));
        assert!(!m.set_expression("sad"));
        assert_eq!(m.expression(), Some("smile"));
        m.reset_expression();
        assert_eq!(m.expression(), None);
    }
}
