/*
 *  plugins/action_select.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Play model motions from the tray
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

use crate::menu::MenuSection;
use crate::plugin::host::PRIORITY_FORCE;
use crate::plugin::{
    ActionOutput, BehaviorTable, HostContext, MenuAction, MenuPlugin, Plugin, PluginDescriptor,
    PluginError, PluginInstance, PluginLocalConfig,
};

use super::icon_or;

pub const NAME: &str = "ActionSelect";

const ICON: &str = "MOTION";

/// Builds a submenu per motion group: a random pick plus every motion
pub struct ActionSelect {
    actions: BehaviorTable<MenuAction<Self>>,
    icon: String,
}

impl ActionSelect {
    pub fn new(icon: &str) -> Self {
        Self {
            actions: BehaviorTable::<MenuAction<Self>>::new()
                .with("stop_all_motions", Self::stop_all_motions)
                .with("random_motion", Self::random_motion)
                .with("start_motion", Self::start_motion),
            icon: icon_or(icon, ICON).to_string(),
        }
    }

    fn stop_all_motions(
        &mut self,
        host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        host.model().stop_all_motions();
        Ok(ActionOutput::Done)
    }

    /// Parameter: motion group name
    fn random_motion(
        &mut self,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        if host.model().start_random_motion(parameter, PRIORITY_FORCE) {
            Ok(ActionOutput::Done)
        } else {
            Err(PluginError::Failed(format!("no motion in group `{}`", parameter)))
        }
    }

    /// Parameter: `group:index`
    fn start_motion(
        &mut self,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        let (group, index) = parameter
            .rsplit_once(':')
            .and_then(|(g, i)| i.parse::<usize>().ok().map(|i| (g, i)))
            .ok_or_else(|| PluginError::InvalidParameter {
                parameter: parameter.to_string(),
                reason: "expected group:index".into(),
            })?;

        if host.model().start_motion(group, index, PRIORITY_FORCE) {
            Ok(ActionOutput::Done)
        } else {
            Err(PluginError::Failed(format!("no motion {} in group `{}`", index, group)))
        }
    }
}

impl Plugin for ActionSelect {}

impl MenuPlugin for ActionSelect {
    fn has_action(&self, function_name: &str) -> bool {
        self.actions.contains(function_name)
    }

    fn execute(
        &mut self,
        function_name: &str,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        let action = self.actions.lookup(function_name)?;
        action(self, host, parameter)
    }

    fn create_custom_menu(&mut self, host: &mut dyn HostContext, menu: &mut MenuSection) -> bool {
        let icon = self.icon.as_str();
        menu.action("Stop all motions", icon, "stop_all_motions", "")
            .separator();

        for group in host.model().motion_groups() {
            menu.submenu(&group.name, icon, |sub| {
                sub.action("Random motion", icon, "random_motion", &group.name)
                    .separator();
                for (index, motion) in group.motions.iter().enumerate() {
                    sub.action(motion, icon, "start_motion", &format!("{}:{}", group.name, index));
                }
            });
        }
        true
    }
}

pub fn create(_: &PluginDescriptor, config: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(ActionSelect::new(&config.plugin.icon))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuCommand, MenuEntry};
    use crate::model::PetModel;
    use crate::pet::PetWindow;
    use std::path::Path;

    const MODEL: &str = r#"{
        "FileReferences": {
            "Motions": {
                "Idle": [ { "Name": "breathe", "File": "idle.motion3.json" } ],
                "Tap": [
                    { "Name": "wave", "File": "wave.motion3.json" },
                    { "Name": "bow", "File": "bow.motion3.json" }
                ]
            }
        }
    }"#;

    fn pet() -> PetWindow {
        let model = PetModel::from_json(Path::new("Pet.model3.json"), MODEL).unwrap();
        PetWindow::new(&Default::default(), model)
    }

    #[test]
    fn test_menu_layout() {
        let mut pet = pet();
        let mut menu = MenuSection::new(NAME, "Motions");
        assert!(ActionSelect::new("").create_custom_menu(&mut pet, &mut menu));

        let entries = menu.entries();
        // stop, separator, one submenu per group
        assert_eq!(entries.len(), 4);
        match &entries[3] {
            MenuEntry::Submenu { label, entries, .. } => {
                assert_eq!(label, "Tap");
                assert_eq!(entries.len(), 4);
                match &entries[3] {
                    MenuEntry::Item(item) => {
                        assert_eq!(item.label, "bow");
                        assert_eq!(
                            item.command,
                            MenuCommand::Plugin {
                                plugin: NAME.into(),
                                function: "start_motion".into(),
                                parameter: "Tap:1".into(),
                            }
                        );
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_start_and_stop() {
        let mut pet = pet();
        let mut plugin = ActionSelect::new("");

        plugin.execute("start_motion", &mut pet, "Tap:1").unwrap();
        assert_eq!(pet.pet_model().active_motion().unwrap().index, 1);

        plugin.execute("stop_all_motions", &mut pet, "").unwrap();
        assert!(pet.pet_model().active_motion().is_none());

        plugin.execute("random_motion", &mut pet, "Idle").unwrap();
        assert_eq!(pet.pet_model().active_motion().unwrap().group, "Idle");
    }

    #[test]
    fn test_bad_parameters() {
        let mut pet = pet();
        let mut plugin = ActionSelect::new("");
        assert!(matches!(
            plugin.execute("start_motion", &mut pet, "Tap"),
            Err(PluginError::InvalidParameter { .. })
        ));
        assert!(matches!(
            plugin.execute("start_motion", &mut pet, "Tap:9"),
            Err(PluginError::Failed(_))
        ));
        assert!(plugin.execute("random_motion", &mut pet, "Nope").is_err());
    }
}
