/*
 *  plugins/visibility_toggle.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Show or hide the pet from the tray
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
use crate::plugin::{
    ActionOutput, BehaviorTable, HostContext, MenuAction, MenuPlugin, Plugin, PluginDescriptor,
    PluginError, PluginInstance, PluginLocalConfig,
};

pub const NAME: &str = "VisibilityToggle";

pub struct VisibilityToggle {
    actions: BehaviorTable<MenuAction<Self>>,
}

impl VisibilityToggle {
    pub fn new() -> Self {
        Self {
            actions: BehaviorTable::<MenuAction<Self>>::new()
                .with("toggle_visibility", Self::toggle_visibility),
        }
    }

    fn toggle_visibility(
        &mut self,
        host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        if host.is_visible() {
            host.set_visible(false);
            Ok(ActionOutput::Message("pet hidden".into()))
        } else {
            host.set_visible(true);
            host.raise();
            Ok(ActionOutput::Message("pet shown".into()))
        }
    }
}

impl Default for VisibilityToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for VisibilityToggle {}

impl MenuPlugin for VisibilityToggle {
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

    /// A single entry whose label follows the current visibility
    fn create_custom_menu(&mut self, host: &mut dyn HostContext, menu: &mut MenuSection) -> bool {
        let (label, icon) = if host.is_visible() {
            ("Hide pet", "VIEW")
        } else {
            ("Show pet", "HIDE")
        };
        menu.action(label, icon, "toggle_visibility", "");
        true
    }
}

pub fn create(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(VisibilityToggle::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuCommand, MenuEntry};
    use crate::pet::PetWindow;

    fn label_of(section: &MenuSection) -> String {
        match &section.entries()[0] {
            MenuEntry::Item(item) => item.label.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut pet = PetWindow::headless();
        let mut plugin = VisibilityToggle::new();

        plugin.execute("toggle_visibility", &mut pet, "").unwrap();
        assert!(!pet.is_visible());

        let mut menu = MenuSection::new(NAME, "Visibility");
        assert!(plugin.create_custom_menu(&mut pet, &mut menu));
        assert_eq!(label_of(&menu), "Show pet");

        plugin.execute("toggle_visibility", &mut pet, "").unwrap();
        assert!(pet.is_visible());
        assert_eq!(pet.raise_count(), 1);
    }

    #[test]
    fn test_menu_item_targets_toggle() {
        let mut pet = PetWindow::headless();
        let mut menu = MenuSection::new(NAME, "Visibility");
        VisibilityToggle::new().create_custom_menu(&mut pet, &mut menu);

        match &menu.entries()[0] {
            MenuEntry::Item(item) => {
                assert_eq!(item.label, "Hide pet");
                assert!(matches!(
                    &item.command,
                    MenuCommand::Plugin { function, .. } if function == "toggle_visibility"
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action() {
        let mut pet = PetWindow::headless();
        let err = VisibilityToggle::new().execute("fly", &mut pet, "").unwrap_err();
        assert_eq!(err, PluginError::NoSuchAction("fly".into()));
    }
}
