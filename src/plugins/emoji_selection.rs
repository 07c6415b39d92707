/*
 *  plugins/emoji_selection.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Switch model expressions from the tray
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

use super::icon_or;

pub const NAME: &str = "EmojiSelection";

const ICON: &str = "EXPRESSION";

pub struct EmojiSelection {
    actions: BehaviorTable<MenuAction<Self>>,
    icon: String,
}

impl EmojiSelection {
    pub fn new(icon: &str) -> Self {
        Self {
            actions: BehaviorTable::<MenuAction<Self>>::new()
                .with("reset_expression", Self::reset_expression)
                .with("set_expression", Self::set_expression),
            icon: icon_or(icon, ICON).to_string(),
        }
    }

    fn reset_expression(
        &mut self,
        host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        host.model().reset_expression();
        Ok(ActionOutput::Done)
    }

    /// Parameter: expression id
    fn set_expression(
        &mut self,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        if host.model().set_expression(parameter) {
            Ok(ActionOutput::Done)
        } else {
            Err(PluginError::InvalidParameter {
                parameter: parameter.to_string(),
                reason: "unknown expression".into(),
            })
        }
    }
}

impl Plugin for EmojiSelection {}

impl MenuPlugin for EmojiSelection {
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
        menu.action("Reset expression", "REMOVE", "reset_expression", "")
            .separator();
        for id in host.model().expression_ids() {
            menu.action(&id, &self.icon, "set_expression", &id);
        }
        true
    }
}

pub fn create(_: &PluginDescriptor, config: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(EmojiSelection::new(&config.plugin.icon))))
}
