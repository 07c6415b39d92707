/*
 *  plugins/quick_start.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Launch configured programs from the tray
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

use std::process::{Child, Command};

use log::{debug, info};

use crate::plugin::{
    ActionOutput, BehaviorTable, HostContext, MenuAction, MenuPlugin, Plugin, PluginDescriptor,
    PluginError, PluginInstance, PluginLocalConfig,
};

pub const NAME: &str = "QuickStart";

/// Menu entries come from `[[menu]]` in the plugin's `config.toml`; each
/// entry's `menu_parameter` is the command line to launch, split with
/// shell quoting rules.
pub struct QuickStart {
    actions: BehaviorTable<MenuAction<Self>>,

    /// Launched programs not yet reaped
    children: Vec<Child>,
}

impl QuickStart {
    pub fn new() -> Self {
        Self {
            actions: BehaviorTable::<MenuAction<Self>>::new()
                .with("execute_command", Self::execute_command),
            children: Vec::new(),
        }
    }

    /// Collect the exit status of programs that have finished
    fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Launched program {} exited: {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                debug!("Cannot poll launched program {}: {}", child.id(), e);
                false
            }
        });
    }

    /// Programs launched and still running
    pub fn running(&mut self) -> usize {
        self.reap();
        self.children.len()
    }

    fn execute_command(
        &mut self,
        _host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        self.reap();

        let invalid = |reason: &str| PluginError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        };
        let words = shlex::split(parameter).ok_or_else(|| invalid("unbalanced quotes"))?;
        let (program, args) = words.split_first().ok_or_else(|| invalid("empty command line"))?;

        let child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|e| PluginError::Failed(format!("cannot start `{}`: {}", program, e)))?;

        info!("Started {} (pid {})", program, child.id());
        self.children.push(child);
        Ok(ActionOutput::Message(format!("started {}", program)))
    }
}

impl Default for QuickStart {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for QuickStart {
    fn cleanup(&mut self) {
        self.reap();
        if !self.children.is_empty() {
            debug!("{} launched program(s) still running", self.children.len());
        }
    }
}

impl MenuPlugin for QuickStart {
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
}

pub fn create(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(QuickStart::new())))
}
