/*
 *  plugins/countdown_timer.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Countdown timers started from the tray
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

use std::time::{Duration, Instant};

use log::info;

use crate::menu::MenuSection;
use crate::plugin::{
    ActionOutput, BehaviorTable, HostContext, MenuAction, MenuPlugin, Plugin, PluginDescriptor,
    PluginError, PluginInstance, PluginLocalConfig,
};

pub const NAME: &str = "CountdownTimer";

pub struct CountdownTimer {
    actions: BehaviorTable<MenuAction<Self>>,
    state: Countdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Countdown {
    Idle,
    Running { deadline: Instant },
    Paused { left: Duration },
}

/// Title shown when a countdown runs out
pub const FINISHED_TITLE: &str = "Countdown finished";

/// `HH:MM:SS`
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Seconds from `90`, `01:30` or `00:01:30`
pub fn parse_duration(text: &str) -> Result<u64, PluginError> {
    let invalid = |reason: &str| PluginError::InvalidParameter {
        parameter: text.to_string(),
        reason: reason.to_string(),
    };

    let mut total = 0u64;
    let fields: Vec<&str> = text.trim().split(':').collect();
    if fields.len() > 3 {
        return Err(invalid("expected seconds, MM:SS or HH:MM:SS"));
    }
    for field in fields {
        let value: u64 = field
            .trim()
            .parse()
            .map_err(|_| invalid("not a number"))?;
        total = total
            .checked_mul(60)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| invalid("duration too long"))?;
    }

    if total == 0 {
        return Err(invalid("duration must be positive"));
    }
    Ok(total)
}

fn round_up_secs(left: Duration) -> u64 {
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            actions: BehaviorTable::<MenuAction<Self>>::new()
                .with("start_countdown", Self::start_countdown)
                .with("custom_countdown", Self::start_countdown)
                .with("remaining", Self::remaining)
                .with("pause", Self::pause)
                .with("resume", Self::resume)
                .with("cancel", Self::cancel),
            state: Countdown::Idle,
        }
    }

    /// Seconds left, rounded up; zero when idle or finished
    pub fn remaining_seconds(&self) -> u64 {
        match self.state {
            Countdown::Idle => 0,
            Countdown::Running { deadline } => {
                round_up_secs(deadline.saturating_duration_since(Instant::now()))
            }
            Countdown::Paused { left } => round_up_secs(left),
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, Countdown::Paused { .. })
    }

    /// Announce a countdown that ran out and go idle; true when it did
    fn finish_if_due(&mut self, host: &mut dyn HostContext) -> bool {
        let Countdown::Running { deadline } = self.state else {
            return false;
        };
        if deadline > Instant::now() {
            return false;
        }

        self.state = Countdown::Idle;
        info!("Countdown finished");
        host.set_visible(true);
        host.raise();
        host.set_title(FINISHED_TITLE);
        true
    }

    fn start_countdown(
        &mut self,
        _host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        let seconds = parse_duration(parameter)?;
        let deadline = Instant::now()
            .checked_add(Duration::from_secs(seconds))
            .ok_or_else(|| PluginError::InvalidParameter {
                parameter: parameter.to_string(),
                reason: "duration too long".into(),
            })?;
        self.state = Countdown::Running { deadline };
        info!("Countdown of {} started", format_hms(seconds));
        Ok(ActionOutput::Message(format!("countdown {} started", format_hms(seconds))))
    }

    fn remaining(
        &mut self,
        host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        if self.finish_if_due(host) {
            return Ok(ActionOutput::Message("countdown finished".into()));
        }
        let left = format_hms(self.remaining_seconds());
        Ok(ActionOutput::Message(if self.is_paused() {
            format!("{} (paused)", left)
        } else {
            left
        }))
    }

    fn pause(
        &mut self,
        host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        if self.finish_if_due(host) {
            return Ok(ActionOutput::Message("countdown finished".into()));
        }
        match self.state {
            Countdown::Running { deadline } => {
                let left = deadline.saturating_duration_since(Instant::now());
                self.state = Countdown::Paused { left };
                info!("Countdown paused with {} left", format_hms(round_up_secs(left)));
                Ok(ActionOutput::Message(format!(
                    "countdown paused at {}",
                    format_hms(round_up_secs(left))
                )))
            }
            Countdown::Paused { .. } => Ok(ActionOutput::Done),
            Countdown::Idle => Err(PluginError::Failed("no countdown is running".into())),
        }
    }

    fn resume(
        &mut self,
        _host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        match self.state {
            Countdown::Paused { left } => {
                let deadline = Instant::now()
                    .checked_add(left)
                    .ok_or_else(|| PluginError::Failed("duration too long".into()))?;
                self.state = Countdown::Running { deadline };
                info!("Countdown resumed");
                Ok(ActionOutput::Message(format!(
                    "countdown resumed at {}",
                    format_hms(round_up_secs(left))
                )))
            }
            Countdown::Running { .. } => Ok(ActionOutput::Done),
            Countdown::Idle => Err(PluginError::Failed("no countdown is paused".into())),
        }
    }

    fn cancel(
        &mut self,
        _host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        Ok(match std::mem::replace(&mut self.state, Countdown::Idle) {
            Countdown::Idle => ActionOutput::Done,
            _ => ActionOutput::Message("countdown cancelled".into()),
        })
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for CountdownTimer {
    fn cleanup(&mut self) {
        self.state = Countdown::Idle;
    }
}

impl MenuPlugin for CountdownTimer {
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

    /// Checks for a finished countdown whenever the tray is opened; the
    /// entries themselves come from `[[menu]]`
    fn create_custom_menu(&mut self, host: &mut dyn HostContext, _menu: &mut MenuSection) -> bool {
        self.finish_if_due(host);
        false
    }
}

pub fn create(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(CountdownTimer::new())))
}
