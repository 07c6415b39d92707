/*
 *  app.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  The running pet: configuration, plugins, window and frame loop
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

use std::io;
use std::time::Instant;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::{ConfigError, ConfigStore};
use crate::console::{ConsoleCommand, HELP};
use crate::menu::{MenuCommand, TrayMenu};
use crate::model::PetModel;
use crate::pacer::Pacer;
use crate::pet::PetWindow;
use crate::plugin::{
    find_admitted, ActionOutput, DispatchError, HostContext, PluginDescriptor, PluginManager,
    PluginReport,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("no plugin named `{0}` in the configuration")]
    UnknownPlugin(String),

    #[error("the tray menu has no item {0}")]
    NoSuchItem(usize),

    #[error("signal handler: {0}")]
    Signal(#[from] io::Error),
}

/// Owns everything a running pet needs
pub struct PetApp {
    store: ConfigStore,
    manager: PluginManager,
    pet: PetWindow,
    pacer: Pacer,
    frames: u64,
    overrun_warned: bool,
}

impl PetApp {
    pub fn new(store: ConfigStore, manager: PluginManager) -> Self {
        let config = store.effective();
        let model = match PetModel::load(&config.model.model_path) {
            Ok(model) => model,
            Err(e) => {
                warn!("{}, continuing without motions or expressions", e);
                PetModel::empty(&config.model.model_path)
            }
        };

        Self {
            pet: PetWindow::new(&config, model),
            pacer: Pacer::new(config.animation.fps),
            store,
            manager,
            frames: 0,
            overrun_warned: false,
        }
    }

    /// Resolve plugins ahead of time when configured, then run init hooks
    pub fn bootstrap(&mut self) {
        if self.store.effective().animation.prewarm_plugins {
            self.manager.prewarm(self.store.plugins());
        }
        self.manager.dispatch_init(self.store.plugins(), &mut self.pet);
    }

    /// One frame: lasting plugins in list order, then the model
    pub fn tick(&mut self) {
        let started = Instant::now();

        self.manager.dispatch_lasting(self.store.plugins(), &mut self.pet);
        let scale = self.store.effective().model.scale;
        self.pet.pet_model_mut().update(scale);
        self.frames += 1;

        if let Some(interval) = self.pet.take_interval_change() {
            info!("Frame interval changed to {:?}", interval);
            self.pacer.set_interval(interval);
        }

        self.pacer.record_frame(started.elapsed());
        if self.pacer.is_overrunning() {
            if !self.overrun_warned {
                warn!(
                    "Frame work averages {:.1}ms, over the {:?} interval",
                    self.pacer.average_frame_ms(),
                    self.pacer.interval()
                );
                self.overrun_warned = true;
            }
        } else {
            self.overrun_warned = false;
        }
    }

    /// The tray menu as it would be shown right now
    pub fn tray_menu(&mut self) -> TrayMenu {
        TrayMenu::build(self.manager.menu_sections(self.store.plugins(), &mut self.pet))
    }

    /// Click tray item `index` (1-based, see [`TrayMenu::items`])
    pub fn activate(&mut self, index: usize) -> Result<Option<String>, AppError> {
        let command = self
            .tray_menu()
            .command(index)
            .cloned()
            .ok_or(AppError::NoSuchItem(index))?;

        match command {
            MenuCommand::Plugin { plugin, function, parameter } => {
                let output = self.invoke(&plugin, &function, &parameter)?;
                Ok(match output {
                    ActionOutput::Done => None,
                    ActionOutput::Message(text) => Some(text),
                })
            }
            MenuCommand::ManagePlugins => Ok(Some(self.report_text())),
            MenuCommand::About => Ok(Some(format!(
                "{} {}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION")
            ))),
            MenuCommand::Settings => Ok(Some(format!(
                "settings are kept in {}",
                self.store.path().display()
            ))),
            MenuCommand::Quit => {
                self.pet.quit();
                Ok(None)
            }
        }
    }

    /// Call a menu plugin's behaviour by name
    ///
    /// The descriptor admitted under `plugin` is used, the same one the
    /// tray shows.
    pub fn invoke(
        &mut self,
        plugin: &str,
        function: &str,
        parameter: &str,
    ) -> Result<ActionOutput, AppError> {
        let plugins = self.store.plugins();
        let index = find_admitted(plugins, plugin)
            .ok_or_else(|| AppError::UnknownPlugin(plugin.to_string()))?;
        let descriptor = &plugins[index];

        Ok(self
            .manager
            .dispatch_menu(descriptor, function, &mut self.pet, parameter)?)
    }

    /// Flip the `enabled` flag of the descriptor admitted under `plugin` and
    /// persist it; takes effect on the next dispatch
    pub fn set_enabled(&mut self, plugin: &str, enabled: bool) -> Result<(), AppError> {
        let index = find_admitted(self.store.plugins(), plugin)
            .ok_or_else(|| AppError::UnknownPlugin(plugin.to_string()))?;
        self.store.update(|config| {
            if let Some(d) = config.plugins.get_mut(index) {
                d.enabled = enabled;
            }
        })?;
        info!("Plugin {} {}", plugin, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Re-read the configuration; cached plugins are kept
    pub fn reload(&mut self) -> Result<(), AppError> {
        self.store.reload()?;
        self.pacer.set_fps(self.store.effective().animation.fps);
        Ok(())
    }

    pub fn plugin_report(&self) -> Vec<PluginReport> {
        self.manager.report(self.store.plugins())
    }

    fn report_text(&self) -> String {
        let lines: Vec<String> = self.plugin_report().iter().map(|r| r.to_string()).collect();
        if lines.is_empty() {
            "no plugins configured".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn should_quit(&self) -> bool {
        self.pet.quit_requested()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pet(&self) -> &PetWindow {
        &self.pet
    }

    pub fn pet_mut(&mut self) -> &mut PetWindow {
        &mut self.pet
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    pub fn descriptors(&self) -> &[PluginDescriptor] {
        self.store.plugins()
    }

    /// Handle one console line; returns text to show the user
    pub fn handle(&mut self, command: ConsoleCommand) -> Result<Option<String>, AppError> {
        match command {
            ConsoleCommand::Menu => Ok(Some(self.tray_menu().to_string())),
            ConsoleCommand::Activate(index) => self.activate(index),
            ConsoleCommand::Invoke { plugin, function, parameter } => {
                match self.invoke(&plugin, &function, &parameter)? {
                    ActionOutput::Done => Ok(None),
                    ActionOutput::Message(text) => Ok(Some(text)),
                }
            }
            ConsoleCommand::Enable(plugin) => self.set_enabled(&plugin, true).map(|_| None),
            ConsoleCommand::Disable(plugin) => self.set_enabled(&plugin, false).map(|_| None),
            ConsoleCommand::Reload => self.reload().map(|_| None),
            ConsoleCommand::Plugins => Ok(Some(self.report_text())),
            ConsoleCommand::Cursor(x, y) => {
                self.pet.set_cursor(x, y);
                Ok(None)
            }
            ConsoleCommand::Quit => {
                self.pet.quit();
                Ok(None)
            }
            ConsoleCommand::Help => Ok(Some(HELP.to_string())),
        }
    }

    /// Release every plugin and remember where the window was
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        self.manager.shutdown();

        let (x, y) = self.pet.position();
        let window = &self.store.document().window;
        if window.remember_position && (window.x, window.y) != (x, y) {
            self.store.update(|config| {
                config.window.x = x;
                config.window.y = y;
            })?;
            debug!("Saved window position {},{}", x, y);
        }
        info!("Shut down after {} frame(s)", self.frames);
        Ok(())
    }

    /// Frame loop until quit, a signal, or `limit` frames
    pub async fn run(&mut self, limit: Option<u64>, console: bool) -> Result<(), AppError> {
        let mut lines = console.then(|| BufReader::new(tokio::io::stdin()).lines());
        if lines.is_some() {
            println!("{}", HELP);
        }

        let signal = shutdown_signal();
        tokio::pin!(signal);

        loop {
            if self.should_quit() || limit.is_some_and(|n| self.frames >= n) {
                break;
            }

            let deadline = tokio::time::Instant::from_std(self.pacer.next_deadline());
            tokio::select! {
                received = &mut signal => {
                    received?;
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    if self.pacer.should_tick() {
                        self.tick();
                    }
                }
                line = next_line(&mut lines) => match line {
                    Some(line) => self.console_line(&line),
                    None => {
                        debug!("Console closed");
                        lines = None;
                    }
                }
            }
        }

        Ok(())
    }

    fn console_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match line.parse::<ConsoleCommand>() {
            Ok(command) => match self.handle(command) {
                Ok(Some(text)) => println!("{}", text),
                Ok(None) => {}
                Err(e) => error!("{}", e),
            },
            Err(e) => println!("{}", e),
        }
    }
}

/// Next stdin line; never resolves once the console is closed
async fn next_line(lines: &mut Option<Lines<BufReader<Stdin>>>) -> Option<String> {
    match lines {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received. Initiating graceful shutdown."),
        _ = sigterm.recv() => info!("SIGTERM received. Initiating graceful shutdown."),
        _ = sighup.recv() => info!("SIGHUP received. Initiating graceful shutdown."),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}
