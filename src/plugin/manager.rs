/*
 *  plugin/manager.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin manager - resolves, caches and dispatches plugins
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

//! The plugin manager turns descriptors into live plugins exactly once per
//! name and is the only caller of plugin code.
//!
//! Each plugin name owns one cache slot. A name that is not in the map has
//! not been resolved yet; once resolved the slot is either `Ready` or
//! `Failed` for the rest of the run. Failures are logged when the slot is
//! filled, so repeated dispatches neither log again nor touch the disk.
//!
//! Descriptors are never cached. `enabled`, duplicate and validity checks
//! run on every dispatch against the list the caller passes in.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, error, info, warn};

use super::contract::{guarded, ActionOutput, PluginError, PluginInstance};
use super::descriptor::{DescriptorError, PluginDescriptor, PluginRole};
use super::error::{DispatchError, FailureReason, LoadError};
use super::host::HostContext;
use super::loader::{DiskSource, PluginSource};
use super::local_config::PluginLocalConfig;
use super::registry::PluginRegistry;
use crate::menu::MenuSection;

/// A resolved, initialized plugin
pub struct ReadySlot {
    pub instance: PluginInstance,

    /// Role the plugin is dispatched as; `Unknown` when the instance does
    /// not provide the role its descriptor declares
    pub role: PluginRole,

    pub local: PluginLocalConfig,

    /// Init plugins: entry point already run
    pub init_ran: bool,
}

enum SlotState {
    Ready(ReadySlot),
    Failed(FailureReason),
}

/// How a descriptor fares against the admission checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Active,
    Disabled,
    Duplicate,
    Invalid(DescriptorError),
}

/// Check every descriptor; the first valid descriptor with a name wins
pub fn admit(descriptors: &[PluginDescriptor]) -> Vec<(&PluginDescriptor, Admission)> {
    let mut seen: HashSet<&str> = HashSet::new();

    descriptors
        .iter()
        .map(|d| {
            let admission = if let Err(e) = d.validate() {
                Admission::Invalid(e)
            } else if !seen.insert(d.name.as_str()) {
                Admission::Duplicate
            } else if !d.enabled {
                Admission::Disabled
            } else {
                Admission::Active
            };
            (d, admission)
        })
        .collect()
}

/// Index of the descriptor that speaks for `name`
///
/// That is the first one passing validation, the same entry `admit` lets
/// through. Falls back to the first entry with the name when none is valid.
pub fn find_admitted(descriptors: &[PluginDescriptor], name: &str) -> Option<usize> {
    descriptors
        .iter()
        .position(|d| d.name == name && d.validate().is_ok())
        .or_else(|| descriptors.iter().position(|d| d.name == name))
}

/// Observable state of one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    Unresolved,
    Ready(PluginRole),
    RoleMismatch { provided: PluginRole },
    Failed { category: &'static str, reason: String },
    Disabled,
    Duplicate,
    Invalid(String),
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginState::Unresolved => write!(f, "not loaded"),
            PluginState::Ready(role) => write!(f, "ready ({})", role),
            PluginState::RoleMismatch { provided } => write!(f, "role mismatch (provides {})", provided),
            PluginState::Failed { reason, .. } => write!(f, "failed: {}", reason),
            PluginState::Disabled => write!(f, "disabled"),
            PluginState::Duplicate => write!(f, "skipped: duplicate name"),
            PluginState::Invalid(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

/// One line of the plugin report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    pub name: String,
    pub label: String,
    pub declared: PluginRole,
    pub state: PluginState,
}

impl fmt::Display for PluginReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<18} {:<8} {}", self.name, self.declared.as_str(), self.state)
    }
}

/// Sole owner of plugin instances
pub struct PluginManager {
    source: Box<dyn PluginSource>,
    slots: HashMap<String, SlotState>,

    /// Descriptor problems already logged
    reported: HashSet<String>,
}

impl PluginManager {
    pub fn new(source: impl PluginSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            slots: HashMap::new(),
            reported: HashSet::new(),
        }
    }

    /// Manager over plugin directories on disk and the built-in registry
    pub fn with_defaults() -> Self {
        Self::new(DiskSource::new(PluginRegistry::with_builtins()))
    }

    /// Descriptors that pass admission, optionally restricted to one role,
    /// in list order. Skipped entries are logged once.
    pub fn active<'a>(
        &mut self,
        descriptors: &'a [PluginDescriptor],
        role: Option<PluginRole>,
    ) -> Vec<&'a PluginDescriptor> {
        let mut active = Vec::new();

        for (index, (d, admission)) in admit(descriptors).into_iter().enumerate() {
            match admission {
                Admission::Active => {
                    if role.is_none_or(|r| r == d.role) {
                        active.push(d);
                    }
                }
                Admission::Disabled => {}
                Admission::Duplicate => {
                    self.report_once(format!("duplicate:{}", d.name), || {
                        format!("Skipping duplicate plugin entry `{}`, the first one wins", d.name)
                    });
                }
                Admission::Invalid(e) => {
                    self.report_once(format!("invalid:{}:{}", index, d.name), || {
                        format!("Skipping plugin entry #{}: {}", index + 1, e)
                    });
                }
            }
        }

        active
    }

    fn report_once(&mut self, key: String, message: impl FnOnce() -> String) {
        if self.reported.insert(key) {
            warn!("{}", message());
        }
    }

    /// Get or create the plugin for `descriptor`
    ///
    /// `None` when the plugin is unavailable for this run; the reason was
    /// logged when the slot was filled.
    pub fn resolve(&mut self, descriptor: &PluginDescriptor) -> Option<&mut ReadySlot> {
        let slot = match self.slots.entry(descriptor.name.clone()) {
            Entry::Occupied(entry) => {
                debug!("Plugin {} served from cache", descriptor.name);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(create_slot(self.source.as_mut(), descriptor)),
        };

        match slot {
            SlotState::Ready(ready) => Some(ready),
            SlotState::Failed(_) => None,
        }
    }

    /// The cached instance for `descriptor`, creating it on first use
    pub fn instance(&mut self, descriptor: &PluginDescriptor) -> Option<&mut PluginInstance> {
        self.resolve(descriptor).map(|slot| &mut slot.instance)
    }

    /// Whether a name has a slot, ready or failed
    pub fn is_resolved(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Failure recorded for a name, if any
    pub fn failure(&self, name: &str) -> Option<&FailureReason> {
        match self.slots.get(name) {
            Some(SlotState::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    /// Resolve every active descriptor ahead of the first frame
    ///
    /// Init entry points are not run. Returns the number of ready plugins.
    pub fn prewarm(&mut self, descriptors: &[PluginDescriptor]) -> usize {
        let mut ready = 0;
        for d in self.active(descriptors, None) {
            if self.resolve(d).is_some() {
                ready += 1;
            }
        }
        info!("Pre-warmed {} plugin(s)", ready);
        ready
    }

    /// Invoke a named behaviour of a menu plugin
    pub fn dispatch_menu(
        &mut self,
        descriptor: &PluginDescriptor,
        function_name: &str,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, DispatchError> {
        descriptor.validate()?;
        let name = descriptor.name.as_str();

        if !descriptor.enabled {
            return Err(DispatchError::Disabled(name.to_string()));
        }
        if descriptor.role != PluginRole::Menu {
            return Err(DispatchError::NotMenu {
                name: name.to_string(),
                declared: descriptor.role,
            });
        }

        let plugin = match self.resolve(descriptor) {
            None => return Err(DispatchError::Unavailable(name.to_string())),
            Some(ReadySlot {
                instance: PluginInstance::Menu(plugin),
                role: PluginRole::Menu,
                ..
            }) => plugin,
            Some(_) => return Err(DispatchError::RoleMismatch(name.to_string())),
        };

        debug!("Menu {}::{}({:?})", name, function_name, parameter);

        match guarded(|| plugin.execute(function_name, host, parameter)).and_then(|r| r) {
            Ok(output) => Ok(output),
            Err(PluginError::NoSuchAction(function)) => {
                warn!("Plugin {} (menu) has no function `{}`", name, function);
                Err(DispatchError::NoSuchAction {
                    name: name.to_string(),
                    function,
                })
            }
            Err(e) => {
                error!("Plugin {} (menu) {} failed: {}", name, function_name, e);
                Err(DispatchError::Invocation {
                    name: name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Per-frame update of every active lasting plugin, in list order
    ///
    /// A plugin whose update fails or panics is quarantined for the rest of
    /// the run; the remaining plugins still run this frame.
    pub fn dispatch_lasting(&mut self, descriptors: &[PluginDescriptor], host: &mut dyn HostContext) {
        for d in self.active(descriptors, Some(PluginRole::Lasting)) {
            let outcome = match self.resolve(d) {
                Some(ReadySlot {
                    instance: PluginInstance::Lasting(plugin),
                    role: PluginRole::Lasting,
                    ..
                }) => guarded(|| plugin.update(host)).and_then(|r| r),
                _ => continue,
            };

            if let Err(e) = outcome {
                error!("Plugin {} (lasting) update failed, disabled for this run: {}", d.name, e);
                self.quarantine(&d.name, FailureReason::UpdateFailed(e));
            }
        }
    }

    /// Run the entry point of every active init plugin, in list order
    ///
    /// Each entry point runs at most once per process; later calls skip
    /// plugins that already ran.
    pub fn dispatch_init(&mut self, descriptors: &[PluginDescriptor], host: &mut dyn HostContext) {
        for d in self.active(descriptors, Some(PluginRole::Init)) {
            let entry = d.entry_point();

            let outcome = match self.resolve(d) {
                Some(ReadySlot {
                    instance: PluginInstance::Init(plugin),
                    role: PluginRole::Init,
                    init_ran,
                    ..
                }) => {
                    if *init_ran {
                        debug!("Plugin {} (init) already ran", d.name);
                        continue;
                    }
                    *init_ran = true;
                    guarded(|| plugin.run_entry(entry, host)).and_then(|r| r)
                }
                _ => continue,
            };

            match outcome {
                Ok(()) => info!("Plugin {} (init) ran {}", d.name, entry),
                Err(e) => {
                    error!("Plugin {} (init) {} failed: {}", d.name, entry, e);
                    self.quarantine(&d.name, FailureReason::EntryFailed(e));
                }
            }
        }
    }

    /// Tray section of one menu plugin
    ///
    /// The plugin's custom menu hook runs first; when it reports the
    /// section handled, the declarative `[[menu]]` entries are not used.
    pub fn menu_section(
        &mut self,
        descriptor: &PluginDescriptor,
        host: &mut dyn HostContext,
    ) -> Option<MenuSection> {
        if !descriptor.enabled || descriptor.role != PluginRole::Menu || descriptor.validate().is_err() {
            return None;
        }

        let label = descriptor.label().to_string();
        let name = descriptor.name.as_str();

        let failure = {
            let ReadySlot {
                instance: PluginInstance::Menu(plugin),
                role: PluginRole::Menu,
                local,
                ..
            } = self.resolve(descriptor)?
            else {
                return None;
            };

            let mut custom = MenuSection::new(name, &label).with_icon(&local.plugin.icon);
            match guarded(|| plugin.create_custom_menu(host, &mut custom)) {
                Ok(true) => return Some(custom),
                Ok(false) => {
                    let mut section = MenuSection::new(name, &label).with_icon(&local.plugin.icon);
                    for entry in local.menu_entries() {
                        section.action(
                            &entry.menu_name,
                            &entry.menu_icon,
                            &entry.function_name,
                            &entry.menu_parameter,
                        );
                    }
                    return Some(section);
                }
                Err(e) => e,
            }
        };

        self.report_once(format!("menu-hook:{}", name), || {
            format!("Plugin {} (menu) menu hook failed, section left out: {}", name, failure)
        });
        None
    }

    /// Sections of every active menu plugin, in list order
    pub fn menu_sections(
        &mut self,
        descriptors: &[PluginDescriptor],
        host: &mut dyn HostContext,
    ) -> Vec<MenuSection> {
        self.active(descriptors, Some(PluginRole::Menu))
            .into_iter()
            .filter_map(|d| self.menu_section(d, host))
            .collect()
    }

    /// State of every descriptor, without resolving anything
    pub fn report(&self, descriptors: &[PluginDescriptor]) -> Vec<PluginReport> {
        admit(descriptors)
            .into_iter()
            .map(|(d, admission)| {
                let state = match admission {
                    Admission::Invalid(e) => PluginState::Invalid(e.to_string()),
                    Admission::Duplicate => PluginState::Duplicate,
                    Admission::Disabled => PluginState::Disabled,
                    Admission::Active => match self.slots.get(&d.name) {
                        None => PluginState::Unresolved,
                        Some(SlotState::Failed(reason)) => PluginState::Failed {
                            category: reason.category(),
                            reason: reason.to_string(),
                        },
                        Some(SlotState::Ready(ready)) if ready.role == PluginRole::Unknown => {
                            PluginState::RoleMismatch {
                                provided: ready.instance.role(),
                            }
                        }
                        Some(SlotState::Ready(ready)) => PluginState::Ready(ready.role),
                    },
                };
                PluginReport {
                    name: d.name.clone(),
                    label: d.label().to_string(),
                    declared: d.role,
                    state,
                }
            })
            .collect()
    }

    /// Run every ready plugin's cleanup hook and release all instances
    pub fn shutdown(&mut self) {
        for (name, slot) in self.slots.drain() {
            if let SlotState::Ready(mut ready) = slot {
                debug!("Cleaning up plugin {}", name);
                if let Err(e) = guarded(|| ready.instance.cleanup()) {
                    error!("Plugin {} cleanup failed: {}", name, e);
                }
            }
        }
        info!("Plugin manager shut down");
    }

    /// Replace a ready slot with a failure, releasing the instance
    fn quarantine(&mut self, name: &str, reason: FailureReason) {
        if let Some(SlotState::Ready(mut ready)) =
            self.slots.insert(name.to_string(), SlotState::Failed(reason))
        {
            if let Err(e) = guarded(|| ready.instance.cleanup()) {
                error!("Plugin {} cleanup failed: {}", name, e);
            }
        }
    }
}

/// Resolve one descriptor into a cache slot
fn create_slot(source: &mut dyn PluginSource, d: &PluginDescriptor) -> SlotState {
    let fail = |reason: FailureReason| {
        warn!("Plugin {} ({}) unavailable: {}", d.name, d.role, reason);
        SlotState::Failed(reason)
    };

    let unit = match source.load(d) {
        Ok(unit) => unit,
        Err(e) => return fail(e.into()),
    };
    let kind = unit.kind();

    let local = match source.local_config(d) {
        Ok(local) => local,
        Err(e) => return fail(FailureReason::Config(e.to_string())),
    };

    let mut instance = match unit.instantiate(d, &local) {
        Ok(instance) => instance,
        Err(e) => return fail(LoadError::Factory(e).into()),
    };

    let provided = instance.role();
    if provided == PluginRole::Init && d.role == PluginRole::Init {
        if let PluginInstance::Init(plugin) = &instance {
            if !plugin.has_entry(d.entry_point()) {
                return fail(FailureReason::MissingEntry(d.entry_point().to_string()));
            }
        }
    }

    match guarded(|| instance.initialize()) {
        Ok(true) => {}
        Ok(false) => return fail(FailureReason::InitializeRejected),
        Err(e) => return fail(FailureReason::InitializePanicked(e)),
    }

    let role = if provided == d.role {
        info!("Plugin {} ready ({}, {})", d.name, provided, kind);
        provided
    } else {
        warn!(
            "Plugin {} is declared {} but provides {}; it will not be dispatched",
            d.name, d.role, provided
        );
        PluginRole::Unknown
    };

    SlotState::Ready(ReadySlot {
        instance,
        role,
        local,
        init_ran: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetWindow;
    use crate::plugin::contract::{LastingPlugin, MenuPlugin, Plugin};
    use crate::plugin::loader::CodeUnit;
    use crate::plugin::local_config::LocalConfigError;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Ticker;

    impl Plugin for Ticker {}

    impl LastingPlugin for Ticker {
        fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
            host.set_title("tick");
            Ok(())
        }
    }

    struct Echo;

    impl Plugin for Echo {}

    impl MenuPlugin for Echo {
        fn has_action(&self, name: &str) -> bool {
            name == "echo"
        }

        fn execute(
            &mut self,
            name: &str,
            _host: &mut dyn HostContext,
            parameter: &str,
        ) -> Result<ActionOutput, PluginError> {
            match name {
                "echo" => Ok(ActionOutput::Message(parameter.to_string())),
                "explode" => panic!("kaboom"),
                other => Err(PluginError::NoSuchAction(other.to_string())),
            }
        }
    }

    fn ticker(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
        Ok(PluginInstance::Lasting(Box::new(Ticker)))
    }

    fn echo(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
        Ok(PluginInstance::Menu(Box::new(Echo)))
    }

    /// In-memory source counting every load
    struct MemorySource {
        loads: Rc<Cell<usize>>,
    }

    impl PluginSource for MemorySource {
        fn load(&mut self, d: &PluginDescriptor) -> Result<CodeUnit, LoadError> {
            self.loads.set(self.loads.get() + 1);
            match d.name.as_str() {
                "clock" => Ok(CodeUnit::Builtin(ticker)),
                "echo" => Ok(CodeUnit::Builtin(echo)),
                other => Err(LoadError::NotFound {
                    name: other.to_string(),
                    path: d.path.clone(),
                }),
            }
        }

        fn local_config(&mut self, _: &PluginDescriptor) -> Result<PluginLocalConfig, LocalConfigError> {
            Ok(PluginLocalConfig::default())
        }
    }

    fn manager() -> (PluginManager, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        let manager = PluginManager::new(MemorySource { loads: loads.clone() });
        (manager, loads)
    }

    #[test]
    fn test_admission() {
        let list = vec![
            PluginDescriptor::new("a", "p/a", PluginRole::Menu),
            PluginDescriptor::new("a", "p/a2", PluginRole::Lasting),
            PluginDescriptor::new("b", "p/b", PluginRole::Init).disabled(),
            PluginDescriptor::new("", "p", PluginRole::Menu),
        ];
        let admissions: Vec<Admission> = admit(&list).into_iter().map(|(_, a)| a).collect();
        assert_eq!(admissions[0], Admission::Active);
        assert_eq!(admissions[1], Admission::Duplicate);
        assert_eq!(admissions[2], Admission::Disabled);
        assert_eq!(admissions[3], Admission::Invalid(DescriptorError::EmptyName));
    }

    #[test]
    fn test_find_admitted_skips_invalid_entries() {
        let list = vec![
            PluginDescriptor::new("a", "p/a", PluginRole::Unknown),
            PluginDescriptor::new("a", "p/a2", PluginRole::Menu),
            PluginDescriptor::new("b", "p/b", PluginRole::Unknown),
        ];
        assert_eq!(find_admitted(&list, "a"), Some(1));
        assert_eq!(admit(&list)[1].1, Admission::Active);
        assert_eq!(find_admitted(&list, "b"), Some(2));
        assert_eq!(find_admitted(&list, "c"), None);
    }

    #[test]
    fn test_resolve_caches_instance() {
        let (mut manager, loads) = manager();
        let d = PluginDescriptor::new("clock", "p/clock", PluginRole::Lasting);

        let first = manager.instance(&d).map(|i| i as *const PluginInstance);
        let second = manager.instance(&d).map(|i| i as *const PluginInstance);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn test_failure_cached() {
        let (mut manager, loads) = manager();
        let d = PluginDescriptor::new("ghost", "p/ghost", PluginRole::Lasting);

        assert!(manager.resolve(&d).is_none());
        assert!(manager.resolve(&d).is_none());
        assert_eq!(loads.get(), 1);
        assert_eq!(manager.failure("ghost").map(|f| f.category()), Some("load"));
    }

    #[test]
    fn test_dispatch_menu() {
        let (mut manager, _) = manager();
        let mut pet = PetWindow::headless();
        let d = PluginDescriptor::new("echo", "p/echo", PluginRole::Menu);

        let out = manager.dispatch_menu(&d, "echo", &mut pet, "hello").unwrap();
        assert_eq!(out, ActionOutput::Message("hello".into()));

        assert!(matches!(
            manager.dispatch_menu(&d, "fly", &mut pet, ""),
            Err(DispatchError::NoSuchAction { .. })
        ));

        // a panicking behaviour is reported but does not quarantine
        assert!(matches!(
            manager.dispatch_menu(&d, "explode", &mut pet, ""),
            Err(DispatchError::Invocation { source: PluginError::Panicked(_), .. })
        ));
        assert!(manager.dispatch_menu(&d, "echo", &mut pet, "again").is_ok());
    }

    #[test]
    fn test_dispatch_menu_rejects_other_roles() {
        let (mut manager, _) = manager();
        let mut pet = PetWindow::headless();

        let lasting = PluginDescriptor::new("clock", "p/clock", PluginRole::Lasting);
        assert!(matches!(
            manager.dispatch_menu(&lasting, "echo", &mut pet, ""),
            Err(DispatchError::NotMenu { .. })
        ));

        // declared menu, but the code provides a lasting plugin
        let liar = PluginDescriptor::new("clock", "p/clock", PluginRole::Menu);
        assert!(matches!(
            manager.dispatch_menu(&liar, "echo", &mut pet, ""),
            Err(DispatchError::RoleMismatch(_))
        ));
        let report = manager.report(std::slice::from_ref(&liar));
        assert_eq!(
            report[0].state,
            PluginState::RoleMismatch { provided: PluginRole::Lasting }
        );

        let off = PluginDescriptor::new("echo", "p/echo", PluginRole::Menu).disabled();
        assert!(matches!(
            manager.dispatch_menu(&off, "echo", &mut pet, ""),
            Err(DispatchError::Disabled(_))
        ));
    }

    #[test]
    fn test_dispatch_lasting_sets_title() {
        let (mut manager, _) = manager();
        let mut pet = PetWindow::headless();
        let list = vec![PluginDescriptor::new("clock", "p/clock", PluginRole::Lasting)];

        manager.dispatch_lasting(&list, &mut pet);
        assert_eq!(pet.title(), "tick");
    }

    #[test]
    fn test_report_states() {
        let (mut manager, _) = manager();
        let list = vec![
            PluginDescriptor::new("clock", "p/clock", PluginRole::Lasting),
            PluginDescriptor::new("ghost", "p/ghost", PluginRole::Lasting),
            PluginDescriptor::new("echo", "p/echo", PluginRole::Menu),
        ];

        manager.resolve(&list[0]);
        manager.resolve(&list[1]);

        let report = manager.report(&list);
        assert_eq!(report[0].state, PluginState::Ready(PluginRole::Lasting));
        assert!(matches!(report[1].state, PluginState::Failed { category: "load", .. }));
        assert_eq!(report[2].state, PluginState::Unresolved);
    }

    #[test]
    fn test_shutdown_releases_instances() {
        let (mut manager, _) = manager();
        let d = PluginDescriptor::new("clock", "p/clock", PluginRole::Lasting);
        manager.resolve(&d);
        assert!(manager.is_resolved("clock"));

        manager.shutdown();
        assert!(!manager.is_resolved("clock"));
    }
}
