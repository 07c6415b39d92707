/*
 *  plugin/adapter.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin adapter - wraps C ABI plugins as capability trait objects
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

use std::ffi::{c_char, c_void, CStr, CString};
use std::time::Duration;

use log::{debug, error};

use super::contract::{
    guarded, ActionOutput, InitPlugin, LastingPlugin, MenuPlugin, Plugin, PluginError,
    PluginInstance,
};
use super::descriptor::PluginRole;
use super::ffi::{
    read_c_string, DeskPetError, DeskPetErrorCode, DeskPetHost, DeskPetPluginHandle,
    DESKPET_OUTPUT_SIZE,
};
use super::host::{HostContext, PRIORITY_NORMAL};
use super::loader::LoadedPlugin;
use super::local_config::PluginLocalConfig;

/// A shared-library plugin instance seen through the capability traits
///
/// Every vtable call is wrapped so a panic in plugin code surfaces as
/// [`PluginError::Panicked`]. The instance is destroyed when dropped.
pub struct DynamicPlugin {
    /// The loaded library (kept alive for vtable access)
    plugin: LoadedPlugin,

    /// Opaque handle to the plugin instance
    handle: *mut DeskPetPluginHandle,
}

impl DynamicPlugin {
    /// Create an instance through the library's vtable and tag it with the
    /// role the library reports
    pub fn create(
        plugin: LoadedPlugin,
        config: &PluginLocalConfig,
    ) -> Result<PluginInstance, PluginError> {
        let vtable = plugin.vtable();
        let role = plugin.metadata().role;

        let config_text = CString::new(config.raw.as_str())
            .map_err(|_| PluginError::Failed("local configuration contains a NUL byte".into()))?;

        let mut handle: *mut DeskPetPluginHandle = std::ptr::null_mut();
        let mut error = DeskPetError::default();

        let code = guarded(|| (vtable.create)(config_text.as_ptr(), &mut handle, &mut error))?;
        if code != DeskPetErrorCode::Success || handle.is_null() {
            return Err(error.into());
        }

        debug!("Created plugin instance {:p} from {}", handle, plugin.path().display());

        let adapter = Self { plugin, handle };

        match role {
            PluginRole::Menu => Ok(PluginInstance::Menu(Box::new(adapter))),
            PluginRole::Lasting => Ok(PluginInstance::Lasting(Box::new(adapter))),
            PluginRole::Init => Ok(PluginInstance::Init(Box::new(adapter))),
            PluginRole::Unknown => Err(PluginError::Failed(format!(
                "library {} reports an unknown role",
                adapter.plugin_name()
            ))),
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin.metadata().name
    }

    pub fn plugin_version(&self) -> &str {
        &self.plugin.metadata().version
    }

    /// Run one status-returning vtable call
    fn call<F>(&mut self, f: F) -> Result<(), PluginError>
    where
        F: FnOnce(*mut DeskPetPluginHandle, &mut DeskPetError) -> DeskPetErrorCode,
    {
        let handle = self.handle;
        let mut error = DeskPetError::default();

        let code = guarded(|| f(handle, &mut error))?;
        if code != DeskPetErrorCode::Success {
            return Err(error.into());
        }

        Ok(())
    }

    fn has_named(&self, name: &str) -> bool {
        let Ok(name) = CString::new(name) else {
            return false;
        };
        let vtable = self.plugin.vtable();
        let handle = self.handle;
        guarded(|| (vtable.has_action)(handle, name.as_ptr())).unwrap_or(false)
    }
}

impl Plugin for DynamicPlugin {
    fn initialize(&mut self) -> bool {
        let vtable = self.plugin.vtable();
        match self.call(|handle, error| (vtable.initialize)(handle, error)) {
            Ok(()) => true,
            Err(e) => {
                debug!("{} initialize failed: {}", self.plugin_name(), e);
                false
            }
        }
    }

    fn cleanup(&mut self) {
        let vtable = self.plugin.vtable();
        let handle = self.handle;
        if let Err(e) = guarded(|| (vtable.cleanup)(handle)) {
            error!("{} cleanup failed: {}", self.plugin_name(), e);
        }
    }
}

impl MenuPlugin for DynamicPlugin {
    fn has_action(&self, function_name: &str) -> bool {
        self.has_named(function_name)
    }

    fn execute(
        &mut self,
        function_name: &str,
        host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        let function = CString::new(function_name)
            .map_err(|_| PluginError::NoSuchAction(function_name.to_string()))?;
        let param = CString::new(parameter).map_err(|_| PluginError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: "contains a NUL byte".into(),
        })?;

        let vtable = self.plugin.vtable();
        let mut output = [0 as c_char; DESKPET_OUTPUT_SIZE];
        let output_len = output.len();
        let output_ptr = output.as_mut_ptr();

        with_host(host, |table| {
            self.call(|handle, error| {
                (vtable.execute)(
                    handle,
                    function.as_ptr(),
                    param.as_ptr(),
                    table,
                    output_ptr,
                    output_len,
                    error,
                )
            })
        })?;

        let text = read_c_string(&output);
        if text.is_empty() {
            Ok(ActionOutput::Done)
        } else {
            Ok(ActionOutput::Message(text))
        }
    }
}

impl LastingPlugin for DynamicPlugin {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let vtable = self.plugin.vtable();
        with_host(host, |table| {
            self.call(|handle, error| (vtable.update)(handle, table, error))
        })
    }
}

impl InitPlugin for DynamicPlugin {
    fn has_entry(&self, entry: &str) -> bool {
        self.has_named(entry)
    }

    fn run_entry(&mut self, entry: &str, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let entry_c =
            CString::new(entry).map_err(|_| PluginError::NoSuchAction(entry.to_string()))?;
        let vtable = self.plugin.vtable();
        with_host(host, |table| {
            self.call(|handle, error| (vtable.run_entry)(handle, entry_c.as_ptr(), table, error))
        })
    }
}

impl Drop for DynamicPlugin {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            debug!("Destroying plugin instance: {:p}", self.handle);

            let vtable = self.plugin.vtable();
            let handle = self.handle;
            if let Err(e) = guarded(|| (vtable.destroy)(handle)) {
                error!("{} destroy failed: {}", self.plugin.metadata().name, e);
            }

            self.handle = std::ptr::null_mut();
        }
    }
}

/// Lend `host` to plugin code as a C callback table for the duration of `f`
fn with_host<R>(host: &mut dyn HostContext, f: impl FnOnce(&DeskPetHost) -> R) -> R {
    let mut host_ref: &mut dyn HostContext = host;
    let table = DeskPetHost {
        ctx: &mut host_ref as *mut &mut dyn HostContext as *mut c_void,
        position: host_position,
        move_to: host_move_to,
        size: host_size,
        is_visible: host_is_visible,
        set_visible: host_set_visible,
        set_title: host_set_title,
        cursor_position: host_cursor_position,
        drag_model: host_drag_model,
        start_random_motion: host_start_random_motion,
        set_timer_interval_ms: host_set_timer_interval_ms,
        quit: host_quit,
    };
    f(&table)
}

/// # Safety
/// `ctx` must be the pointer produced by [`with_host`] and still in scope.
unsafe fn host_from<'a>(ctx: *mut c_void) -> &'a mut dyn HostContext {
    unsafe { &mut **(ctx as *mut &'a mut dyn HostContext) }
}

unsafe fn write_pair<T: Copy>(a: *mut T, b: *mut T, value: (T, T)) {
    unsafe {
        if !a.is_null() {
            *a = value.0;
        }
        if !b.is_null() {
            *b = value.1;
        }
    }
}

unsafe fn lossy_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

extern "C" fn host_position(ctx: *mut c_void, x: *mut i32, y: *mut i32) {
    let host = unsafe { host_from(ctx) };
    unsafe { write_pair(x, y, host.position()) }
}

extern "C" fn host_move_to(ctx: *mut c_void, x: i32, y: i32) {
    unsafe { host_from(ctx) }.move_to(x, y);
}

extern "C" fn host_size(ctx: *mut c_void, width: *mut u32, height: *mut u32) {
    let host = unsafe { host_from(ctx) };
    unsafe { write_pair(width, height, host.size()) }
}

extern "C" fn host_is_visible(ctx: *mut c_void) -> bool {
    unsafe { host_from(ctx) }.is_visible()
}

extern "C" fn host_set_visible(ctx: *mut c_void, visible: bool) {
    unsafe { host_from(ctx) }.set_visible(visible);
}

extern "C" fn host_set_title(ctx: *mut c_void, title: *const c_char) {
    if let Some(title) = unsafe { lossy_str(title) } {
        unsafe { host_from(ctx) }.set_title(&title);
    }
}

extern "C" fn host_cursor_position(ctx: *mut c_void, x: *mut i32, y: *mut i32) {
    let host = unsafe { host_from(ctx) };
    unsafe { write_pair(x, y, host.cursor_position()) }
}

extern "C" fn host_drag_model(ctx: *mut c_void, x: f32, y: f32) {
    unsafe { host_from(ctx) }.model().drag(x, y);
}

extern "C" fn host_start_random_motion(ctx: *mut c_void, group: *const c_char) -> bool {
    match unsafe { lossy_str(group) } {
        Some(group) => unsafe { host_from(ctx) }
            .model()
            .start_random_motion(&group, PRIORITY_NORMAL),
        None => false,
    }
}

extern "C" fn host_set_timer_interval_ms(ctx: *mut c_void, interval_ms: u32) {
    unsafe { host_from(ctx) }.set_timer_interval(Duration::from_millis(u64::from(interval_ms)));
}

extern "C" fn host_quit(ctx: *mut c_void) {
    unsafe { host_from(ctx) }.quit();
}
