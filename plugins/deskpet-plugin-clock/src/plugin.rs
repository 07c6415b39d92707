/*
 *  DeskPet Clock Plugin - Implementation
 *
 *  Formats the local time into the pet window's title
 */

use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Local;

use crate::ffi::*;

const PLUGIN_NAME: &str = "Clock";
const DEFAULT_FORMAT: &str = "%H:%M:%S";

/// Internal clock state
pub struct ClockPlugin {
    /// strftime-style pattern
    format: String,

    /// Title last written to the host
    last: String,

    running: bool,
}

impl ClockPlugin {
    /// Create the plugin from its local configuration document
    pub fn new(config_toml: &str) -> Result<Self, String> {
        let document: toml::Table = config_toml
            .parse()
            .map_err(|e| format!("Invalid config.toml: {}", e))?;

        let format = match document.get("clock").and_then(|c| c.get("format")) {
            None => DEFAULT_FORMAT.to_string(),
            Some(toml::Value::String(f)) if !f.trim().is_empty() => f.clone(),
            Some(other) => return Err(format!("clock.format must be a non-empty string, got {}", other)),
        };

        Ok(Self {
            format,
            last: String::new(),
            running: false,
        })
    }

    pub fn initialize(&mut self) -> Result<(), String> {
        // reject patterns chrono cannot render before the first frame
        use std::fmt::Write;
        let mut rendered = String::new();
        write!(rendered, "{}", Local::now().format(&self.format))
            .map_err(|_| format!("Unusable time format `{}`", self.format))?;

        self.running = true;
        #[cfg(feature = "debug-logging")]
        log::debug!("Clock started with format {}", self.format);
        Ok(())
    }

    pub fn cleanup(&mut self) {
        self.running = false;
        self.last.clear();
    }

    /// Title to show now, or `None` when it has not changed
    pub fn next_title(&mut self) -> Option<String> {
        if !self.running {
            return None;
        }
        let now = Local::now().format(&self.format).to_string();
        if now == self.last {
            return None;
        }
        self.last = now.clone();
        Some(now)
    }
}

/// Macro to catch panics in FFI functions
macro_rules! catch_panic {
    ($error:expr, $code:block) => {
        match catch_unwind(AssertUnwindSafe(|| $code)) {
            Ok(result) => result,
            Err(panic_info) => {
                let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    format!("Plugin panic: {}", s)
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    format!("Plugin panic: {}", s)
                } else {
                    "Plugin panic: unknown error".to_string()
                };

                if !$error.is_null() {
                    unsafe {
                        *$error = DeskPetError::new(DeskPetErrorCode::ErrorPanic, &message);
                    }
                }
                DeskPetErrorCode::ErrorPanic
            }
        }
    };
}

fn fail(error: *mut DeskPetError, code: DeskPetErrorCode, message: &str) -> DeskPetErrorCode {
    if !error.is_null() {
        unsafe {
            *error = DeskPetError::new(code, message);
        }
    }
    code
}

// ============================================================================
// FFI Vtable Implementations
// ============================================================================

extern "C" fn abi_version(major: *mut u32, minor: *mut u32, patch: *mut u32) {
    if !major.is_null() && !minor.is_null() && !patch.is_null() {
        unsafe {
            *major = DESKPET_PLUGIN_ABI_VERSION_MAJOR;
            *minor = DESKPET_PLUGIN_ABI_VERSION_MINOR;
            *patch = DESKPET_PLUGIN_ABI_VERSION_PATCH;
        }
    }
}

extern "C" fn plugin_info(name: *mut c_char, version: *mut c_char, role: *mut u32) {
    copy_str_to_buffer(PLUGIN_NAME, name, DESKPET_PLUGIN_NAME_SIZE);
    copy_str_to_buffer(env!("CARGO_PKG_VERSION"), version, DESKPET_PLUGIN_VERSION_SIZE);
    if !role.is_null() {
        unsafe {
            *role = DESKPET_ROLE_LASTING;
        }
    }
}

extern "C" fn create(
    config_toml: *const c_char,
    handle: *mut *mut DeskPetPluginHandle,
    error: *mut DeskPetError,
) -> DeskPetErrorCode {
    catch_panic!(error, {
        if config_toml.is_null() || handle.is_null() {
            return fail(error, DeskPetErrorCode::ErrorNullPointer, "Null pointer passed to create");
        }

        let config = unsafe { CStr::from_ptr(config_toml) }.to_string_lossy();
        let plugin = match ClockPlugin::new(&config) {
            Ok(p) => p,
            Err(e) => return fail(error, DeskPetErrorCode::ErrorInitialization, &e),
        };

        unsafe {
            *handle = Box::into_raw(Box::new(plugin)) as *mut DeskPetPluginHandle;
        }
        DeskPetErrorCode::Success
    })
}

extern "C" fn destroy(handle: *mut DeskPetPluginHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle as *mut ClockPlugin);
        }
    }
}

extern "C" fn initialize(handle: *mut DeskPetPluginHandle, error: *mut DeskPetError) -> DeskPetErrorCode {
    catch_panic!(error, {
        if handle.is_null() {
            return fail(error, DeskPetErrorCode::ErrorNullPointer, "Null pointer passed to initialize");
        }
        let plugin = unsafe { &mut *(handle as *mut ClockPlugin) };

        match plugin.initialize() {
            Ok(()) => DeskPetErrorCode::Success,
            Err(e) => fail(error, DeskPetErrorCode::ErrorInitialization, &e),
        }
    })
}

extern "C" fn cleanup(handle: *mut DeskPetPluginHandle) {
    if !handle.is_null() {
        let plugin = unsafe { &mut *(handle as *mut ClockPlugin) };
        plugin.cleanup();
    }
}

/// The clock has no menu functions or init entry points
extern "C" fn has_action(_handle: *const DeskPetPluginHandle, _name: *const c_char) -> bool {
    false
}

extern "C" fn execute(
    _handle: *mut DeskPetPluginHandle,
    _function: *const c_char,
    _parameter: *const c_char,
    _host: *const DeskPetHost,
    _output: *mut c_char,
    _output_len: usize,
    error: *mut DeskPetError,
) -> DeskPetErrorCode {
    fail(error, DeskPetErrorCode::ErrorWrongRole, "Clock is a lasting plugin")
}

extern "C" fn update(
    handle: *mut DeskPetPluginHandle,
    host: *const DeskPetHost,
    error: *mut DeskPetError,
) -> DeskPetErrorCode {
    catch_panic!(error, {
        if handle.is_null() || host.is_null() {
            return fail(error, DeskPetErrorCode::ErrorNullPointer, "Null pointer passed to update");
        }
        let plugin = unsafe { &mut *(handle as *mut ClockPlugin) };
        let host = unsafe { &*host };

        if let Some(title) = plugin.next_title() {
            match CString::new(title) {
                Ok(title) => (host.set_title)(host.ctx, title.as_ptr()),
                Err(_) => {
                    return fail(error, DeskPetErrorCode::ErrorGeneric, "Time format produced a NUL byte");
                }
            }
        }
        DeskPetErrorCode::Success
    })
}

extern "C" fn run_entry(
    _handle: *mut DeskPetPluginHandle,
    _entry: *const c_char,
    _host: *const DeskPetHost,
    error: *mut DeskPetError,
) -> DeskPetErrorCode {
    fail(error, DeskPetErrorCode::ErrorWrongRole, "Clock is a lasting plugin")
}

// ============================================================================
// Plugin Registration
// ============================================================================

/// Static vtable
static VTABLE: DeskPetPluginVTable = DeskPetPluginVTable {
    abi_version,
    plugin_info,
    create,
    destroy,
    initialize,
    cleanup,
    has_action,
    execute,
    update,
    run_entry,
};

/// Plugin entry point - returns the vtable
#[no_mangle]
pub extern "C" fn deskpet_plugin_register() -> *const DeskPetPluginVTable {
    &VTABLE
}
