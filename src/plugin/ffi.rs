/*
 *  plugin/ffi.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  C ABI types for shared-library plugins
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

//! FFI types for DeskPet shared-library plugins
//!
//! These C-compatible types form the stable ABI between the host and a
//! plugin built as a `cdylib`. All types use `#[repr(C)]` so the layout is
//! identical on both sides of the boundary.
//!
//! The host lends a [`DeskPetHost`] callback table for the duration of each
//! call; plugins must not keep it past the call that received it.

use std::ffi::{c_char, c_void};

use super::contract::PluginError;
use super::descriptor::PluginRole;

/// Plugin ABI version
pub const DESKPET_PLUGIN_ABI_VERSION_MAJOR: u32 = 1;
pub const DESKPET_PLUGIN_ABI_VERSION_MINOR: u32 = 0;
pub const DESKPET_PLUGIN_ABI_VERSION_PATCH: u32 = 0;

/// Maximum length for error messages
pub const DESKPET_ERROR_MESSAGE_SIZE: usize = 256;

/// Maximum length for plugin metadata strings
pub const DESKPET_PLUGIN_NAME_SIZE: usize = 64;
pub const DESKPET_PLUGIN_VERSION_SIZE: usize = 32;

/// Buffer size for text returned by a menu behaviour
pub const DESKPET_OUTPUT_SIZE: usize = 1024;

/// Symbol every plugin library exports
pub const DESKPET_REGISTER_SYMBOL: &[u8] = b"deskpet_plugin_register\0";

/// Opaque handle to a plugin instance
#[repr(C)]
pub struct DeskPetPluginHandle {
    _private: [u8; 0],
}

/// Error codes returned by plugin functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskPetErrorCode {
    Success = 0,
    ErrorGeneric = 1,
    ErrorInvalidArgument = 2,
    ErrorNoSuchAction = 3,
    ErrorInitialization = 4,
    ErrorNullPointer = 5,
    ErrorPanic = 6,
    ErrorAbiMismatch = 7,
    ErrorWrongRole = 8,
}

/// Role codes reported by `plugin_info`
pub const DESKPET_ROLE_MENU: u32 = 0;
pub const DESKPET_ROLE_LASTING: u32 = 1;
pub const DESKPET_ROLE_INIT: u32 = 2;

pub fn role_from_code(code: u32) -> PluginRole {
    match code {
        DESKPET_ROLE_MENU => PluginRole::Menu,
        DESKPET_ROLE_LASTING => PluginRole::Lasting,
        DESKPET_ROLE_INIT => PluginRole::Init,
        _ => PluginRole::Unknown,
    }
}

/// Error information structure
#[repr(C)]
pub struct DeskPetError {
    pub code: DeskPetErrorCode,

    /// Human-readable error message (null-terminated)
    pub message: [c_char; DESKPET_ERROR_MESSAGE_SIZE],
}

impl DeskPetError {
    pub fn new(code: DeskPetErrorCode, message: &str) -> Self {
        let mut error = Self {
            code,
            message: [0; DESKPET_ERROR_MESSAGE_SIZE],
        };
        write_c_string(&mut error.message, message);
        error
    }

    pub fn success() -> Self {
        Self::new(DeskPetErrorCode::Success, "")
    }

    pub fn message_str(&self) -> String {
        read_c_string(&self.message)
    }
}

impl Default for DeskPetError {
    fn default() -> Self {
        Self::success()
    }
}

impl From<&PluginError> for DeskPetError {
    fn from(error: &PluginError) -> Self {
        let code = match error {
            PluginError::NoSuchAction(_) => DeskPetErrorCode::ErrorNoSuchAction,
            PluginError::InvalidParameter { .. } => DeskPetErrorCode::ErrorInvalidArgument,
            PluginError::Failed(_) => DeskPetErrorCode::ErrorGeneric,
            PluginError::Panicked(_) => DeskPetErrorCode::ErrorPanic,
        };
        Self::new(code, &error.to_string())
    }
}

impl From<DeskPetError> for PluginError {
    fn from(error: DeskPetError) -> Self {
        let message = error.message_str();

        match error.code {
            DeskPetErrorCode::ErrorNoSuchAction => PluginError::NoSuchAction(message),
            DeskPetErrorCode::ErrorPanic => PluginError::Panicked(message),
            DeskPetErrorCode::ErrorInvalidArgument => PluginError::InvalidParameter {
                parameter: String::new(),
                reason: message,
            },
            DeskPetErrorCode::Success => PluginError::Failed("No error".to_string()),
            _ => PluginError::Failed(message),
        }
    }
}

/// Host callbacks lent to a plugin for one call
///
/// `ctx` is opaque to the plugin and must be handed back unchanged as the
/// first argument of every callback.
#[repr(C)]
pub struct DeskPetHost {
    pub ctx: *mut c_void,

    pub position: extern "C" fn(ctx: *mut c_void, x: *mut i32, y: *mut i32),

    pub move_to: extern "C" fn(ctx: *mut c_void, x: i32, y: i32),

    pub size: extern "C" fn(ctx: *mut c_void, width: *mut u32, height: *mut u32),

    pub is_visible: extern "C" fn(ctx: *mut c_void) -> bool,

    pub set_visible: extern "C" fn(ctx: *mut c_void, visible: bool),

    /// Title is a null-terminated UTF-8 string
    pub set_title: extern "C" fn(ctx: *mut c_void, title: *const c_char),

    pub cursor_position: extern "C" fn(ctx: *mut c_void, x: *mut i32, y: *mut i32),

    pub drag_model: extern "C" fn(ctx: *mut c_void, x: f32, y: f32),

    /// Start a random motion from the named group
    pub start_random_motion: extern "C" fn(ctx: *mut c_void, group: *const c_char) -> bool,

    pub set_timer_interval_ms: extern "C" fn(ctx: *mut c_void, interval_ms: u32),

    pub quit: extern "C" fn(ctx: *mut c_void),
}

/// Plugin vtable - function pointers for all plugin operations
///
/// Entries that do not apply to the plugin's role return
/// `ErrorWrongRole`.
#[repr(C)]
pub struct DeskPetPluginVTable {
    /// Get plugin ABI version (major, minor, patch)
    pub abi_version: extern "C" fn(major: *mut u32, minor: *mut u32, patch: *mut u32),

    /// Get plugin metadata (name, version, role code)
    pub plugin_info: extern "C" fn(name: *mut c_char, version: *mut c_char, role: *mut u32),

    /// Create a new plugin instance from its local configuration text
    pub create: extern "C" fn(
        config_toml: *const c_char,
        handle: *mut *mut DeskPetPluginHandle,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,

    /// Destroy a plugin instance
    pub destroy: extern "C" fn(handle: *mut DeskPetPluginHandle),

    pub initialize: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,

    pub cleanup: extern "C" fn(handle: *mut DeskPetPluginHandle),

    /// Whether a menu function or init entry point exists
    pub has_action: extern "C" fn(handle: *const DeskPetPluginHandle, name: *const c_char) -> bool,

    /// Invoke a menu function; text output, if any, is written to `output`
    pub execute: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        function: *const c_char,
        parameter: *const c_char,
        host: *const DeskPetHost,
        output: *mut c_char,
        output_len: usize,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,

    /// Per-frame update of a lasting plugin
    pub update: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        host: *const DeskPetHost,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,

    /// Run an init entry point
    pub run_entry: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        entry: *const c_char,
        host: *const DeskPetHost,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
}

/// Plugin registration function type
///
/// Each plugin must export a function with this signature:
/// ```c
/// #[no_mangle]
/// pub extern "C" fn deskpet_plugin_register() -> *const DeskPetPluginVTable
/// ```
pub type PluginRegisterFn = extern "C" fn() -> *const DeskPetPluginVTable;

/// Copy `value` into a C buffer, truncating and null-terminating
pub fn write_c_string(buffer: &mut [c_char], value: &str) {
    if buffer.is_empty() {
        return;
    }
    let bytes = value.as_bytes();
    let len = bytes.len().min(buffer.len() - 1);

    for (i, &byte) in bytes.iter().take(len).enumerate() {
        buffer[i] = byte as c_char;
    }
    buffer[len] = 0;
}

/// Extract a null-terminated string from a C buffer
pub fn read_c_string(buffer: &[c_char]) -> String {
    let len = buffer
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(buffer.len());

    let bytes: Vec<u8> = buffer[..len].iter().map(|&c| c as u8).collect();

    String::from_utf8_lossy(&bytes).into_owned()
}
