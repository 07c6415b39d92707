/*
 *  DeskPet Clock Plugin - FFI Types
 *
 *  C ABI types matching the DeskPet plugin interface
 *  These types must match exactly with the host's FFI types
 */

use std::ffi::{c_char, c_void};

/// Plugin ABI version
pub const DESKPET_PLUGIN_ABI_VERSION_MAJOR: u32 = 1;
pub const DESKPET_PLUGIN_ABI_VERSION_MINOR: u32 = 0;
pub const DESKPET_PLUGIN_ABI_VERSION_PATCH: u32 = 0;

/// Maximum length for error messages
pub const DESKPET_ERROR_MESSAGE_SIZE: usize = 256;

pub const DESKPET_PLUGIN_NAME_SIZE: usize = 64;
pub const DESKPET_PLUGIN_VERSION_SIZE: usize = 32;

pub const DESKPET_ROLE_LASTING: u32 = 1;

/// Opaque handle to a plugin instance
#[repr(C)]
pub struct DeskPetPluginHandle {
    _private: [u8; 0],
}

/// Error codes returned by plugin functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
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
        copy_str_to_buffer(message, error.message.as_mut_ptr(), DESKPET_ERROR_MESSAGE_SIZE);
        error
    }
}

/// Host callbacks lent to the plugin for one call
#[repr(C)]
#[allow(dead_code)]
pub struct DeskPetHost {
    pub ctx: *mut c_void,
    pub position: extern "C" fn(ctx: *mut c_void, x: *mut i32, y: *mut i32),
    pub move_to: extern "C" fn(ctx: *mut c_void, x: i32, y: i32),
    pub size: extern "C" fn(ctx: *mut c_void, width: *mut u32, height: *mut u32),
    pub is_visible: extern "C" fn(ctx: *mut c_void) -> bool,
    pub set_visible: extern "C" fn(ctx: *mut c_void, visible: bool),
    pub set_title: extern "C" fn(ctx: *mut c_void, title: *const c_char),
    pub cursor_position: extern "C" fn(ctx: *mut c_void, x: *mut i32, y: *mut i32),
    pub drag_model: extern "C" fn(ctx: *mut c_void, x: f32, y: f32),
    pub start_random_motion: extern "C" fn(ctx: *mut c_void, group: *const c_char) -> bool,
    pub set_timer_interval_ms: extern "C" fn(ctx: *mut c_void, interval_ms: u32),
    pub quit: extern "C" fn(ctx: *mut c_void),
}

/// Plugin vtable - function pointers for all plugin operations
#[repr(C)]
pub struct DeskPetPluginVTable {
    pub abi_version: extern "C" fn(major: *mut u32, minor: *mut u32, patch: *mut u32),
    pub plugin_info: extern "C" fn(name: *mut c_char, version: *mut c_char, role: *mut u32),
    pub create: extern "C" fn(
        config_toml: *const c_char,
        handle: *mut *mut DeskPetPluginHandle,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
    pub destroy: extern "C" fn(handle: *mut DeskPetPluginHandle),
    pub initialize: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
    pub cleanup: extern "C" fn(handle: *mut DeskPetPluginHandle),
    pub has_action: extern "C" fn(handle: *const DeskPetPluginHandle, name: *const c_char) -> bool,
    pub execute: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        function: *const c_char,
        parameter: *const c_char,
        host: *const DeskPetHost,
        output: *mut c_char,
        output_len: usize,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
    pub update: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        host: *const DeskPetHost,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
    pub run_entry: extern "C" fn(
        handle: *mut DeskPetPluginHandle,
        entry: *const c_char,
        host: *const DeskPetHost,
        error: *mut DeskPetError,
    ) -> DeskPetErrorCode,
}

/// Copy a string into a C buffer, truncating and null-terminating
pub fn copy_str_to_buffer(s: &str, buffer: *mut c_char, max_len: usize) {
    if buffer.is_null() || max_len == 0 {
        return;
    }

    let bytes = s.as_bytes();
    let len = bytes.len().min(max_len - 1);

    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buffer, len);
        *buffer.add(len) = 0;
    }
}
