/*
 *  plugin/loader.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Plugin loader - resolves code units from disk or the registry
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

use std::path::{Path, PathBuf};

use log::debug;
#[cfg(feature = "plugin-system")]
use log::{info, warn};
#[cfg(feature = "plugin-system")]
use libloading::{Library, Symbol};

use super::contract::{guarded, PluginError, PluginFactory, PluginInstance};
use super::descriptor::{PluginDescriptor, PluginRole};
use super::error::LoadError;
use super::local_config::{LocalConfigError, PluginLocalConfig};
use super::registry::PluginRegistry;
#[cfg(feature = "plugin-system")]
use super::ffi::{
    read_c_string, role_from_code, DeskPetPluginVTable, PluginRegisterFn,
    DESKPET_PLUGIN_ABI_VERSION_MAJOR, DESKPET_PLUGIN_ABI_VERSION_MINOR,
    DESKPET_PLUGIN_ABI_VERSION_PATCH, DESKPET_PLUGIN_NAME_SIZE, DESKPET_PLUGIN_VERSION_SIZE,
    DESKPET_REGISTER_SYMBOL,
};

/// Environment variable naming an extra directory searched for plugin libraries
pub const PLUGIN_PATH_ENV: &str = "DESKPET_PLUGIN_PATH";

/// Plugin metadata extracted from a shared library
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub role: PluginRole,
    pub abi_version: (u32, u32, u32),
}

/// A loaded plugin library with its vtable
#[cfg(feature = "plugin-system")]
pub struct LoadedPlugin {
    /// The loaded shared library (must outlive every handle it created)
    #[allow(dead_code)]
    library: Library,

    vtable: &'static DeskPetPluginVTable,

    metadata: PluginMetadata,

    path: PathBuf,
}

#[cfg(feature = "plugin-system")]
impl LoadedPlugin {
    pub fn vtable(&self) -> &'static DeskPetPluginVTable {
        self.vtable
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Loaded, not yet instantiated, plugin code
pub enum CodeUnit {
    /// Statically linked factory from the registry
    Builtin(PluginFactory),

    /// Shared library exporting `deskpet_plugin_register`
    #[cfg(feature = "plugin-system")]
    Dynamic(LoadedPlugin),
}

impl CodeUnit {
    pub fn kind(&self) -> &'static str {
        match self {
            CodeUnit::Builtin(_) => "built-in",
            #[cfg(feature = "plugin-system")]
            CodeUnit::Dynamic(_) => "library",
        }
    }

    /// Run the plugin's registration entry point
    ///
    /// Consumes the code unit: a dynamic library is owned by the instance it
    /// produced from then on.
    pub fn instantiate(
        self,
        descriptor: &PluginDescriptor,
        config: &PluginLocalConfig,
    ) -> Result<PluginInstance, PluginError> {
        match self {
            CodeUnit::Builtin(factory) => guarded(|| factory(descriptor, config))?,
            #[cfg(feature = "plugin-system")]
            CodeUnit::Dynamic(plugin) => super::adapter::DynamicPlugin::create(plugin, config),
        }
    }
}

/// Where the plugin manager obtains code and local configuration
///
/// Implementations must not panic; every problem is a typed error.
pub trait PluginSource {
    fn load(&mut self, descriptor: &PluginDescriptor) -> Result<CodeUnit, LoadError>;

    fn local_config(
        &mut self,
        descriptor: &PluginDescriptor,
    ) -> Result<PluginLocalConfig, LocalConfigError> {
        PluginLocalConfig::load(&descriptor.local_config_path())
    }
}

/// Default source: shared libraries on disk first, then built-ins
pub struct DiskSource {
    registry: PluginRegistry,
    search_dirs: Vec<PathBuf>,
}

impl DiskSource {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            search_dirs: PluginLoader::search_paths(),
        }
    }

    /// Replace the extra library directories searched after the plugin's own
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

impl PluginSource for DiskSource {
    fn load(&mut self, descriptor: &PluginDescriptor) -> Result<CodeUnit, LoadError> {
        let dir = descriptor.plugin_dir();
        if !dir.is_dir() {
            return Err(LoadError::MissingDirectory(dir.to_path_buf()));
        }

        #[cfg(feature = "plugin-system")]
        {
            let mut dirs = vec![dir.to_path_buf()];
            dirs.extend(self.search_dirs.iter().cloned());
            if let Some(path) = PluginLoader::find_library(&dirs, &descriptor.name) {
                return PluginLoader::load_library(&path).map(CodeUnit::Dynamic);
            }
        }

        match self.registry.get(&descriptor.name) {
            Some(factory) => {
                debug!("Using built-in plugin {}", descriptor.name);
                Ok(CodeUnit::Builtin(factory))
            }
            None => Err(LoadError::NotFound {
                name: descriptor.name.clone(),
                path: dir.to_path_buf(),
            }),
        }
    }
}

/// Plugin library discovery and loading
pub struct PluginLoader;

impl PluginLoader {
    /// Extra library directories in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Environment variable override
        if let Ok(path) = std::env::var(PLUGIN_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }

        // 2. Development build output
        paths.push(PathBuf::from("./target/release"));
        paths.push(PathBuf::from("./target/debug"));

        // 3. User-local directory
        if let Some(data) = dirs_next::data_local_dir() {
            paths.push(data.join("deskpet/plugins"));
        }

        paths
    }

    /// Possible library filenames for a plugin name
    ///
    /// For "Clock" on Linux: `libClock.so`, `Clock.so`,
    /// `libdeskpet_plugin_clock.so`.
    pub fn plugin_filenames(name: &str) -> Vec<String> {
        let crate_name = format!("deskpet_plugin_{}", name.to_lowercase().replace('-', "_"));
        let mut names = Vec::new();

        #[cfg(target_os = "linux")]
        {
            names.push(format!("lib{}.so", name));
            names.push(format!("{}.so", name));
            names.push(format!("lib{}.so", crate_name));
        }

        #[cfg(target_os = "macos")]
        {
            names.push(format!("lib{}.dylib", name));
            names.push(format!("{}.dylib", name));
            names.push(format!("lib{}.dylib", crate_name));
        }

        #[cfg(target_os = "windows")]
        {
            names.push(format!("{}.dll", name));
            names.push(format!("{}.dll", crate_name));
        }

        names
    }

    /// First existing library for `name` in `dirs`
    pub fn find_library(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
        let filenames = Self::plugin_filenames(name);

        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }

            for filename in &filenames {
                let candidate = dir.join(filename);
                if candidate.is_file() {
                    debug!("Found plugin library at: {}", candidate.display());
                    return Some(candidate);
                }
            }
        }

        None
    }

    /// Load a plugin library from a specific path
    ///
    /// 1. Load the shared library
    /// 2. Get the registration function symbol
    /// 3. Call it to get the vtable
    /// 4. Verify ABI version compatibility
    /// 5. Extract plugin metadata
    #[cfg(feature = "plugin-system")]
    pub fn load_library(path: &Path) -> Result<LoadedPlugin, LoadError> {
        info!("Loading plugin library from: {}", path.display());

        let library_error = |message: String| LoadError::Library {
            path: path.to_path_buf(),
            message,
        };

        let library = unsafe { Library::new(path) }
            .map_err(|e| library_error(format!("failed to load library: {}", e)))?;

        let register_fn: Symbol<PluginRegisterFn> = unsafe { library.get(DESKPET_REGISTER_SYMBOL) }
            .map_err(|e| library_error(format!("failed to find registration function: {}", e)))?;

        let vtable_ptr = register_fn();
        if vtable_ptr.is_null() {
            return Err(library_error("plugin registration returned null vtable".to_string()));
        }

        let vtable: &'static DeskPetPluginVTable = unsafe { &*vtable_ptr };

        let mut major = 0u32;
        let mut minor = 0u32;
        let mut patch = 0u32;
        (vtable.abi_version)(&mut major, &mut minor, &mut patch);

        debug!("Plugin ABI version: {}.{}.{}", major, minor, patch);

        if major != DESKPET_PLUGIN_ABI_VERSION_MAJOR {
            return Err(LoadError::AbiMismatch {
                plugin: format!("{}.{}.{}", major, minor, patch),
                host: format!(
                    "{}.{}.{}",
                    DESKPET_PLUGIN_ABI_VERSION_MAJOR,
                    DESKPET_PLUGIN_ABI_VERSION_MINOR,
                    DESKPET_PLUGIN_ABI_VERSION_PATCH
                ),
            });
        }

        if minor > DESKPET_PLUGIN_ABI_VERSION_MINOR {
            warn!(
                "Plugin has newer minor version {}.{}.{} than host {}.{}.{}",
                major,
                minor,
                patch,
                DESKPET_PLUGIN_ABI_VERSION_MAJOR,
                DESKPET_PLUGIN_ABI_VERSION_MINOR,
                DESKPET_PLUGIN_ABI_VERSION_PATCH
            );
        }

        let mut name_buf = [0 as std::ffi::c_char; DESKPET_PLUGIN_NAME_SIZE];
        let mut version_buf = [0 as std::ffi::c_char; DESKPET_PLUGIN_VERSION_SIZE];
        let mut role_code = u32::MAX;

        (vtable.plugin_info)(name_buf.as_mut_ptr(), version_buf.as_mut_ptr(), &mut role_code);

        let metadata = PluginMetadata {
            name: read_c_string(&name_buf),
            version: read_c_string(&version_buf),
            role: role_from_code(role_code),
            abi_version: (major, minor, patch),
        };

        info!(
            "Loaded plugin library: {} v{} ({})",
            metadata.name, metadata.version, metadata.role
        );

        Ok(LoadedPlugin {
            library,
            vtable,
            metadata,
            path: path.to_path_buf(),
        })
    }
}
