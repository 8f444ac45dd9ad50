//! # script-vfs
//!
//! A namespace-multiplexing virtual filesystem for embedded script runtimes.
//!
//! A plugin's scripts import three kinds of resources through one path-based
//! file API:
//!
//! - **Disk files**: under the plugin's own directory, or any plugin's via `@`
//! - **Inner modules**: read-only modules bundled with the host, via `:name`
//! - **Host classes**: script bindings generated from loaded host classes,
//!   via dotted qualified names
//!
//! The script engine only ever sees [`PluginFileSystem`]; classification,
//! caching and access control happen behind it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use script_vfs::prelude::*;
//!
//! // Once per host
//! let services = HostServices::builder()
//!     .plugin_root("/srv/server/plugins")
//!     .bundle(DirBundle::new("/srv/server/resources"))
//!     .resolver(|name: &str| registry.lookup(name))
//!     .exporter(|class: &ClassRef| -> Result<String, BoxError> { Ok(render(class)) })
//!     .build()
//!     .into_shared();
//!
//! // Once per plugin
//! let fs = PluginFileSystem::new(services.clone(), "/srv/server/plugins/demo", 3);
//!
//! let path = fs.parse_path(":plugin-id");
//! fs.check_access(&path, &[AccessMode::Read], LinkOption::Follow)?;
//! assert_eq!(fs.read_to_string(&path)?, "export const id = 3");
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Process-wide defaults (plugin root, cache budget)
//! - [`classify`]: Import string → [`VirtualPath`]
//! - [`fs`]: The per-plugin facade, channels and attributes
//! - [`provider`]: Disk, inner module and host class providers
//! - [`resource`]: Class cache, inner module cache and bundles
//! - [`services`]: Shared state injected into every facade

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod fs;
pub mod path;
pub mod provider;
pub mod resource;
pub mod services;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
///
/// ```ignore
/// use script_vfs::prelude::*;
/// ```
pub mod prelude {
    // Facade
    pub use crate::{ByteChannel, OpenOptions, PluginFileSystem};

    // Paths
    pub use crate::{AccessMode, LinkOption, VirtualPath};

    // Errors
    pub use crate::{BoxError, VfsError, VfsResult};

    // Host services
    pub use crate::{
        ClassExporter, ClassResolver, DirBundle, HostServices, MapBundle, ModuleBundle,
    };
}

// =============================================================================
// Public API
// =============================================================================

pub use classify::PathClassifier;
pub use config::{Config, ConfigBuilder};
pub use error::{BoxError, VfsError, VfsResult};
pub use fs::{ByteChannel, DirFilter, DirectoryStream, ModuleReader, OpenOptions, PluginFileSystem};
pub use path::{AccessMode, LinkOption, PLUGIN_ID_MODULE, VirtualPath};
pub use resource::class::{ClassCache, ClassExporter, ClassHandle, ClassResolver};
pub use resource::inner::{Content, DirBundle, InnerModuleCache, MapBundle, ModuleBundle, NoBundle};
pub use resource::preload_inner_modules;
pub use services::{HostServices, ServicesBuilder};
