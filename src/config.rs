//! Configuration for script-vfs.
//!
//! This module provides process-wide defaults for the plugin filesystem.
//! Use [`ConfigBuilder`] at host startup to point `@` paths at the real
//! plugin directory and to size the inner-module cache.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Global configuration, initialized via [`ConfigBuilder::init`].
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default byte budget of the inner-module cache (4 MiB).
pub const DEFAULT_INNER_CACHE_BUDGET: usize = 4 * 1024 * 1024;

/// Default bundle directory holding inner modules.
pub const DEFAULT_INNER_MODULE_DIR: &str = "inner-module";

/// Runtime configuration for script-vfs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory all plugins are installed under. `@`-prefixed imports
    /// resolve against this directory rather than the importing plugin.
    pub plugin_root: PathBuf,
    /// Bundle directory that inner modules are looked up in.
    pub inner_module_dir: String,
    /// Upper bound, in bytes, of cached inner-module content.
    pub inner_cache_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_root: PathBuf::from("plugins"),
            inner_module_dir: DEFAULT_INNER_MODULE_DIR.to_string(),
            inner_cache_budget: DEFAULT_INNER_CACHE_BUDGET,
        }
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    plugin_root: Option<PathBuf>,
    inner_module_dir: Option<String>,
    inner_cache_budget: Option<usize>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory plugins are installed under.
    ///
    /// Default: `plugins`
    ///
    /// # Example
    ///
    /// ```
    /// use script_vfs::config::ConfigBuilder;
    ///
    /// ConfigBuilder::new()
    ///     .plugin_root("/srv/server/plugins")
    ///     .init();
    /// ```
    pub fn plugin_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugin_root = Some(root.into());
        self
    }

    /// Set the bundle directory inner modules live in.
    ///
    /// Default: `inner-module`
    pub fn inner_module_dir(mut self, dir: impl Into<String>) -> Self {
        self.inner_module_dir = Some(dir.into());
        self
    }

    /// Set the byte budget of the inner-module cache.
    pub fn inner_cache_budget(mut self, bytes: usize) -> Self {
        self.inner_cache_budget = Some(bytes);
        self
    }

    /// Build the configuration without installing it globally.
    pub fn build(self) -> Config {
        let defaults = Config::default();
        Config {
            plugin_root: self.plugin_root.unwrap_or(defaults.plugin_root),
            inner_module_dir: self.inner_module_dir.unwrap_or(defaults.inner_module_dir),
            inner_cache_budget: self.inner_cache_budget.unwrap_or(defaults.inner_cache_budget),
        }
    }

    /// Build and initialize the global configuration.
    ///
    /// This can only be called once. Subsequent calls are ignored.
    /// Returns `true` if configuration was set, `false` if already initialized.
    pub fn init(self) -> bool {
        CONFIG.set(self.build()).is_ok()
    }
}

/// Initialize script-vfs with default configuration.
///
/// This is equivalent to `ConfigBuilder::new().init()`.
pub fn init_default() -> bool {
    ConfigBuilder::new().init()
}

/// Get the current configuration, or default if not initialized.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}
