//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CRM_ROOT_FOLDER`, then `CRM_ROOT`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is never an error unless it was named explicitly.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "CRM_ROOT_FOLDER";

/// Fallback root folder environment variable
pub const ROOT_ENV: &str = "CRM_ROOT";

const DEFAULT_CORE_DATABASE: &str = "core.db";
const DEFAULT_WORKSPACES_DIR: &str = "workspaces";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data root holding the core database and workspace partitions
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Core database file name, relative to the root folder
    #[serde(default = "default_core_database")]
    pub core_database: String,

    /// Directory holding one database file per workspace, relative to the root folder
    #[serde(default = "default_workspaces_dir")]
    pub workspaces_dir: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            core_database: default_core_database(),
            workspaces_dir: default_workspaces_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_core_database() -> String {
    DEFAULT_CORE_DATABASE.to_string()
}

fn default_workspaces_dir() -> String {
    DEFAULT_WORKSPACES_DIR.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
        }
    }
}

fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/crm-dedup (or /var/lib/crm-dedup for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("crm-dedup"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/crm-dedup"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("crm-dedup"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/crm-dedup"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("crm-dedup"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\crm-dedup"))
    } else {
        PathBuf::from("./crm_data")
    }
}

/// Resolves the data root folder for one tool
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            config_file: None,
        }
    }

    /// Root folder given on the command line, if any
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Explicit config file; replaces the per-module default location
    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// Config file path: explicit, else `<config_dir>/crm/<module>.toml`
    pub fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_file {
            return Some(path.clone());
        }
        dirs::config_dir().map(|d| d.join("crm").join(format!("{}.toml", self.module_name)))
    }

    /// Load the TOML config
    ///
    /// Returns `Ok(None)` when the default config file does not exist. An
    /// explicitly named file that is missing or malformed is an error.
    pub fn load_config(&self) -> Result<Option<TomlConfig>> {
        let Some(path) = self.config_file_path() else {
            return Ok(None);
        };

        if !path.exists() {
            if self.config_file.is_some() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(None);
        }

        load_toml_config(&path).map(Some)
    }

    /// Resolve root folder against an already loaded config
    pub fn resolve_with(&self, config: Option<&TomlConfig>) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variables
        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        // Priority 3: TOML config file
        if let Some(root_folder) = config.and_then(|c| c.root_folder.clone()) {
            return root_folder;
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Data layout under a resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
    core_database: String,
    workspaces_dir: String,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self {
            root_folder,
            core_database: default_core_database(),
            workspaces_dir: default_workspaces_dir(),
        }
    }

    /// Take file and directory names from the config
    pub fn with_config(mut self, config: &TomlConfig) -> Self {
        self.core_database = config.core_database.clone();
        self.workspaces_dir = config.workspaces_dir.clone();
        self
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder and the workspaces directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.workspaces_path())?;
        Ok(())
    }

    pub fn core_database_path(&self) -> PathBuf {
        self.root_folder.join(&self.core_database)
    }

    /// Whether the core database has been provisioned
    pub fn core_database_exists(&self) -> bool {
        self.core_database_path().exists()
    }

    pub fn workspaces_path(&self) -> PathBuf {
        self.root_folder.join(&self.workspaces_dir)
    }

    /// Database file of one workspace partition
    ///
    /// Workspace ids become file names, so only ASCII alphanumerics, `-`
    /// and `_` are accepted.
    pub fn workspace_database_path(&self, workspace_id: &str) -> Result<PathBuf> {
        let valid = !workspace_id.is_empty()
            && workspace_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::InvalidInput(format!(
                "Invalid workspace id: {:?}",
                workspace_id
            )));
        }
        Ok(self.workspaces_path().join(format!("{}.db", workspace_id)))
    }
}
