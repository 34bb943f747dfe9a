use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use documented::{Documented, DocumentedFields};
use repokit_utils::{path::resolve_path, string::is_module_path};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
};

pub const DEFAULT_CONFIG_FILE: &str = "repokit.toml";

/// Project layout used by the repository generator
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct Config {
    /// Root directory of the crate sources.
    /// Relative paths are resolved against the working directory.
    /// Default: src
    pub base_path: String,

    /// Module path under which the layout directories live.
    /// Default: crate
    pub namespace: String,

    /// Directory holding the model sources, relative to `base_path`.
    /// Default: models
    pub models_path: String,

    /// Directory receiving generated repositories, relative to `base_path`.
    /// Default: repositories
    pub repositories_path: String,

    /// Directory receiving generated repository traits, relative to `base_path`.
    /// Default: repositories/interfaces
    pub interfaces_path: String,

    /// Directory holding the controllers, relative to `base_path`.
    /// Default: controllers
    pub controllers_path: String,

    /// Optional template file overriding the built-in repository template.
    pub repository_template: Option<String>,

    /// Optional template file overriding the built-in interface template.
    pub interface_template: Option<String>,

    /// SQLite database used by the `find` and `query` commands.
    pub database_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: "src".to_string(),
            namespace: "crate".to_string(),
            models_path: "models".to_string(),
            repositories_path: "repositories".to_string(),
            interfaces_path: "repositories/interfaces".to_string(),
            controllers_path: "controllers".to_string(),
            repository_template: None,
            interface_template: None,
            database_path: None,
        }
    }
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("REPOKIT_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => PathBuf::from(DEFAULT_CONFIG_FILE),
    })
});

/// Overrides the configuration file location.
pub fn set_config_path(path: impl Into<PathBuf>) {
    let mut config_path = CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner);
    *config_path = path.into();
}

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

/// Loads the configuration file into the global slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global_config = Some(config);
    Ok(())
}

/// Returns the loaded configuration, or the defaults when [`init`] has not run.
pub fn get_config() -> Config {
    let config_guard = CONFIG.read().unwrap_or_else(PoisonError::into_inner);
    config_guard.clone().unwrap_or_default()
}

fn validate_sub_path(field: &'static str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let invalid = value.trim().is_empty()
        || path.is_absolute()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if invalid {
        return Err(ConfigError::InvalidSubPath {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn module_suffix(sub_path: &str) -> String {
    Path::new(sub_path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('-', "_")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("::")
}

impl Config {
    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        match fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no configuration at {}, using defaults",
                    config_path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::IoError(err)),
        }
    }

    /// Parses and validates a configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    /// Validates the configuration, normalising trailing separators.
    pub fn resolve(&mut self) -> Result<()> {
        self.namespace = self.namespace.trim().to_string();
        if !is_module_path(&self.namespace) {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }

        for (field, value) in [
            ("models_path", &mut self.models_path),
            ("repositories_path", &mut self.repositories_path),
            ("interfaces_path", &mut self.interfaces_path),
            ("controllers_path", &mut self.controllers_path),
        ] {
            *value = value.trim().trim_end_matches('/').to_string();
            validate_sub_path(field, value)?;
        }

        Ok(())
    }

    pub fn get_base_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("REPOKIT_BASE_PATH") {
            return Ok(resolve_path(&env_path)?);
        }
        Ok(resolve_path(&self.base_path)?)
    }

    pub fn get_models_path(&self) -> Result<PathBuf> {
        Ok(self.get_base_path()?.join(&self.models_path))
    }

    pub fn get_repositories_path(&self) -> Result<PathBuf> {
        Ok(self.get_base_path()?.join(&self.repositories_path))
    }

    pub fn get_interfaces_path(&self) -> Result<PathBuf> {
        Ok(self.get_base_path()?.join(&self.interfaces_path))
    }

    pub fn get_controllers_path(&self) -> Result<PathBuf> {
        Ok(self.get_base_path()?.join(&self.controllers_path))
    }

    pub fn get_database_path(&self) -> Result<Option<PathBuf>> {
        if let Ok(env_path) = std::env::var("REPOKIT_DATABASE") {
            return Ok(Some(resolve_path(&env_path)?));
        }
        self.database_path
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn get_repository_template(&self) -> Result<Option<PathBuf>> {
        self.repository_template
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn get_interface_template(&self) -> Result<Option<PathBuf>> {
        self.interface_template
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    /// Module path of a layout directory, `repositories/interfaces` under
    /// `crate` becomes `crate::repositories::interfaces`.
    pub fn module_path(&self, sub_path: &str) -> String {
        let suffix = module_suffix(sub_path);
        if suffix.is_empty() {
            self.namespace.clone()
        } else {
            format!("{}::{}", self.namespace, suffix)
        }
    }

    pub fn models_module(&self) -> String {
        self.module_path(&self.models_path)
    }

    pub fn repositories_module(&self) -> String {
        self.module_path(&self.repositories_path)
    }

    pub fn interfaces_module(&self) -> String {
        self.module_path(&self.interfaces_path)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;
        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;
        Ok(doc)
    }

    /// Writes the annotated default configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigAlreadyExists`] if `path` exists.
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ConfigError::ConfigAlreadyExists);
        }

        let annotated_doc = Config::default().to_annotated_document()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, annotated_doc.to_string())?;
        Ok(())
    }
}

pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();
    Config::write_default(&config_path)?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}
