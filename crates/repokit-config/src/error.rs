use miette::Diagnostic;
use repokit_utils::error::{FileSystemError, PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(repokit_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(repokit_config::toml_deserialize),
        help("Check your repokit.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(repokit_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid namespace: `{0}`")]
    #[diagnostic(
        code(repokit_config::invalid_namespace),
        help("Use a Rust module path such as `crate` or `crate::app`")
    )]
    InvalidNamespace(String),

    #[error("Invalid value for `{field}`: `{value}`")]
    #[diagnostic(
        code(repokit_config::invalid_sub_path),
        help("Layout directories must be non-empty paths relative to `base_path` without `..`")
    )]
    InvalidSubPath { field: &'static str, value: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(repokit_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(repokit_config::utils))]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(repokit_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(repokit_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
