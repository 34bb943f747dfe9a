use std::path::PathBuf;

use miette::Diagnostic;
use repokit_config::error::ConfigError;
use repokit_db::DbError;
use repokit_utils::error::{FileSystemError, PathError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error("Invalid model name: `{0}`")]
    #[diagnostic(
        code(repokit_cli::invalid_model_name),
        help("Model names are UpperCamelCase identifiers such as `User` or `BlogPost`")
    )]
    InvalidModelName(String),

    #[error("Model `{model}` not found at `{}`", path.display())]
    #[diagnostic(
        code(repokit_cli::model_not_found),
        help("Create the model first or check `models_path` in repokit.toml")
    )]
    ModelNotFound { model: String, path: PathBuf },

    #[error("Failed to render template `{name}`")]
    #[diagnostic(
        code(repokit_cli::template),
        help("Check the template syntax of the configured override")
    )]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("No database configured")]
    #[diagnostic(
        code(repokit_cli::no_database),
        help("Pass --database, set REPOKIT_DATABASE or add `database_path` to repokit.toml")
    )]
    NoDatabase,

    #[error("Positional and named bindings cannot be mixed")]
    #[diagnostic(code(repokit_cli::mixed_bindings))]
    MixedBindings,

    #[error("Invalid named binding: `{0}`")]
    #[diagnostic(
        code(repokit_cli::invalid_binding),
        help("Named bindings are written as `name=value`")
    )]
    InvalidBinding(String),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(repokit_cli::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to set up logging: {0}")]
    #[diagnostic(code(repokit_cli::logging))]
    Logging(String),

    #[error("IO error while {action}")]
    #[diagnostic(code(repokit_cli::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
