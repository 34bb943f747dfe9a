use nu_ansi_term::Color::{Blue, Cyan};
use repokit_config::{
    config::{config_path, generate_default_config, Config},
    error::ConfigError,
};
use repokit_db::DbConnection;
use tracing::info;

use crate::{
    error::{CliError, CliResult},
    utils::Colored,
};

pub fn def_config() -> CliResult<()> {
    generate_default_config()?;
    Ok(())
}

pub fn print_config(config: &Config) -> CliResult<()> {
    let serialized = toml::to_string_pretty(config).map_err(ConfigError::from)?;
    info!("# {}", config_path().display());
    info!("{}", serialized.trim_end());
    Ok(())
}

/// Name/value pairs describing the resolved project layout.
pub fn layout_entries(config: &Config) -> CliResult<Vec<(&'static str, String)>> {
    let database = config
        .get_database_path()?
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());

    Ok(vec![
        ("Config", config_path().display().to_string()),
        ("Base", config.get_base_path()?.display().to_string()),
        ("Models", config.get_models_path()?.display().to_string()),
        (
            "Repositories",
            config.get_repositories_path()?.display().to_string(),
        ),
        (
            "Interfaces",
            config.get_interfaces_path()?.display().to_string(),
        ),
        (
            "Controllers",
            config.get_controllers_path()?.display().to_string(),
        ),
        ("Database", database),
        ("Models module", config.models_module()),
        ("Repositories module", config.repositories_module()),
        ("Interfaces module", config.interfaces_module()),
    ])
}

pub fn print_env(config: &Config) -> CliResult<()> {
    for (name, value) in layout_entries(config)? {
        info!("{}: {}", Colored(Blue, name), Colored(Cyan, value));
    }
    Ok(())
}

/// Opens `--database` when given, otherwise the configured database.
pub fn open_database(arg: Option<&str>, config: &Config) -> CliResult<DbConnection> {
    let path = match arg {
        Some(path) => repokit_utils::path::resolve_path(path)?,
        None => config.get_database_path()?.ok_or(CliError::NoDatabase)?,
    };
    Ok(DbConnection::open(path)?)
}
