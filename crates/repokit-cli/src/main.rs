use clap::Parser;
use cli::Args;
use error::CliResult;
use find::FindOptions;
use generate::{make_repository, Layout};
use logging::setup_logging;
use miette::MietteHandlerOpts;
use repokit_config::config::{self, get_config, set_config_path, Config};
use repokit_utils::path::resolve_path;
use tracing::debug;
use utils::set_color;

mod cli;
mod error;
mod find;
mod generate;
mod logging;
mod project;
mod query;
mod utils;

fn load_config() -> CliResult<Config> {
    config::init()?;
    Ok(get_config())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args)?;
    set_color(!args.no_color);

    if let Some(ref path) = args.config {
        set_config_path(resolve_path(path)?);
    }

    debug!("Starting repokit");

    match args.command {
        cli::Commands::MakeRepository {
            model,
            interface,
        } => {
            let layout = Layout::from_config(&load_config()?)?;
            make_repository(&layout, &model, interface)?;
        }
        cli::Commands::DefConfig => project::def_config()?,
        cli::Commands::Config => project::print_config(&load_config()?)?,
        cli::Commands::Env => project::print_env(&load_config()?)?,
        cli::Commands::Find {
            table,
            filters,
            orders,
            id,
            one,
            limit,
            page,
            primary_key,
            count,
            database,
        } => {
            let conn = project::open_database(database.as_deref(), &load_config()?)?;
            let options = FindOptions {
                table,
                filters,
                orders,
                id,
                one,
                limit,
                page,
                primary_key,
                count,
            };
            find::find(conn, &options)?;
        }
        cli::Commands::Query {
            sql,
            bindings,
            params,
            write,
            database,
        } => {
            let conn = project::open_database(database.as_deref(), &load_config()?)?;
            query::query(&conn, &sql, &bindings, &params, write)?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
