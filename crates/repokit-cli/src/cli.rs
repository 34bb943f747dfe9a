use clap::{ArgAction, Parser, Subcommand, ValueHint};
use repokit_db::{FilterEntry, OrderBy};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Repository scaffolding and generic data access over SQLite",
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a repository for an existing model
    #[command(arg_required_else_help = true)]
    #[clap(name = "make-repository", visible_alias = "make:repository")]
    MakeRepository {
        /// Model name, e.g. `User` or `crate::models::User`
        #[arg(required = true)]
        model: String,

        /// Also generate a repository trait and implement it
        #[arg(required = false, short, long)]
        interface: bool,
    },

    /// Generate a default, documented repokit.toml
    #[clap(name = "def-config")]
    DefConfig,

    /// Print the effective configuration
    Config,

    /// Print the resolved project layout
    Env,

    /// Query a table through the generic repository
    #[command(arg_required_else_help = true)]
    Find {
        /// Table to read
        #[arg(required = true)]
        table: String,

        /// Filter as `column=value` or `column=value1,value2`
        #[arg(required = false, short = 'w', long = "where")]
        filters: Vec<FilterEntry>,

        /// Sort as `column` or `column:desc`
        #[arg(required = false, short, long = "order")]
        orders: Vec<OrderBy>,

        /// Fetch a single row by primary key
        #[arg(required = false, long, conflicts_with_all = ["filters", "orders", "one"])]
        id: Option<String>,

        /// Only print the first match
        #[arg(required = false, long)]
        one: bool,

        /// Rows per page
        #[arg(required = false, short, long)]
        limit: Option<u32>,

        /// Page number, starting at 1
        #[arg(required = false, short, long, default_value_t = 1)]
        page: u32,

        /// Primary key column
        #[arg(required = false, long, default_value = "id")]
        primary_key: String,

        /// Print the number of matching rows instead of the rows
        #[arg(required = false, long, conflicts_with_all = ["id", "one"])]
        count: bool,

        /// SQLite database file
        #[arg(required = false, short, long, value_hint = ValueHint::FilePath)]
        database: Option<String>,
    },

    /// Run raw SQL
    #[command(arg_required_else_help = true)]
    Query {
        /// SQL statement
        #[arg(required = true)]
        sql: String,

        /// Positional binding for `?` placeholders
        #[arg(required = false, short, long = "bind")]
        bindings: Vec<String>,

        /// Named binding for `:name` placeholders, as `name=value`
        #[arg(required = false, short, long = "param")]
        params: Vec<String>,

        /// Execute a statement that returns no rows
        #[arg(required = false, long)]
        write: bool,

        /// SQLite database file
        #[arg(required = false, short, long, value_hint = ValueHint::FilePath)]
        database: Option<String>,
    },
}
