//! entiql CLI
//!
//! Command-line tools for looking at compiled queries without a database.
//!
//! # Commands
//!
//! - `render` - Compile a filtered query against a table and show its SQL
//! - `count` - Show the statement `count()` would issue for the same query
//! - `fragment` - Render one filter expression in one or every dialect
//! - `dialects` - List supported database products

mod commands;
mod expr;

use clap::{Args, Parser, Subcommand};
use entiql_core::DbmsType;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// entiql query compilation tools.
#[derive(Parser)]
#[command(name = "entiql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON manager configuration
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Database product (generic, mysql, postgresql, sqlite)
    #[arg(global = true, short, long)]
    dbms: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// A query against one table.
#[derive(Args)]
struct QueryArgs {
    /// Table name, optionally schema-qualified
    #[arg(short, long)]
    table: String,

    /// Columns in select order; `field:db_name` renames
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    /// Filter expression; repeat for several filter stages
    #[arg(short = 'w', long = "where")]
    filters: Vec<String>,

    /// Skip this many results
    #[arg(long)]
    skip: Option<usize>,

    /// Return at most this many results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

impl QueryArgs {
    fn into_request(self, count: bool) -> (commands::explain::Request, String) {
        let request = commands::explain::Request {
            table: self.table,
            columns: self.columns,
            filters: self.filters,
            skip: self.skip,
            limit: self.limit,
            count,
        };
        (request, self.format)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query and show its SQL, binds and in-memory stages
    Render(QueryArgs),

    /// Show the statement `count()` would issue for a query
    Count(QueryArgs),

    /// Render one filter expression as a SQL fragment
    Fragment {
        /// Filter expression, e.g. "age >= 18"
        expression: String,

        /// Database column name, if different from the field name
        #[arg(long)]
        column: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List supported database products
    Dialects {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.dbms.as_deref())?;
            let (request, format) = args.into_request(false);
            commands::explain::run(config, &request, &format)?;
        }
        Commands::Count(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.dbms.as_deref())?;
            let (request, format) = args.into_request(true);
            commands::explain::run(config, &request, &format)?;
        }
        Commands::Fragment {
            expression,
            column,
            format,
        } => {
            let dbms = cli.dbms.as_deref().map(str::parse::<DbmsType>).transpose()?;
            commands::fragment::run(&expression, column.as_deref(), dbms, &format)?;
        }
        Commands::Dialects { format } => commands::dialects::run(&format)?,
    }

    Ok(())
}
