mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{cmd_batch, cmd_inspect, cmd_query, cmd_validate};

#[derive(Parser)]
#[command(name = "ip17mon")]
#[command(
    about = "IPv4 geolocation lookups against 17mon databases",
    long_about = "ip17mon - Fast IPv4 geolocation lookups against 17mon-format databases\n\n\
    Resolves IPv4 addresses to country, region, city and ISP using a\n\
    read-only binary database loaded once into memory.\n\n\
    Examples:\n\
      ip17mon query 17monipdb.dat 115.231.237.124\n\
      ip17mon query 17monipdb.dat 8.8.8.8 1.1.1.1 --json\n\
      ip17mon batch 17monipdb.dat addresses.txt.gz > results.ndjson\n\
      ip17mon inspect 17monipdb.dat\n\
      ip17mon validate 17monipdb.dat"
)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more IPv4 addresses
    Query {
        /// Path to the 17mon database (.dat, optionally .gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Addresses to look up
        #[arg(value_name = "IP", required = true)]
        ips: Vec<String>,

        /// Output a JSON array instead of tab-separated lines
        #[arg(short, long)]
        json: bool,

        /// Quiet mode - no output, only exit code (0 = all found, 1 = any invalid)
        #[arg(short, long)]
        quiet: bool,

        /// Read the database into memory instead of memory-mapping it
        #[arg(long)]
        in_memory: bool,
    },

    /// Look up addresses read line by line from files or stdin
    Batch {
        /// Path to the 17mon database (.dat, optionally .gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Files with one address per line (.gz supported), or "-" for stdin
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Read the database into memory instead of memory-mapping it
        #[arg(long)]
        in_memory: bool,
    },

    /// Inspect a database's layout
    Inspect {
        /// Path to the 17mon database (.dat, optionally .gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a database file for structural consistency
    Validate {
        /// Path to the 17mon database (.dat, optionally .gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Query {
            database,
            ips,
            json,
            quiet,
            in_memory,
        } => cmd_query(database, ips, json, quiet, in_memory),
        Commands::Batch {
            database,
            inputs,
            in_memory,
        } => cmd_batch(database, inputs, in_memory),
        Commands::Inspect { database, json } => cmd_inspect(database, json),
        Commands::Validate { database, json } => cmd_validate(database, json),
    }
}
