use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pictodex::config::{Config, ConfigFile};
use pictodex::core::FailurePolicy;
use pictodex::logging::init_logging;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "pictodex", version, about = "Index images by content and look up their classes")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Config file (default: `~/.pictodex/config.toml` if it exists)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file (default: `~/.pictodex/pictodex.db`)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Stop at the first unreadable file instead of skipping it
    #[arg(long, global = true)]
    abort_on_error: bool,

    /// Log level or flexi_logger spec, e.g. `debug`
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Only log to the console
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index new images, then print class -> current paths
    Classify(ScanArgs),

    /// Index new images without resolving paths
    Index(ScanArgs),

    /// Resolve stored classes to current paths without indexing
    Lookup(ScanArgs),

    /// Print every stored (hash, class) record
    List {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan (default: home directory)
    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = match &cli.command {
        Commands::Classify(args) | Commands::Index(args) | Commands::Lookup(args) => {
            args.root.clone()
        }
        Commands::List { .. } => None,
    };
    let config = build_config(&cli.global, root)?;

    let _logger = init_logging(&config).context("Failed to start logging")?;

    match cli.command {
        Commands::Classify(args) => {
            let index = with_spinner("Classifying images…", || pictodex::classify_path(&config))?;
            print_json(&index, args.pretty)?;
        }
        Commands::Index(_) => {
            let report = with_spinner("Indexing images…", || pictodex::index_path(&config))?;
            println!("✅ {}", report);
        }
        Commands::Lookup(args) => {
            let index = with_spinner("Resolving stored classes…", || pictodex::lookup(&config))?;
            print_json(&index, args.pretty)?;
        }
        Commands::List { pretty } => {
            let records = pictodex::list_records(&config)?;
            print_json(&records, pretty)?;
        }
    }

    Ok(())
}

/// Defaults, then the config file, then command-line flags.
fn build_config(args: &GlobalArgs, root: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::from_home()?;

    let config_file = args
        .config
        .clone()
        .or_else(|| Some(config.default_config_file()).filter(|p| p.exists()));
    if let Some(path) = config_file {
        config.merge(ConfigFile::load(&path)?);
    }

    if let Some(root) = root {
        config.root = root;
    }
    if let Some(db) = &args.db {
        config.database_path = Some(db.clone());
    }
    if args.abort_on_error {
        config.failure_policy = FailurePolicy::Abort;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if args.no_log_file {
        config.log_to_file = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run `f` behind a spinner and report how long it took.
fn with_spinner<T, F>(message: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> pictodex::Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let result = f();
    spinner.finish_and_clear();

    let value = result?;
    log::info!("⏱ {} took {:.2?}", message.trim_end_matches('…'), start.elapsed());
    Ok(value)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
