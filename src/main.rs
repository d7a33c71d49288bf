// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repairbase CLI - reference desk for an Apple device repair shop

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use repairbase::calculator::Region;
use repairbase::commands::{self, AppContext};
use repairbase::config::{self, Config};
use repairbase::healer::{ErrorContext, Healer};
use repairbase::output::Output;
use repairbase::pricing::Currency;
use repairbase::search::DeviceQuery;
use repairbase::watchlist::ListKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repairbase")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "REPAIRBASE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// State directory override (error log, watchlists)
    #[arg(long, env = "REPAIRBASE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Dataset directory or http(s) base URL
    #[arg(long, env = "REPAIRBASE_DATASET", global = true)]
    dataset: Option<String>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List devices
    Devices {
        /// Match name, processor or board number
        #[arg(short, long)]
        search: Option<String>,

        /// Exact category
        #[arg(long)]
        category: Option<String>,

        /// Release year
        #[arg(long)]
        year: Option<u16>,
    },

    /// Show one device with part prices and ICs
    Device {
        /// Device name
        name: String,
    },

    /// List device categories
    Categories,

    /// Part prices of a device
    Parts {
        /// Device name
        device: String,

        /// Pricing region (ua, eu)
        #[arg(short, long)]
        region: Option<Region>,
    },

    /// IC compatibility lookup
    Ic {
        /// Action: search, show, device
        action: String,

        /// Search text, IC name, or device name
        query: Option<String>,

        /// Category filter (search)
        #[arg(long)]
        category: Option<String>,
    },

    /// List or search error codes
    Errors {
        /// Search text
        query: Option<String>,
    },

    /// Show one error code
    Error {
        /// Error code
        code: String,
    },

    /// Diagnostic references
    Diag {
        /// Action: rails, keys, region
        action: String,

        /// Board/device, search text, or model/region code
        query: Option<String>,
    },

    /// Quote a repair
    Calc {
        /// Device name
        device: String,

        /// Part type to replace (repeatable)
        #[arg(short = 'p', long = "repair", required = true)]
        repairs: Vec<String>,

        /// Labor per line item
        #[arg(long)]
        labor: Option<f64>,

        /// Margin in percent
        #[arg(long)]
        margin: Option<f64>,

        /// Pricing region (ua, eu)
        #[arg(short, long)]
        region: Option<Region>,
    },

    /// Convert between UAH, USD and EUR at the configured rates
    Convert {
        /// Amount
        amount: f64,

        /// Source currency
        from: Currency,

        /// Target currency
        to: Currency,
    },

    /// Error log and fix suggestions
    Healer {
        /// Action: log, clear, match
        action: String,

        /// Error message (match)
        message: Option<String>,
    },

    /// Power-station price tracker
    Tracker {
        /// Action: stations, live, history, record, watch
        action: String,

        /// Station id
        #[arg(long)]
        id: Option<String>,

        /// EU shop price
        #[arg(long)]
        price_eu: Option<f64>,

        /// Amazon.de price
        #[arg(long)]
        amazon_de: Option<f64>,

        /// UA shop price
        #[arg(long)]
        price_ua: Option<f64>,

        /// Price source label
        #[arg(long)]
        source: Option<String>,

        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,

        /// Number of polls (0 = until Ctrl-C)
        #[arg(long, default_value_t = 0)]
        count: u32,
    },

    /// Manage watch and buy lists
    Watch {
        /// Action: add, remove, list, clear
        action: String,

        /// List: watch, buy
        #[arg(default_value = "watch")]
        list: ListKind,

        /// Item (device, article, station id)
        item: Option<String>,

        /// Note (add)
        #[arg(long)]
        note: Option<String>,
    },

    /// Dataset load status
    Status,

    /// Get or set configuration
    Config {
        /// Action: show, get, set, path
        action: String,

        /// Configuration key (dotted, e.g. rates.usd_to_uah)
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Component and action names recorded in the error log
    fn context(&self) -> ErrorContext {
        match self {
            Self::Devices { .. } => ErrorContext::new("devices", None),
            Self::Device { .. } => ErrorContext::new("device", None),
            Self::Categories => ErrorContext::new("categories", None),
            Self::Parts { .. } => ErrorContext::new("parts", None),
            Self::Ic { action, .. } => ErrorContext::new("ic", Some(action)),
            Self::Errors { .. } => ErrorContext::new("errors", None),
            Self::Error { .. } => ErrorContext::new("error", None),
            Self::Diag { action, .. } => ErrorContext::new("diag", Some(action)),
            Self::Calc { .. } => ErrorContext::new("calc", None),
            Self::Convert { .. } => ErrorContext::new("convert", None),
            Self::Healer { action, .. } => ErrorContext::new("healer", Some(action)),
            Self::Tracker { action, .. } => ErrorContext::new("tracker", Some(action)),
            Self::Watch { action, .. } => ErrorContext::new("watch", Some(action)),
            Self::Status => ErrorContext::new("status", None),
            Self::Config { action, .. } => ErrorContext::new("config", Some(action)),
            Self::Completions { .. } => ErrorContext::new("completions", None),
        }
    }
}

fn init_logging(verbose: u8, quiet: bool, configured: &str) {
    let level = match verbose {
        0 if quiet => "error",
        0 => configured,
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over flags and config
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Devices { search, category, year } => {
            commands::devices::list(ctx, DeviceQuery { text: search, category, year }).await
        }
        Commands::Device { name } => commands::devices::show(ctx, &name).await,
        Commands::Categories => commands::devices::categories(ctx).await,
        Commands::Parts { device, region } => commands::parts::run(ctx, &device, region).await,
        Commands::Ic { action, query, category } => {
            commands::ic::run(ctx, &action, query, commands::ic::IcArgs { category }).await
        }
        Commands::Errors { query } => commands::diag::error_codes(ctx, query).await,
        Commands::Error { code } => commands::diag::error_code(ctx, &code).await,
        Commands::Diag { action, query } => commands::diag::run(ctx, &action, query).await,
        Commands::Calc { device, repairs, labor, margin, region } => {
            let args = commands::calc::CalcArgs { repairs, labor, margin, region };
            commands::calc::run(ctx, &device, args).await
        }
        Commands::Convert { amount, from, to } => commands::calc::convert(ctx, amount, from, to),
        Commands::Healer { action, message } => commands::healer::run(ctx, &action, message),
        Commands::Tracker { action, id, price_eu, amazon_de, price_ua, source, interval, count } => {
            let args = commands::tracker::TrackerArgs {
                id,
                price_eu,
                amazon_de,
                price_ua,
                source,
                interval,
                count,
            };
            commands::tracker::run(ctx, &action, args).await
        }
        Commands::Watch { action, list, item, note } => {
            commands::watch::run(ctx, &action, list, item, note)
        }
        Commands::Status => commands::status::run(ctx).await,
        Commands::Config { action, key, value } => commands::config::run(ctx, &action, key, value),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => fail_parse(&err),
    };

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let loaded = config::load(&config_path);

    let configured_level = loaded.as_ref().map_or("info", |c| c.log_level.as_str()).to_string();
    init_logging(cli.verbose, cli.quiet, &configured_level);

    // Command-line flags override every config layer
    let mut config = match loaded {
        Ok(config) => config,
        Err(err) => {
            let state_dir = cli.data_dir.clone().unwrap_or_else(|| Config::default().data_dir);
            report_failure(&state_dir, &err, ErrorContext::new("config", Some("load")));
            return Err(err);
        }
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dataset) = cli.dataset {
        config.dataset = dataset;
    }

    let ctx = AppContext {
        config,
        config_path,
        out: Output::new(cli.json, cli.no_color),
    };

    let error_context = cli.command.context();
    let result = dispatch(&ctx, cli.command).await;

    if let Err(err) = &result {
        report_failure(&ctx.config.data_dir, err, error_context);
    }
    result
}

/// Log a failed command and print the suggested fix, if any
fn report_failure(state_dir: &Path, err: &anyhow::Error, context: ErrorContext) {
    let mut healer = Healer::open(state_dir);
    if let Some(fix) = healer.report(err, context) {
        eprintln!("hint ({}): {}", fix.severity, fix.suggestion);
    }
}

/// Print a command-line error, log it like any other failure, and exit
fn fail_parse(err: &clap::Error) -> ! {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        err.exit();
    }

    // Flags are not parsed yet, so the state dir comes from config and environment only
    let config_path = std::env::var_os("REPAIRBASE_CONFIG").map_or_else(config::default_path, PathBuf::from);
    let state_dir = config::load(&config_path).map_or_else(|_| Config::default().data_dir, |c| c.data_dir);

    let _ = err.print();
    report_failure(&state_dir, &anyhow::Error::msg(err.to_string()), ErrorContext::new("cli", None));
    std::process::exit(err.exit_code());
}
