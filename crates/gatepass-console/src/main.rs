//! gatepass - The visitor pass operator console
//!
//! Entry point for the `gatepass` binary. It wires together:
//! - Configuration loading and CLI overrides
//! - Logging
//! - The console (store, visitor API client, status engine)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gatepass_api::{RegistrationRequest, VisitorType};
use gatepass_config::{load_config, parse_base_url, Settings};
use gatepass_console::{
    classify_passes, read_pass_file, render_audit, render_dashboard, render_list,
    render_pass_card, render_pass_table, render_report, render_scan, render_sync, Console,
    PassCard,
};
use gatepass_util::{default_config_path, parse_instant_arg, PassId, GATEPASS_DATA_DIR_ENV};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// gatepass - Visitor pass status console
#[derive(Parser, Debug)]
#[command(name = "gatepass", version)]
#[command(about = "Visitor pass status console for campus gates", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/gatepass/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory override (or set GATEPASS_DATA_DIR env var)
    #[arg(short, long, global = true, env = GATEPASS_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Visitor API base URL override (or set GATEPASS_API_URL env var)
    #[arg(long, global = true, env = "GATEPASS_API_URL")]
    api_url: Option<String>,

    /// Log level
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify pass records from a JSON file
    Classify {
        /// File holding one pass record or a list of them
        file: PathBuf,

        /// Evaluate at this instant instead of now
        #[arg(long, value_parser = parse_instant_arg)]
        at: Option<DateTime<Utc>>,
    },

    /// Fetch the roster from the visitor API into the local cache
    Sync,

    /// List passes with their current status
    List {
        /// Match name, pass id or host (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Use the cached roster instead of the visitor API
        #[arg(long)]
        offline: bool,
    },

    /// Status counts and distribution
    Report {
        /// Use the cached roster instead of the visitor API
        #[arg(long)]
        offline: bool,
    },

    /// Headline numbers and the most recent passes
    Dashboard {
        /// Use the cached roster instead of the visitor API
        #[arg(long)]
        offline: bool,
    },

    /// Submit scanned QR text to check a visitor in or out
    Scan {
        /// Raw scanned text: the QR JSON payload or a bare pass id
        qr: String,
    },

    /// Register a visitor and print the new pass
    Register {
        /// Visitor's full name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Person the visitor is meeting
        #[arg(long, default_value = "")]
        host: String,

        #[arg(long, default_value = "")]
        purpose: String,

        /// Issue a multi-day pass; requires --valid-until
        #[arg(long, requires = "valid_until")]
        multi_day: bool,

        /// Deadline for a multi-day pass (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_instant_arg)]
        valid_until: Option<DateTime<Utc>>,

        /// Print only the QR payload
        #[arg(long)]
        qr: bool,
    },

    /// Show one pass with its QR payload
    Pass {
        pass_id: String,

        /// Use the cached roster instead of the visitor API
        #[arg(long)]
        offline: bool,

        /// Print only the QR payload
        #[arg(long)]
        qr: bool,
    },

    /// Show recent audit events
    Audit {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?
            } else {
                debug!(config_path = %path.display(), "No config file, using defaults");
                Settings::default()
            }
        }
    };

    if let Some(data_dir) = &args.data_dir {
        settings.console.data_dir = data_dir.clone();
    }
    if let Some(api_url) = &args.api_url {
        let url = parse_base_url(api_url)
            .map_err(|e| anyhow::anyhow!("Invalid --api-url {:?}: {}", api_url, e))?;
        settings.api.base_url = Some(url);
    }

    Ok(settings)
}

fn emit_card(json: bool, qr_only: bool, card: &PassCard) -> Result<()> {
    if qr_only {
        println!("{}", card.qr_text);
        return Ok(());
    }
    emit(json, card, render_pass_card)
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for command output
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "gatepass starting");

    // Read the clock once; every command evaluates against this instant
    let now = gatepass_util::now();
    if gatepass_util::is_mock_time_active() {
        info!(now = %now, "Using mock time");
    }

    if let Command::Classify { file, at } = &args.command {
        let passes = read_pass_file(file)?;
        let views = classify_passes(&passes, at.unwrap_or(now));
        return emit(args.json, &views, |v| render_pass_table(v));
    }

    let settings = load_settings(&args)?;
    let console = Console::open(settings)?;
    if !matches!(args.command, Command::Audit { .. }) {
        console.record_start()?;
    }

    match &args.command {
        Command::Classify { .. } => Ok(()),
        Command::Sync => {
            let report = console.sync().await?;
            info!(pass_count = report.pass_count, "Sync complete");
            emit(args.json, &report, render_sync)
        }
        Command::List {
            search,
            page,
            offline,
        } => {
            let list = console.list(search.as_deref(), *page, *offline, now).await?;
            emit(args.json, &list, render_list)
        }
        Command::Report { offline } => {
            let report = console.report(*offline, now).await?;
            emit(args.json, &report, render_report)
        }
        Command::Dashboard { offline } => {
            let dashboard = console.dashboard(*offline, now).await?;
            emit(args.json, &dashboard, render_dashboard)
        }
        Command::Scan { qr } => {
            let outcome = console.scan(qr, now).await?;
            emit(args.json, &outcome, render_scan)
        }
        Command::Register {
            name,
            phone,
            host,
            purpose,
            multi_day,
            valid_until,
            qr,
        } => {
            let visitor_type = if *multi_day {
                VisitorType::MultiDay
            } else {
                VisitorType::OneDay
            };
            let mut request = RegistrationRequest::new(name.as_str(), visitor_type)
                .with_phone(phone.as_str())
                .with_host(host.as_str(), purpose.as_str());
            if let Some(valid_until) = valid_until {
                request = request.with_valid_until(*valid_until);
            }
            let card = console.register(request, now).await?;
            emit_card(args.json, *qr, &card)
        }
        Command::Pass {
            pass_id,
            offline,
            qr,
        } => {
            let card = console
                .pass(&PassId::new(pass_id.trim()), *offline, now)
                .await?;
            emit_card(args.json, *qr, &card)
        }
        Command::Audit { limit } => {
            let events = console.audit_log(*limit)?;
            emit(args.json, &events, |e| render_audit(e))
        }
    }
}
