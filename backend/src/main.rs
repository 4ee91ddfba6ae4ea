//! Reportgen CLI - feed/reference reports from expression rules
//!
//! # Main Commands
//!
//! ```bash
//! reportgen serve                                # HTTP trigger + hourly run (port 8080)
//! reportgen generate feed.csv reference.xlsx \
//!     --reference-format xlsx                    # One run, writes output.csv
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! reportgen eval "max(field1, refdata1)" --feed field1=3 --reference refdata1=7
//! reportgen rules                                # Show the loaded rule set
//! ```

use clap::{Parser, Subcommand};
use reportgen::{
    api::{start_server, AppState},
    evaluate, generate_report, ReportConfig, ReportRequest, Row, RuleSet, Scheduler,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reportgen")]
#[command(about = "Generate reports from feed and reference files with expression rules", long_about = None)]
struct Cli {
    /// Rules JSON file (default: $REPORT_RULES_PATH or rules.json)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server and the hourly scheduled run
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Disable the hourly scheduled run
        #[arg(long)]
        no_schedule: bool,
    },

    /// Run one report
    Generate {
        /// Feed file
        feed: PathBuf,

        /// Reference file
        reference: PathBuf,

        /// Feed format: csv, xls or xlsx
        #[arg(long, default_value = "csv")]
        feed_format: String,

        /// Reference format: csv, xls or xlsx
        #[arg(long, default_value = "csv")]
        reference_format: String,

        /// Report file (default: $REPORT_OUTPUT_PATH or output.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate one expression against inline values
    Eval {
        /// Expression, e.g. "field1+refdata2"
        expression: String,

        /// Feed value as column=value (repeatable)
        #[arg(long = "feed", value_parser = parse_pair)]
        feed: Vec<(String, String)>,

        /// Reference value as column=value (repeatable)
        #[arg(long = "reference", value_parser = parse_pair)]
        reference: Vec<(String, String)>,
    },

    /// Show the loaded rule set
    Rules,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reportgen=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            no_schedule,
        } => cmd_serve(cli.rules, port, host, no_schedule).await,

        Commands::Generate {
            feed,
            reference,
            feed_format,
            reference_format,
            output,
        } => cmd_generate(
            cli.rules,
            &feed,
            &reference,
            feed_format,
            reference_format,
            output,
        ),

        Commands::Eval {
            expression,
            feed,
            reference,
        } => cmd_eval(&expression, feed, reference),

        Commands::Rules => cmd_rules(cli.rules),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    rules_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    no_schedule: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ReportConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if no_schedule {
        config.schedule.enabled = false;
    }

    let rules = Arc::new(load_rules(rules_path, &config)?);

    if config.schedule.enabled {
        Scheduler::hourly(
            config.schedule.request.clone(),
            rules.clone(),
            config.output_path.clone(),
        )
        .spawn();
    }

    let state = AppState {
        rules,
        output_path: config.output_path.clone(),
    };
    start_server(&config.bind_address(), state).await?;
    Ok(())
}

fn cmd_generate(
    rules_path: Option<PathBuf>,
    feed: &Path,
    reference: &Path,
    feed_format: String,
    reference_format: String,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportConfig::from_env()?;
    let rules = load_rules(rules_path, &config)?;
    let output = output.unwrap_or(config.output_path);

    let request = ReportRequest::new(
        feed.to_string_lossy(),
        reference.to_string_lossy(),
        feed_format,
        reference_format,
    );
    let summary = generate_report(&request, &rules, &output)?;

    eprintln!(
        "✨ {} rows written to {} ({} error fields)",
        summary.output_rows,
        output.display(),
        summary.error_fields
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_eval(
    expression: &str,
    feed: Vec<(String, String)>,
    reference: Vec<(String, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let feed: Row = feed.into_iter().collect();
    let reference: Row = reference.into_iter().collect();

    println!("{}", evaluate(expression, &feed, &reference));
    Ok(())
}

fn cmd_rules(rules_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportConfig::from_env()?;
    let rules = load_rules(rules_path, &config)?;

    for field in rules.missing() {
        eprintln!("⚠️  No rule for {}", field);
    }
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

fn load_rules(
    rules_path: Option<PathBuf>,
    config: &ReportConfig,
) -> Result<RuleSet, Box<dyn std::error::Error>> {
    let path = rules_path.unwrap_or_else(|| config.rules_path.clone());
    eprintln!("📋 Rules: {}", path.display());
    Ok(RuleSet::load(&path)?)
}

/// Parse a `column=value` pair
fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}
