use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use vigil::config::Config;
use vigil::output::terminal;
use vigil::pipeline::aggregate::{self, AggregateParams};
use vigil::pipeline::{scan_all, scan_source, SourceRegistry};
use vigil::sources::SourceKind;

/// Vigil: harassment and abuse content scanning.
///
/// Pulls the freshest posts, tweets, videos and news articles from each
/// configured platform and flags harassment/abuse content with a
/// keyword and pattern detector.
#[derive(Parser)]
#[command(name = "vigil", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON API server
    #[cfg(feature = "web")]
    Serve {
        /// Listen port (default: PORT env var, then 5000)
        #[arg(long)]
        port: Option<u16>,

        /// Bind address (default: VIGIL_BIND env var, then 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Scan a single source
    Scan {
        /// Which platform to scan
        #[arg(value_enum)]
        source: SourceKind,

        /// Search query (every source except reddit)
        #[arg(long)]
        query: Option<String>,

        /// Subreddit name (reddit only)
        #[arg(long)]
        subreddit: Option<String>,

        /// Max items to fetch (default: per-source config)
        #[arg(long)]
        limit: Option<u32>,

        /// Print the raw JSON envelope
        #[arg(long)]
        json: bool,
    },

    /// Scan every configured source and merge the results
    ScanAll {
        /// Search query for every source except reddit
        #[arg(long, default_value = aggregate::DEFAULT_QUERY)]
        query: String,

        /// Subreddit for the reddit source
        #[arg(long, default_value = aggregate::DEFAULT_SUBREDDIT)]
        subreddit: String,

        /// Max items per source (default: 20)
        #[arg(long, default_value_t = aggregate::DEFAULT_LIMIT)]
        limit: u32,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Run the detector on a piece of text
    Analyze {
        /// The text to classify
        text: String,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Show which sources have credentials configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vigil=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            vigil::web::run_server(config, port, &bind).await?;
        }

        Commands::Scan {
            source,
            query,
            subreddit,
            limit,
            json,
        } => {
            let config = Arc::new(Config::load()?);
            if source.takes_subreddit() && query.is_some() {
                warn!("--query is ignored for reddit; use --subreddit");
            }
            let subject = if source.takes_subreddit() { subreddit } else { query };
            let params = vigil::models::ScanParams::new(
                subject.unwrap_or_else(|| source.default_subject().to_string()),
                limit.unwrap_or_else(|| config.default_limit(source)),
            );

            let registry = SourceRegistry::new(Arc::clone(&config));
            let spinner = spinner(&format!("Scanning {}...", source.display_name()))?;

            let outcome = tokio::select! {
                outcome = scan_source(&registry, source, &params) => outcome,
                _ = tokio::signal::ctrl_c() => {
                    spinner.finish_and_clear();
                    println!("{}", "Scan cancelled.".yellow());
                    return Ok(());
                }
            };
            spinner.finish_and_clear();

            let envelope = outcome.into_envelope();
            if json {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                terminal::display_envelope(&envelope);
            }
            if !envelope.success {
                anyhow::bail!("{} scan failed", envelope.service);
            }
        }

        Commands::ScanAll {
            query,
            subreddit,
            limit,
            json,
        } => {
            let config = Arc::new(Config::load()?);
            let registry = SourceRegistry::new(config);
            let params = AggregateParams {
                query,
                subreddit,
                limit,
            };

            let spinner = spinner("Scanning all sources...")?;
            let report = tokio::select! {
                report = scan_all(&registry, &params) => report,
                _ = tokio::signal::ctrl_c() => {
                    spinner.finish_and_clear();
                    println!("{}", "Scan cancelled.".yellow());
                    return Ok(());
                }
            };
            spinner.finish_and_clear();
            info!(
                total_threats = report.total_threats_found,
                "Aggregate scan finished"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_report(&report);
            }
        }

        Commands::Analyze { text, json } => {
            let result = vigil::detector::analyze(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_analysis(&result);
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            vigil::status::show(&config);
        }
    }

    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}
