// Configuration status display: which sources can run with the current
// environment, and the defaults each one will use.

use colored::Colorize;

use crate::config::Config;
use crate::sources::SourceKind;

/// Display per-source credential status to the terminal.
pub fn show(config: &Config) {
    println!("\n{}", "=== Source Status ===".bold());
    println!();

    let mut ready = 0;
    for kind in SourceKind::ALL {
        match config.require_source(kind) {
            Ok(()) => {
                ready += 1;
                println!(
                    "  {:<10} {}  default limit {}",
                    kind.display_name(),
                    "configured".green(),
                    config.default_limit(kind)
                );
            }
            Err(e) => {
                println!(
                    "  {:<10} {}  {}",
                    kind.display_name(),
                    "missing".red(),
                    e.to_string().dimmed()
                );
            }
        }
    }

    println!();
    println!(
        "Sources ready: {ready}/{}",
        SourceKind::ALL.len()
    );
    println!(
        "Upstream timeout: {}s, freshness window: {} days",
        config.http_timeout.as_secs(),
        config.freshness_days
    );
    if ready < SourceKind::ALL.len() {
        println!("  See .env.example for the required variables.");
    }
}
