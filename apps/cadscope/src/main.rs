//! # cadscope
//!
//! Command-line inspector for CAD object graphs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           apps/cadscope (THE BINARY)         │
//! │                                              │
//! │   CLI (clap)  ──►  load / save documents     │
//! │        │                                     │
//! │        ▼                                     │
//! │   ┌───────────────┐                          │
//! │   │ cadscope-core │  registry, navigator,    │
//! │   │  (THE LOGIC)  │  typed values, diff      │
//! │   └───────────────┘                          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cadscope sample -o drawing.cscp
//! cadscope -D drawing.cscp props 50
//! cadscope -D drawing.cscp tree --depth 3
//! cadscope -D drawing.cscp xdata 53
//! cadscope -D drawing.cscp diff 31 32 --changes-only
//! ```

use cadscope::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // CADSCOPE_LOG_FORMAT=json enables machine-parseable logs. Logs go to
    // stderr so stdout stays clean for --json-mode output.
    let log_format = std::env::var("CADSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_level = if cli.verbose { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("cadscope={default_level},cadscope_core={default_level}").into()
    });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        "cadscope v{} - CAD object-graph inspector\n",
        env!("CARGO_PKG_VERSION")
    );
}
