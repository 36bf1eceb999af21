//! Development tool for driving a running display-wake-bridge daemon.
//!
//! Usage:
//!   cargo run --bin display-ctl -- status
//!   cargo run --bin display-ctl -- sleep
//!   cargo run --bin display-ctl -- do wake

use clap::{Parser, Subcommand};
use log::debug;
use std::process::ExitCode;
use std::time::Duration;

/// Default daemon control surface URL
const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "display-ctl")]
#[command(about = "Query or change a display-wake-bridge daemon's display state")]
struct Cli {
    /// Daemon base URL
    #[arg(long, env = "DISPLAY_WAKE_BRIDGE_URL", default_value = DEFAULT_BRIDGE_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the display is awake
    Status,
    /// Wake the display
    Wake,
    /// Put the display to sleep
    Sleep,
    /// Send a raw command through PUT /do
    Do {
        /// Command name ("wake" or "sleep")
        command: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();

    let result = match &cli.command {
        Commands::Status => agent.get(&format!("{base}/status")).call(),
        Commands::Wake => agent.get(&format!("{base}/wake")).call(),
        Commands::Sleep => agent.get(&format!("{base}/sleep")).call(),
        Commands::Do { command } => agent
            .put(&format!("{base}/do"))
            .send_json(serde_json::json!({ "command": command })),
    };

    match result {
        Ok(response) => {
            debug!("HTTP {}", response.status());
            match response.into_string() {
                Ok(body) => {
                    println!("{body}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to read response: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            eprintln!("Daemon rejected request (HTTP {code}): {body}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Could not reach daemon at {base}: {e}");
            ExitCode::FAILURE
        }
    }
}
