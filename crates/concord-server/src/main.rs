//! Concord Server CLI
//!
//! Starts the consolidation HTTP server.

use concord_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        // Load from specified config file
        let config_path = &args[2];
        ServerConfig::from_file(config_path)?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        // Resolve from environment variables, falling back to defaults
        ServerConfig::from_env()?
    };

    // Start the server
    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Concord Server - Claim Consolidation and Source Reputation");
    println!();
    println!("USAGE:");
    println!("    concord-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    Without --config, settings resolve from the environment:");
    println!("    - K            Number of reputation levels (default: 10)");
    println!("    - LF           Longevity factor in (0, 1] (default: 1)");
    println!("    - DAMPENING    TruthFinder dampening factor (default: 0.1)");
    println!("    - INFLUENCE    Related-fact influence (default: 0.8)");
    println!("    - STATEFUL     Persist reputation across requests (default: false)");
    println!("    - BIND_ADDRESS IP address to bind (default: 127.0.0.1)");
    println!("    - BIND_PORT    Port number (default: 8000)");
    println!();
}
