//! Command-line interface for the location relay.
//!
//! # Commands
//!
//! - `serve`: Run the relay (channel endpoint + HTTP API)
//! - `watch`: Follow professionals as a customer
//! - `report`: Report a position as a professional
//!
//! # Example
//!
//! ```bash
//! # Run the relay on the configured port
//! location-relay serve
//!
//! # Watch as customer 1
//! location-relay watch --user 1
//!
//! # Report a position for professional 3
//! location-relay report --professional 3 --lat 40.7135 --lon -74.0055
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use crate::api::server::run_server;
use crate::app_state::AppState;
use crate::client::{Backoff, Delivery, LocationTracker, LocationUpdater};
use crate::config::Config;
use crate::domain::{Coordinate, ProfessionalId, UserId};
use crate::error::{RelayError, RelayResult};

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Real-time professional location relay
#[derive(Parser, Debug)]
#[command(name = "location-relay")]
#[command(about = "Booking-scoped live location relay", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay server
    Serve {
        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Follow tracked professionals as a customer
    Watch {
        /// Customer (user) id
        #[arg(short, long)]
        user: UserId,

        /// Relay base URL
        #[arg(short, long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Report a position as a professional
    Report {
        /// Professional id
        #[arg(short, long)]
        professional: ProfessionalId,

        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Skip the channel and use the HTTP endpoint
        #[arg(long)]
        http: bool,

        /// Relay base URL
        #[arg(short, long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

/// Parse CLI arguments and execute the appropriate command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the server cannot
/// start, or a client command cannot reach the relay.
pub async fn run() -> RelayResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => run_serve_command(port).await,
        Commands::Watch { user, server } => run_watch_command(user, server).await,
        Commands::Report {
            professional,
            lat,
            lon,
            http,
            server,
        } => run_report_command(professional, Coordinate::new(lat, lon), http, server).await,
    }
}

/// Execute the serve command.
async fn run_serve_command(port: Option<u16>) -> RelayResult<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }

    info!(
        port = config.port(),
        policy = %config.handshake_policy(),
        "Starting location relay"
    );
    println!(
        "{} Location relay listening on port {}",
        "🚀".cyan(),
        config.port().to_string().yellow()
    );

    let state = AppState::from_config(&config).await?;

    run_server(state, &config)
        .await
        .map_err(|e| RelayError::channel(format!("server stopped: {e}"), None))
}

/// Execute the watch command (customer client).
async fn run_watch_command(user_id: UserId, server: String) -> RelayResult<()> {
    println!(
        "{} Watching tracked professionals as user {}...",
        "🔍".cyan(),
        user_id.to_string().yellow()
    );
    println!();

    let tracker = LocationTracker::new(server, user_id).with_backoff(Backoff::default(), None);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        _ = &mut shutdown => {
            println!();
            println!("{}", "👋 Stopped watching".green().bold());
            Ok(())
        }
        result = tracker.run(print_location) => result,
    }
}

/// Execute the report command (professional client).
async fn run_report_command(
    professional_id: ProfessionalId,
    coordinate: Coordinate,
    http_only: bool,
    server: String,
) -> RelayResult<()> {
    let mut updater = LocationUpdater::new(server, professional_id);

    if !http_only {
        match updater.connect().await {
            Ok(()) => {
                if let Some(previous) = updater.last_echo(Duration::from_millis(500)).await {
                    println!(
                        "{} Previous position: {}",
                        "📍".cyan(),
                        format_coordinate(previous).dimmed()
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Channel unavailable");
                println!("{} Channel unavailable, using HTTP", "⚠️".yellow());
            }
        }
    }

    let delivery = updater.send(coordinate).await;
    updater.close().await;

    match delivery? {
        Delivery::Channel => println!(
            "{} Sent {} over channel",
            "✅".green(),
            format_coordinate(coordinate).bold()
        ),
        Delivery::Http(ack) => println!(
            "{} Sent {} over HTTP, delivered to {}/{} customers",
            "✅".green(),
            format_coordinate(coordinate).bold(),
            ack.delivered.to_string().yellow(),
            ack.authorized
        ),
    }

    Ok(())
}

fn print_location(professional_id: ProfessionalId, coordinate: Coordinate) {
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    println!(
        "{} {} Professional {} at {}",
        "📍".cyan(),
        timestamp.to_string().dimmed(),
        professional_id.to_string().yellow(),
        format_coordinate(coordinate).green()
    );
}

fn format_coordinate(coordinate: Coordinate) -> String {
    format!("{:.6}, {:.6}", coordinate.latitude, coordinate.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinate() {
        assert_eq!(
            format_coordinate(Coordinate::new(40.7128, -74.006)),
            "40.712800, -74.006000"
        );
    }

    #[test]
    fn test_cli_parsing() {
        assert!(Cli::try_parse_from(["location-relay", "serve"]).is_ok());
        assert!(Cli::try_parse_from(["location-relay", "watch", "--user", "1"]).is_ok());
        assert!(Cli::try_parse_from(["location-relay", "watch"]).is_err());
    }

    #[test]
    fn test_report_accepts_negative_longitude() {
        let cli = Cli::try_parse_from([
            "location-relay",
            "report",
            "--professional",
            "3",
            "--lat",
            "40.7135",
            "--lon",
            "-74.0055",
            "--http",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Report { professional: 3, http: true, ref server, .. }
                if server == DEFAULT_SERVER
        ));
        if let Commands::Report { lat, lon, .. } = cli.command {
            assert!((lat - 40.7135).abs() < f64::EPSILON);
            assert!((lon + 74.0055).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["location-relay", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));
    }
}
