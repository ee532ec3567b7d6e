//! meinETA command line tool
//!
//! Checks connectivity, lists discovered sensors and reads values from an
//! ETA heating controller.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meineta_rust::{
    logging::{init_logging, LogConfig},
    ClientConfig, MeinEtaClient,
};
use std::time::Duration;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "meineta")]
#[command(about = "Query the local REST API of an ETA heating controller")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Controller hostname or IP address
    #[arg(long, global = true, env = "MEINETA_HOST")]
    host: Option<String>,

    /// REST API port
    #[arg(long, global = true, env = "MEINETA_PORT")]
    port: Option<u16>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "MEINETA_TIMEOUT")]
    timeout: Option<u64>,

    /// TOML config file (command line flags take precedence)
    #[arg(long, global = true, env = "MEINETA_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the controller is reachable
    Test,
    /// List all discovered sensors
    Sensors,
    /// Read the value at a device address, e.g. /120/10101/0/0/12197
    Get { address: String },
    /// Read a sensor by key, e.g. fbh_außentemperatur
    Read { sensor_key: String },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Duration::from_secs(timeout);
        }

        config
            .validate()
            .context("Invalid controller configuration (use --host or set MEINETA_HOST)")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.debug {
        log_config = log_config.with_level(Level::DEBUG);
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let client = MeinEtaClient::new(cli.client_config()?)?;

    match &cli.command {
        Command::Test => {
            client.test_connection().await?;
            println!("Controller reachable at {}", client.config().menu_url()?);
        }
        Command::Sensors => {
            let sensors = client.get_sensors_dict().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&*sensors)?);
            } else {
                let mut entries: Vec<_> = sensors.iter().collect();
                entries.sort();
                for (key, address) in entries {
                    println!("{key}\t{address}");
                }
            }
        }
        Command::Get { address } => {
            let value = client.get_data(address).await?;
            print_value(&value, cli.json)?;
        }
        Command::Read { sensor_key } => {
            let value = client.get_data_by_key(sensor_key).await?;
            print_value(&value, cli.json)?;
        }
    }

    Ok(())
}

fn print_value(value: &meineta_rust::NormalizedValue, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}
