//! Async client for the local REST API of ETA heating controllers (meinETA)
//!
//! The controller exposes its sensor menu at `/user/menu` and individual
//! readings at `/user/var/{address}`, both as XML. This crate provides:
//!
//! - a reachability check ([`MeinEtaClient::test_connection`])
//! - sensor discovery flattening the menu tree into sensor key → address
//!   ([`MeinEtaClient::get_sensors_dict`])
//! - data reads returning scaled, rounded values with their unit
//!   ([`MeinEtaClient::get_data`])
//!
//! ```no_run
//! # async fn demo() -> meineta_rust::Result<()> {
//! use meineta_rust::{ClientConfig, MeinEtaClient};
//!
//! let client = MeinEtaClient::new(ClientConfig::new("192.168.1.100").with_port(8080))?;
//! let sensors = client.get_sensors_dict().await?;
//! if let Some(address) = sensors.get("fbh_außentemperatur") {
//!     let reading = client.get_data(address).await?;
//!     println!("outside: {reading}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod services;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use client::MeinEtaClient;
pub use config::ClientConfig;
pub use error::{MeinEtaError, Result};
pub use services::{NormalizedValue, SensorMap, SensorValue};
