//! HTTP client for the meinETA REST API
//!
//! [`MeinEtaClient`] composes the transport, the retrying fetcher, sensor
//! discovery and value normalization, and owns the discovered sensor map.

use crate::client::fetcher::{ResilientFetcher, RetryPolicy};
use crate::client::transport::{HttpTransport, ReqwestTransport};
use crate::config::ClientConfig;
use crate::error::{MeinEtaError, Result};
use crate::services::sensor_registry::{flatten, parse_menu, SensorMap};
use crate::services::value_parsers::{DataPoint, NormalizedValue};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use url::Url;

/// Client for one ETA controller
pub struct MeinEtaClient<T: HttpTransport = ReqwestTransport> {
    /// Transport shared by the fetcher and the reachability probe
    transport: Arc<T>,

    fetcher: ResilientFetcher<T>,

    config: ClientConfig,

    menu_url: Url,

    /// Discovered sensors; stays `None` until a discovery finds any
    sensors: RwLock<Option<Arc<SensorMap>>>,

    /// Serializes discovery so concurrent first calls share one fetch
    discovery: Mutex<()>,
}

impl MeinEtaClient<ReqwestTransport> {
    /// Create a client using `reqwest` for HTTP
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Shorthand for `host`, `port` and timeout in seconds
    pub fn connect<S: Into<String>>(host: S, port: u16, timeout_secs: u64) -> Result<Self> {
        Self::new(
            ClientConfig::new(host)
                .with_port(port)
                .with_timeout(std::time::Duration::from_secs(timeout_secs)),
        )
    }
}

impl<T: HttpTransport> MeinEtaClient<T> {
    /// Create a client on top of an existing transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let transport = Arc::new(transport);
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::from(&config));
        let menu_url = config.menu_url()?;

        Ok(Self {
            transport,
            fetcher,
            config,
            menu_url,
            sensors: RwLock::new(None),
            discovery: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check that the controller answers on its discovery endpoint
    ///
    /// One request, no retry. Any status other than 200 or a network error
    /// is reported as [`MeinEtaError::Connection`].
    pub async fn test_connection(&self) -> Result<bool> {
        match self.transport.get(&self.menu_url).await {
            Ok(response) if response.is_ok() => {
                info!(url = %self.menu_url, "Connection test successful");
                Ok(true)
            }
            Ok(response) => {
                error!(status = response.status, "Connection test failed");
                Err(MeinEtaError::connection_with_status(
                    format!("Connection test failed with status {}", response.status),
                    response.status,
                ))
            }
            Err(e) => {
                error!(error = %e, "Connection test failed due to network error");
                Err(MeinEtaError::connection(format!(
                    "Connection test failed due to network error: {e}"
                )))
            }
        }
    }

    /// All sensors of the controller, keyed by sensor key
    ///
    /// The first call that discovers at least one sensor fetches and
    /// flattens the menu; later calls return the same map without touching
    /// the network. Concurrent first calls share one fetch. A failed or
    /// empty discovery leaves nothing cached, so the next call fetches again.
    pub async fn get_sensors_dict(&self) -> Result<Arc<SensorMap>> {
        if let Some(sensors) = self.cached_sensors().await {
            debug!("Returning cached sensors");
            return Ok(sensors);
        }

        let _discovery = self.discovery.lock().await;
        if let Some(sensors) = self.cached_sensors().await {
            return Ok(sensors);
        }

        let body = self.fetcher.fetch(&self.menu_url).await?;
        let blocks = parse_menu(&body).map_err(|e| {
            error!(error = %e, "Failed to parse menu structure");
            e
        })?;
        let sensors = Arc::new(flatten(&blocks));
        info!(count = sensors.len(), "Discovered sensors");

        if sensors.is_empty() {
            warn!("Menu contains no sensors, not caching");
        } else {
            *self.sensors.write().await = Some(sensors.clone());
        }

        Ok(sensors)
    }

    /// Sensor map if a discovery already found sensors
    pub async fn cached_sensors(&self) -> Option<Arc<SensorMap>> {
        self.sensors.read().await.clone()
    }

    /// Read and normalize the data point at `address`
    pub async fn get_data(&self, address: &str) -> Result<NormalizedValue> {
        let url = self.config.var_url(address)?;
        let body = self.fetcher.fetch(&url).await?;

        let data = DataPoint::from_document(&body).map_err(|e| {
            error!(address, error = %e, "Failed to parse data");
            e
        })?;

        Ok(data.normalize())
    }

    /// Read a sensor by its key from the sensor map
    pub async fn get_data_by_key(&self, sensor_key: &str) -> Result<NormalizedValue> {
        let sensors = self.get_sensors_dict().await?;
        let address = sensors
            .get(sensor_key)
            .ok_or_else(|| MeinEtaError::not_found(format!("Unknown sensor key: {sensor_key}")))?;

        self.get_data(address).await
    }
}
