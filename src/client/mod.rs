//! Client for the meinETA REST API
//!
//! Layered as transport (single HTTP GET), fetcher (bounded retry and
//! failure classification) and the [`MeinEtaClient`] facade.

pub mod fetcher;
pub mod http_client;
pub mod transport;

pub use fetcher::{ResilientFetcher, RetryPolicy};
pub use http_client::MeinEtaClient;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
