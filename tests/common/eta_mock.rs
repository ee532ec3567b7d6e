//! WireMock-based meinETA API mocking infrastructure
//!
//! Provides mock HTTP servers that simulate the REST API of an ETA
//! controller for testing without requiring actual hardware.

use meineta_rust::{ClientConfig, MeinEtaClient};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Discovery document with two function blocks and nested objects
pub const MENU_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eta version="1.0" xmlns="http://www.eta.co.at/rest/v1">
  <menu>
    <fub uri="/120/10101" name="FBH">
      <object uri="/120/10101/0/0/12197" name="Außentemperatur"/>
      <object uri="/120/10101/0/11125/0" name="Heizkreis">
        <object uri="/120/10101/0/11125/2121" name="Vorlauf Soll"/>
      </object>
    </fub>
    <fub uri="/40/10021" name="Kessel">
      <object uri="/40/10021/0/0/12000" name="Kesseltemperatur"/>
      <object uri="/40/10021/0/0/12153" name="Betriebsart"/>
    </fub>
  </menu>
</eta>"#;

/// Data document for the outside temperature
pub const TEMPERATURE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eta version="1.0" xmlns="http://www.eta.co.at/rest/v1">
  <value uri="/user/var/120/10101/0/0/12197" strValue="15,0" unit="°C" decPlaces="1" scaleFactor="10" advTextOffset="0">150</value>
</eta>"#;

/// Data document for a text-only state
pub const STATE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eta version="1.0" xmlns="http://www.eta.co.at/rest/v1">
  <value uri="/user/var/40/10021/0/0/12153" strValue="Heizen" unit="" decPlaces="0" scaleFactor="1" advTextOffset="1802">1803</value>
</eta>"#;

/// XML response as served by the controller
pub fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/xml; charset=utf-8")
}

/// Mock meinETA controller for testing
pub struct MockEtaServer {
    pub server: MockServer,
}

impl MockEtaServer {
    /// Start an empty mock server; tests mount the endpoints they need
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ClientConfig {
        let address = self.server.address();
        ClientConfig::new(address.ip().to_string())
            .with_port(address.port())
            .with_timeout(Duration::from_secs(2))
    }

    /// Client connected to this server
    pub fn client(&self) -> MeinEtaClient {
        MeinEtaClient::new(self.config()).expect("valid mock config")
    }

    /// Serve the discovery document, expecting exactly `calls` requests
    pub async fn mock_menu(&self, body: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/user/menu"))
            .respond_with(xml(body))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Serve a data document for `address` (without leading slash)
    pub async fn mock_value(&self, address: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/user/var/{address}")))
            .respond_with(xml(body))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// Address on localhost where nothing listens
pub fn closed_port_config() -> ClientConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    ClientConfig::new("127.0.0.1")
        .with_port(port)
        .with_timeout(Duration::from_secs(1))
}
