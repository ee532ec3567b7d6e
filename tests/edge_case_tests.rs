//! Edge case and error handling tests
//!
//! Timeouts, unreachable controllers and odd documents.

use meineta_rust::{MeinEtaClient, MeinEtaError};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

mod common;
use common::{closed_port_config, xml, MockEtaServer};

#[tokio::test]
async fn test_timeout_is_retried_then_connection_error() {
    let mock = MockEtaServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/menu"))
        .respond_with(xml("<eta/>").set_delay(Duration::from_millis(800)))
        .expect(3)
        .mount(&mock.server)
        .await;

    let client = MeinEtaClient::new(mock.config().with_timeout(Duration::from_millis(100))).unwrap();

    let err = client.get_sensors_dict().await.unwrap_err();
    assert!(matches!(err, MeinEtaError::Connection { status: None, .. }));
    assert!(err.message().contains("after 3 attempts"));
    assert!(client.cached_sensors().await.is_none());
}

#[tokio::test]
async fn test_unreachable_controller() {
    let client = MeinEtaClient::new(closed_port_config()).unwrap();

    let err = client.get_data("120/10101/0/0/12197").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.message().contains("failed after 3 attempts"));

    let err = client.test_connection().await.unwrap_err();
    assert!(matches!(err, MeinEtaError::Connection { status: None, .. }));
    assert!(err.message().contains("network error"));
}

#[tokio::test]
async fn test_single_attempt_configuration() {
    let mock = MockEtaServer::start().await;
    Mock::given(method("GET"))
        .respond_with(xml("<eta/>").set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&mock.server)
        .await;

    let config = mock
        .config()
        .with_timeout(Duration::from_millis(100))
        .with_max_retries(1);
    let err = MeinEtaClient::new(config)
        .unwrap()
        .get_data("1/2/3")
        .await
        .unwrap_err();

    assert!(err.message().contains("after 1 attempts"));
}

#[tokio::test]
async fn test_menu_without_function_blocks() {
    let mock = MockEtaServer::start().await;
    mock.mock_menu("<eta version=\"1.0\"><menu></menu></eta>", 1).await;

    let err = mock.client().get_sensors_dict().await.unwrap_err();
    assert!(err.is_parsing_error());
}

#[tokio::test]
async fn test_nameless_and_uri_less_nodes() {
    let mock = MockEtaServer::start().await;
    mock.mock_menu(
        r#"<eta><menu>
             <fub uri="/1">
               <object name="Puffer">
                 <object name="Oben" uri="/1/2/3"/>
               </object>
               <object name="Leer" uri=""/>
             </fub>
           </menu></eta>"#,
        1,
    )
    .await;

    let sensors = mock.client().get_sensors_dict().await.unwrap();
    assert_eq!(sensors.len(), 2);
    assert_eq!(sensors.get("unknown").map(String::as_str), Some("/1"));
    assert_eq!(
        sensors.get("unknown_puffer_oben").map(String::as_str),
        Some("/1/2/3")
    );
}

#[tokio::test]
async fn test_unparsable_scale_factor_falls_back() {
    let mock = MockEtaServer::start().await;
    mock.mock_value(
        "120/1",
        r#"<eta><value unit="°C" scaleFactor="x" decPlaces="1" strValue="21,5">215</value></eta>"#,
    )
    .await;

    let value = mock.client().get_data("120/1").await.unwrap();
    assert_eq!(value.as_text(), Some("21,5"));
    assert_eq!(value.unit.as_deref(), Some("°C"));
}

#[tokio::test]
async fn test_404_on_data_read() {
    let mock = MockEtaServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock.server)
        .await;

    let err = mock.client().get_data("9/9/9").await.unwrap_err();
    assert!(matches!(err, MeinEtaError::InvalidResponse { status: 404 }));
}

#[tokio::test]
async fn test_empty_menu_is_fetched_again() {
    let mock = MockEtaServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/menu"))
        .respond_with(xml(r#"<eta><menu><fub name="Boot"/></menu></eta>"#))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock.server)
        .await;
    mock.mock_menu(common::MENU_XML, 1).await;
    let client = mock.client();

    assert!(client.get_sensors_dict().await.unwrap().is_empty());
    assert_eq!(client.get_sensors_dict().await.unwrap().len(), 7);
    assert_eq!(client.get_sensors_dict().await.unwrap().len(), 7);
    assert_eq!(mock.request_count().await, 2);
}
