//! Tests for inventory item and location operations.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::api_with_mock;
use crate::ebay::{
    Availability, InventoryItem, InventoryProduct, ShipToLocationAvailability,
};
use crate::settings::MerchantAddress;

fn sample_item() -> InventoryItem {
    InventoryItem {
        availability: Availability {
            ship_to_location_availability: ShipToLocationAvailability { quantity: 1 },
        },
        condition: "USED_EXCELLENT".to_string(),
        product: InventoryProduct {
            title: "Canon AE-1 35mm Camera".to_string(),
            description: "Classic SLR.".to_string(),
            brand: "Canon".to_string(),
            mpn: "CAM-100".to_string(),
            upc: vec!["Does Not Apply".to_string()],
            image_urls: vec!["https://cdn.example.com/cam.jpg".to_string()],
        },
        package_weight_and_size: None,
    }
}

// ── upsert_inventory_item ────────────────────────────────────────────

#[tokio::test]
async fn upsert_inventory_item_puts_by_sku() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("PUT"))
        .and(path("/sell/inventory/v1/inventory_item/CAM-100-U42"))
        .and(header("Authorization", "Bearer test_token"))
        .and(header("Content-Language", "en-US"))
        .and(body_partial_json(serde_json::json!({
            "condition": "USED_EXCELLENT",
            "product": {"brand": "Canon"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let result = api.upsert_inventory_item("CAM-100-U42", &sample_item()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn upsert_inventory_item_500_is_error() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("PUT"))
        .and(path("/sell/inventory/v1/inventory_item/CAM-100-U42"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let err = api
        .upsert_inventory_item("CAM-100-U42", &sample_item())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"), "got: {err}");
}

// ── get_inventory_item ───────────────────────────────────────────────

#[tokio::test]
async fn get_inventory_item_found() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/sell/inventory/v1/inventory_item/CAM-100-U42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::to_value(sample_item()).unwrap()),
        )
        .mount(&mock_server)
        .await;

    let item = api.get_inventory_item("CAM-100-U42").await.unwrap();
    assert_eq!(item.unwrap().product.mpn, "CAM-100");
}

#[tokio::test]
async fn get_inventory_item_404_is_none() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/sell/inventory/v1/inventory_item/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let item = api.get_inventory_item("NOPE").await.unwrap();
    assert!(item.is_none());
}

// ── ensure_location ──────────────────────────────────────────────────

#[tokio::test]
async fn ensure_location_noop_when_present() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/sell/inventory/v1/location/default-warehouse"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let result = api
        .ensure_location("default-warehouse", &MerchantAddress::default())
        .await;
    assert!(result.is_ok());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "no create call expected");
}

#[tokio::test]
async fn ensure_location_creates_on_404() {
    let mock_server = MockServer::start().await;
    let api = api_with_mock(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/sell/inventory/v1/location/default-warehouse"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sell/inventory/v1/location/default-warehouse"))
        .and(body_partial_json(serde_json::json!({
            "merchantLocationStatus": "ENABLED",
            "location": {"address": {"city": "Portland"}}
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let result = api
        .ensure_location("default-warehouse", &MerchantAddress::default())
        .await;
    assert!(result.is_ok());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}
