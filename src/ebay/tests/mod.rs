//! Unit tests for the eBay API module.

mod inventory_tests;

use super::EbayApi;

/// Creates an EbayApi pointing at the given mock server.
pub(crate) fn api_with_mock(mock_uri: &str) -> EbayApi {
    let mut api = EbayApi::new("test_token".to_string(), "EBAY_US".to_string());
    api.base_url = mock_uri.to_string();
    api
}
