//! HTTP API Client
//!
//! Functions for communicating with the analysis backend REST API. All three
//! dashboard reads are plain GETs with fully materialized JSON responses; no
//! request bodies, no query parameters, no authentication.

use futures::join;
use gloo_net::http::Request;

use crate::state::global::{ChangePointResult, EventRecord, PriceRecord};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Local storage key holding an environment-specific base URL override
const API_BASE_KEY: &str = "brent_dashboard_api_url";

/// Get the API base URL from local storage or use the default.
///
/// Resolved once per fetch batch, so deployments can point the page at a
/// different backend without recompiling.
pub fn get_api_base() -> String {
    let url = if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(Some(url)) = storage.get_item(API_BASE_KEY) {
                url
            } else {
                DEFAULT_API_BASE.to_string()
            }
        } else {
            DEFAULT_API_BASE.to_string()
        }
    } else {
        DEFAULT_API_BASE.to_string()
    };
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// GET a JSON payload and decode it
async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(format!("Request to {} failed with status {}", url, response.status()));
    }

    response.json().await.map_err(|e| format!("Parse error: {}", e))
}

/// Fetch the price series
pub async fn fetch_prices(api_base: &str) -> Result<Vec<PriceRecord>, String> {
    get_json(&format!("{}/api/data/prices", api_base)).await
}

/// Fetch the annotated historical events
pub async fn fetch_events(api_base: &str) -> Result<Vec<EventRecord>, String> {
    get_json(&format!("{}/api/data/events", api_base)).await
}

/// Fetch the change-point model results
pub async fn fetch_changepoint(api_base: &str) -> Result<ChangePointResult, String> {
    get_json(&format!("{}/api/model/changepoint", api_base)).await
}

/// Issue the three dashboard reads concurrently and join them all-or-nothing.
///
/// If any of the three fails, the whole batch fails and the caller gets a
/// single data-fetch failure. No retry, no timeout, no partial success.
pub async fn fetch_dashboard_data(
) -> Result<(Vec<PriceRecord>, Vec<EventRecord>, ChangePointResult), String> {
    let api_base = get_api_base();

    let (prices, events, model) = join!(
        fetch_prices(&api_base),
        fetch_events(&api_base),
        fetch_changepoint(&api_base),
    );

    Ok((prices?, events?, model?))
}
