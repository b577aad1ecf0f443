//! Backend API Access
//!
//! HTTP client functions for the analysis backend's read-only endpoints.

pub mod client;

pub use client::{fetch_dashboard_data, get_api_base, DEFAULT_API_BASE};
