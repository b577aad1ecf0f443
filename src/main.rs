//! Brent Oil Price Dashboard
//!
//! Single-page visualization of Brent oil prices with Bayesian change-point
//! model results, built with Leptos (WASM).
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. On mount it performs one fetch-transform-render pass against
//! the analysis backend: three concurrent HTTP reads (prices, events,
//! change-point results), a date normalization step, and an interactive
//! canvas chart with reference markers.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
