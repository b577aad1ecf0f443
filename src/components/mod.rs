//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod loading;
pub mod summary;

pub use chart::PriceChart;
pub use loading::{CardSkeleton, ChartSkeleton};
pub use summary::ChangePointSummary;
