//! State Management
//!
//! Dashboard view state and the wire/normalized data model.

pub mod global;

pub use global::{
    provide_dashboard_state, ChangePointResult, DashboardState, EventRecord, LoadPhase,
    PricePoint, PriceRecord,
};
