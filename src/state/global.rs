//! Dashboard State
//!
//! Reactive view state managed with Leptos signals, plus the data model for
//! the three backend collections and the date normalization step.

use leptos::*;

/// Dashboard view state provided to all components.
///
/// Each slot is written exactly once per page load by the data loader and is
/// read-only for the rest of the view's lifetime.
#[derive(Clone)]
pub struct DashboardState {
    /// Normalized price series (epoch-ms timestamps)
    pub prices: RwSignal<Vec<PricePoint>>,
    /// Annotated historical events, kept in wire form
    pub events: RwSignal<Vec<EventRecord>>,
    /// Change-point model output, if the backend returned one
    pub model: RwSignal<Option<ChangePointResult>>,
    /// Two-state load gate for the chart
    pub phase: RwSignal<LoadPhase>,
    /// Last data-fetch failure, for diagnostics only (never shown as a banner)
    pub error: RwSignal<Option<String>>,
}

/// Load phases for the view. A failed fetch still lands in `Ready` so the
/// page degrades to an empty chart instead of hanging on a spinner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
}

/// Price record as returned by `/api/data/prices`
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PriceRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Price")]
    pub price: f64,
}

/// A normalized price observation, ready for charting.
///
/// The timestamp is `f64` so an unparseable source date can carry the NaN
/// sentinel through to the renderer instead of dropping the record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricePoint {
    /// Epoch milliseconds, NaN if the source date failed to parse
    pub ts: f64,
    pub price: f64,
}

/// Historical event as returned by `/api/data/events`.
///
/// The backend has served the label under both `Event` and
/// `Event Description`; the optional `Type` column classifies the event.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EventRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Event", alias = "Event Description")]
    pub label: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl EventRecord {
    /// Epoch-ms timestamp of this event, NaN if unparseable.
    ///
    /// Events are not normalized up front; conversion happens at
    /// comparison/render time with the same parsing rule as prices.
    pub fn ts(&self) -> f64 {
        parse_date_ms(&self.date)
    }
}

/// Change-point model output as returned by `/api/model/changepoint`
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChangePointResult {
    pub most_probable_date: String,
    pub sigma_1_mean: f64,
    pub sigma_2_mean: f64,
}

impl ChangePointResult {
    /// Epoch-ms timestamp of the most probable change point, NaN if unparseable
    pub fn ts(&self) -> f64 {
        parse_date_ms(&self.most_probable_date)
    }
}

/// Parse a backend date string to epoch milliseconds.
///
/// One parsing rule for all three collections, so reference lines and the
/// tooltip join stay aligned. Returns NaN on unparseable input; never panics.
pub fn parse_date_ms(raw: &str) -> f64 {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis() as f64;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().timestamp_millis() as f64;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return dt.and_utc().timestamp_millis() as f64;
        }
    }
    f64::NAN
}

/// Normalize the wire price collection for charting.
///
/// Total over its input: every record maps to a point, unparseable dates
/// included (as NaN timestamps the renderer skips). Applied exactly once per
/// load cycle, in [`DashboardState::apply_loaded`].
pub fn normalize_prices(records: Vec<PriceRecord>) -> Vec<PricePoint> {
    records
        .into_iter()
        .map(|r| PricePoint {
            ts: parse_date_ms(&r.date),
            price: r.price,
        })
        .collect()
}

/// Provide dashboard state to the component tree
pub fn provide_dashboard_state() {
    let state = DashboardState {
        prices: create_rw_signal(Vec::new()),
        events: create_rw_signal(Vec::new()),
        model: create_rw_signal(None),
        phase: create_rw_signal(LoadPhase::Loading),
        error: create_rw_signal(None),
    };

    provide_context(state);
}

impl DashboardState {
    /// Store a successful batch load and open the chart gate.
    ///
    /// This is the single place prices are normalized.
    pub fn apply_loaded(
        &self,
        prices: Vec<PriceRecord>,
        events: Vec<EventRecord>,
        model: Option<ChangePointResult>,
    ) {
        self.prices.set(normalize_prices(prices));
        self.events.set(events);
        self.model.set(model);
        self.phase.set(LoadPhase::Ready);
    }

    /// Record a batch fetch failure.
    ///
    /// Collections keep their initial empty value and the view still reaches
    /// `Ready`, rendering an empty chart frame.
    pub fn apply_failure(&self, message: String) {
        self.error.set(Some(message));
        self.phase.set(LoadPhase::Ready);
    }

    pub fn is_ready(&self) -> bool {
        self.phase.get() == LoadPhase::Ready
    }
}
