//! Change-Point Summary Component
//!
//! Card above the chart summarizing the model's change-point estimate and
//! the volatility of the two regimes it splits the series into.

use leptos::*;

use crate::state::global::ChangePointResult;

/// Summary card for the change-point model results.
///
/// Rendered only when the backend returned a model result with a parseable
/// date; the caller handles that gate.
#[component]
pub fn ChangePointSummary(model: ChangePointResult) -> impl IntoView {
    view! {
        <section class="bg-gray-800 rounded-xl p-6 border border-gray-700">
            <h2 class="text-xl font-semibold mb-4">"Change Point Analysis Results"</h2>
            <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                <SummaryItem
                    label="Most Probable Change Point"
                    value=model.most_probable_date.clone()
                />
                <SummaryItem
                    label="Volatility before Change (sigma_1)"
                    value=format_sigma(model.sigma_1_mean)
                />
                <SummaryItem
                    label="Volatility after Change (sigma_2)"
                    value=format_sigma(model.sigma_2_mean)
                />
            </div>
        </section>
    }
}

/// Single labeled value inside the summary card
#[component]
fn SummaryItem(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="bg-gray-700 rounded-lg px-4 py-3">
            <div class="text-gray-400 text-sm">{label}</div>
            <div class="text-2xl font-bold mt-1">{value}</div>
        </div>
    }
}

/// Regime volatility means are shown to four decimal places
fn format_sigma(value: f64) -> String {
    format!("{:.4}", value)
}
