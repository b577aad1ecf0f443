//! Dashboard Page
//!
//! The single dashboard view: loads the three collections on mount, then
//! renders the change-point summary and the price chart.

use leptos::*;

use crate::api;
use crate::components::{CardSkeleton, ChangePointSummary, ChartSkeleton, PriceChart};
use crate::state::global::{DashboardState, LoadPhase};

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    // One fetch-transform-render pass per page load
    let state_for_effect = state.clone();
    create_effect(move |_| {
        let state = state_for_effect.clone();
        spawn_local(async move {
            match api::fetch_dashboard_data().await {
                Ok((prices, events, model)) => {
                    state.apply_loaded(prices, events, Some(model));
                }
                Err(e) => {
                    // Degrade to an empty chart rather than hang or retry
                    web_sys::console::error_1(&format!("Error fetching data: {}", e).into());
                    state.apply_failure(e);
                }
            }
        });
    });

    let state_for_view = state.clone();
    view! {
        <div class="space-y-8">
            // Page header
            <div>
                <h1 class="text-3xl font-bold">"Brent Oil Price Analysis"</h1>
                <p class="text-gray-400 mt-1">
                    "Historical prices with Bayesian change-point estimate and event markers"
                </p>
            </div>

            {move || {
                match state_for_view.phase.get() {
                    LoadPhase::Loading => view! {
                        <div class="space-y-8">
                            <CardSkeleton />
                            <ChartSkeleton />
                        </div>
                    }
                    .into_view(),
                    LoadPhase::Ready => {
                        let state = state_for_view.clone();
                        view! {
                            <div class="space-y-8">
                                // Summary panel, only when model results are
                                // present with a parseable date
                                {move || {
                                    state
                                        .model
                                        .get()
                                        .filter(|m| m.ts().is_finite())
                                        .map(|m| view! { <ChangePointSummary model=m /> })
                                }}

                                // Main chart
                                <section class="bg-gray-800 rounded-xl p-6">
                                    <h2 class="text-xl font-semibold mb-4">"Price History"</h2>
                                    <PriceChart />
                                </section>
                            </div>
                        }
                        .into_view()
                    }
                }
            }}
        </div>
    }
}
