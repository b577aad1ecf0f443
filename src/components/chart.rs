//! Price Chart Component
//!
//! Time-series line chart using HTML5 Canvas, with vertical reference lines
//! for the change-point estimate and each historical event, and a hover
//! tooltip that joins the hovered data point against the event list.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::state::global::{DashboardState, EventRecord, PricePoint};

// Logical canvas size; CSS scales it responsively.
const CANVAS_WIDTH: f64 = 800.0;
const CANVAS_HEIGHT: f64 = 400.0;

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// Price series stroke
const LINE_COLOR: &str = "#8884d8";
/// Change-point reference line
const CHANGEPOINT_COLOR: &str = "#f44336";
/// Event reference lines
const EVENT_COLOR: &str = "#82ca9d";

/// Price chart component
#[component]
pub fn PriceChart() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");
    let canvas_ref = create_node_ref::<html::Canvas>();
    let hovered = create_rw_signal(None::<usize>);

    // Redraw when the collections or the hover selection change
    let state_for_draw = state.clone();
    create_effect(move |_| {
        let points = state_for_draw.prices.get();
        let events = state_for_draw.events.get();
        let changepoint = state_for_draw
            .model
            .get()
            .map(|m| m.ts())
            .filter(|ts| ts.is_finite());
        let hover = hovered.get();

        if let Some(canvas) = canvas_ref.get() {
            draw_chart(&canvas, &points, &events, changepoint, hover);
        }
    });

    let state_for_move = state.clone();
    let on_move = move |ev: web_sys::MouseEvent| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let points = state_for_move.prices.get();
        let Some(plot) = Plot::from_points(&points) else {
            hovered.set(None);
            return;
        };

        // Correct for CSS scaling of the fixed-size canvas
        let client_width = canvas.client_width().max(1) as f64;
        let px = ev.offset_x() as f64 * CANVAS_WIDTH / client_width;
        hovered.set(nearest_point(&points, plot.ts_at(px)));
    };

    let on_leave = move |_ev: web_sys::MouseEvent| hovered.set(None);

    let state_for_tooltip = state;
    view! {
        <div class="relative">
            <canvas
                node_ref=canvas_ref
                width="800"
                height="400"
                class="w-full h-64 md:h-96 rounded-lg cursor-crosshair"
                on:mousemove=on_move
                on:mouseleave=on_leave
            />

            // Tooltip for the hovered data point
            {move || {
                let points = state_for_tooltip.prices.get();
                let events = state_for_tooltip.events.get();
                hovered.get().and_then(|idx| {
                    let point = *points.get(idx)?;
                    let plot = Plot::from_points(&points)?;
                    let left_pct = (plot.x(point.ts) / CANVAS_WIDTH * 100.0).clamp(0.0, 85.0);
                    let event_line = event_at(&events, point.ts).map(event_tooltip_line);

                    Some(view! {
                        <div
                            class="absolute bg-white text-gray-900 border border-gray-300 rounded px-3 py-2 text-sm pointer-events-none shadow-lg"
                            style=format!("left: {:.1}%; top: 8px", left_pct)
                        >
                            <p>{format!("Date: {}", format_tooltip_date(point.ts))}</p>
                            <p>{format!("Price: ${:.2}", point.price)}</p>
                            {event_line.map(|line| view! {
                                <p class="text-green-700 font-medium">{line}</p>
                            })}
                        </div>
                    })
                })
            }}
        </div>
    }
}

/// Pixel mapping between data space and the canvas plot area
#[derive(Clone, Copy, Debug, PartialEq)]
struct Plot {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Plot {
    /// Build the plot mapping from the normalized series.
    ///
    /// Returns `None` when no point has a finite timestamp, in which case
    /// only the empty chart frame is drawn.
    fn from_points(points: &[PricePoint]) -> Option<Self> {
        let (x_min, x_max) = x_domain(points)?;
        let (y_min, y_max) = y_domain(points);
        Some(Self { x_min, x_max, y_min, y_max })
    }

    fn plot_width() -> f64 {
        CANVAS_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        CANVAS_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x_span(&self) -> f64 {
        // A single-point series has a zero span; widen it so division stays finite
        (self.x_max - self.x_min).max(1.0)
    }

    /// Data timestamp to canvas x
    fn x(&self, ts: f64) -> f64 {
        MARGIN_LEFT + (ts - self.x_min) / self.x_span() * Self::plot_width()
    }

    /// Data value to canvas y (inverted: canvas y grows downward)
    fn y(&self, value: f64) -> f64 {
        MARGIN_TOP + (self.y_max - value) / (self.y_max - self.y_min) * Self::plot_height()
    }

    /// Canvas x back to a data timestamp, for hit-testing
    fn ts_at(&self, px: f64) -> f64 {
        self.x_min + (px - MARGIN_LEFT) / Self::plot_width() * self.x_span()
    }

    /// Whether a timestamp falls inside the plotted domain
    fn contains_x(&self, ts: f64) -> bool {
        ts.is_finite() && ts >= self.x_min && ts <= self.x_max
    }
}

/// X domain over finite timestamps; `None` if nothing is plottable
fn x_domain(points: &[PricePoint]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        if p.ts.is_finite() {
            min = min.min(p.ts);
            max = max.max(p.ts);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Y domain with 10% padding; a flat series is widened to a non-zero span
fn y_domain(points: &[PricePoint]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        if p.ts.is_finite() && p.price.is_finite() {
            min = min.min(p.price);
            max = max.max(p.price);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let range = max - min;
    let padding = if range > 0.0 { range * 0.1 } else { 1.0 };
    (min - padding, max + padding)
}

/// Index of the finite data point nearest the given timestamp
fn nearest_point(points: &[PricePoint], ts: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.ts.is_finite())
        .min_by(|a, b| {
            let da = (a.1.ts - ts).abs();
            let db = (b.1.ts - ts).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

/// Event whose parsed timestamp exactly equals the hovered point's timestamp.
///
/// Exact-millisecond equality, no tolerance window: an event whose date does
/// not coincide with a data point's date never surfaces in the tooltip.
fn event_at(events: &[EventRecord], ts: f64) -> Option<&EventRecord> {
    events.iter().find(|e| e.ts() == ts)
}

/// Events with parseable dates, as (timestamp, label) markers
fn event_markers(events: &[EventRecord]) -> Vec<(f64, String)> {
    events
        .iter()
        .filter(|e| e.ts().is_finite())
        .map(|e| (e.ts(), e.label.clone()))
        .collect()
}

/// Tooltip line for a matched event
fn event_tooltip_line(event: &EventRecord) -> String {
    match &event.kind {
        Some(kind) => format!("Event: {} ({})", event.label, kind),
        None => format!("Event: {}", event.label),
    }
}

/// Calendar year for an x-axis tick
fn year_label(ts: f64) -> String {
    chrono::DateTime::from_timestamp_millis(ts as i64)
        .map(|dt| dt.format("%Y").to_string())
        .unwrap_or_default()
}

/// Calendar date shown in the tooltip
fn format_tooltip_date(ts: f64) -> String {
    chrono::DateTime::from_timestamp_millis(ts as i64)
        .map(|dt| dt.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}

/// Fritsch-Carlson tangents for monotone cubic interpolation.
///
/// Limited so the interpolant never overshoots between monotone samples.
fn monotone_tangents(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0.0];
    }

    // Secant slopes
    let mut d = vec![0.0; n - 1];
    for i in 0..n - 1 {
        let h = xs[i + 1] - xs[i];
        d[i] = if h != 0.0 { (ys[i + 1] - ys[i]) / h } else { 0.0 };
    }

    let mut m = vec![0.0; n];
    m[0] = d[0];
    m[n - 1] = d[n - 2];
    for i in 1..n - 1 {
        m[i] = if d[i - 1] * d[i] <= 0.0 {
            0.0
        } else {
            (d[i - 1] + d[i]) / 2.0
        };
    }

    for i in 0..n - 1 {
        if d[i] == 0.0 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let a = m[i] / d[i];
        let b = m[i + 1] / d[i];
        let s = a * a + b * b;
        if s > 9.0 {
            let t = 3.0 / s.sqrt();
            m[i] = t * a * d[i];
            m[i + 1] = t * b * d[i];
        }
    }

    m
}

/// Draw the chart on canvas
fn draw_chart(
    canvas: &HtmlCanvasElement,
    points: &[PricePoint],
    events: &[EventRecord],
    changepoint: Option<f64>,
    hovered: Option<usize>,
) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    // Clear canvas
    ctx.set_fill_style(&"#1f2937".into()); // gray-800
    ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

    let plot = Plot::from_points(points);

    draw_grid(&ctx, plot.as_ref());

    let Some(plot) = plot else {
        // Empty chart frame: axes with no data
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("16px sans-serif");
        let _ = ctx.fill_text(
            "No price data",
            CANVAS_WIDTH / 2.0 - 50.0,
            CANVAS_HEIGHT / 2.0,
        );
        return;
    };

    draw_series(&ctx, &plot, points);
    draw_reference_lines(&ctx, &plot, events, changepoint);
    draw_x_ticks(&ctx, &plot);

    // Highlight the hovered point
    if let Some(point) = hovered.and_then(|i| points.get(i)) {
        if point.ts.is_finite() && point.price.is_finite() {
            ctx.set_fill_style(&LINE_COLOR.into());
            ctx.begin_path();
            let _ = ctx.arc(
                plot.x(point.ts),
                plot.y(point.price),
                4.0,
                0.0,
                std::f64::consts::PI * 2.0,
            );
            ctx.fill();
        }
    }
}

/// Horizontal grid lines with y-axis value labels
fn draw_grid(ctx: &CanvasRenderingContext2d, plot: Option<&Plot>) {
    ctx.set_stroke_style(&"#374151".into()); // gray-700
    ctx.set_line_width(1.0);

    for i in 0..=5 {
        let y = MARGIN_TOP + (i as f64 / 5.0) * Plot::plot_height();
        ctx.begin_path();
        ctx.move_to(MARGIN_LEFT, y);
        ctx.line_to(CANVAS_WIDTH - MARGIN_RIGHT, y);
        ctx.stroke();

        if let Some(plot) = plot {
            let value = plot.y_max - (i as f64 / 5.0) * (plot.y_max - plot.y_min);
            ctx.set_fill_style(&"#9ca3af".into()); // gray-400
            ctx.set_font("12px sans-serif");
            let _ = ctx.fill_text(&format!("{:.1}", value), 5.0, y + 4.0);
        }
    }
}

/// The price line, monotone cubic through the finite points, no point markers
fn draw_series(ctx: &CanvasRenderingContext2d, plot: &Plot, points: &[PricePoint]) {
    let mut xs = Vec::with_capacity(points.len());
    let mut ys = Vec::with_capacity(points.len());
    for p in points {
        // Non-plottable sentinel values are skipped, never a crash
        if p.ts.is_finite() && p.price.is_finite() {
            xs.push(plot.x(p.ts));
            ys.push(plot.y(p.price));
        }
    }

    if xs.len() < 2 {
        return;
    }

    let tangents = monotone_tangents(&xs, &ys);

    ctx.set_stroke_style(&LINE_COLOR.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(xs[0], ys[0]);

    for i in 0..xs.len() - 1 {
        let dx = xs[i + 1] - xs[i];
        let c1x = xs[i] + dx / 3.0;
        let c1y = ys[i] + tangents[i] * dx / 3.0;
        let c2x = xs[i + 1] - dx / 3.0;
        let c2y = ys[i + 1] - tangents[i + 1] * dx / 3.0;
        ctx.bezier_curve_to(c1x, c1y, c2x, c2y, xs[i + 1], ys[i + 1]);
    }

    ctx.stroke();
}

/// Dashed vertical reference lines for the change point and each event
fn draw_reference_lines(
    ctx: &CanvasRenderingContext2d,
    plot: &Plot,
    events: &[EventRecord],
    changepoint: Option<f64>,
) {
    let dash = js_sys::Array::of2(&5.0.into(), &5.0.into());
    let _ = ctx.set_line_dash(&dash);
    ctx.set_line_width(1.5);

    for (ts, label) in event_markers(events) {
        if !plot.contains_x(ts) {
            continue;
        }
        let x = plot.x(ts);

        ctx.set_stroke_style(&EVENT_COLOR.into());
        ctx.begin_path();
        ctx.move_to(x, MARGIN_TOP);
        ctx.line_to(x, CANVAS_HEIGHT - MARGIN_BOTTOM);
        ctx.stroke();

        // Event label rotated for readability
        ctx.set_fill_style(&EVENT_COLOR.into());
        ctx.set_font("11px sans-serif");
        ctx.save();
        let _ = ctx.translate(x - 4.0, MARGIN_TOP + 130.0);
        let _ = ctx.rotate(-std::f64::consts::FRAC_PI_2);
        let _ = ctx.fill_text(&label, 0.0, 0.0);
        ctx.restore();
    }

    if let Some(ts) = changepoint.filter(|ts| plot.contains_x(*ts)) {
        let x = plot.x(ts);

        ctx.set_stroke_style(&CHANGEPOINT_COLOR.into());
        ctx.begin_path();
        ctx.move_to(x, MARGIN_TOP);
        ctx.line_to(x, CANVAS_HEIGHT - MARGIN_BOTTOM);
        ctx.stroke();

        ctx.set_fill_style(&CHANGEPOINT_COLOR.into());
        ctx.set_font("12px sans-serif");
        let _ = ctx.fill_text("Change Point", x + 6.0, MARGIN_TOP + 12.0);
    }

    let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// X-axis tick labels, formatted as the calendar year
fn draw_x_ticks(ctx: &CanvasRenderingContext2d, plot: &Plot) {
    ctx.set_fill_style(&"#9ca3af".into());
    ctx.set_font("12px sans-serif");

    let num_labels = 5;
    for i in 0..=num_labels {
        let ts = plot.x_min + (i as f64 / num_labels as f64) * (plot.x_max - plot.x_min);
        let x = MARGIN_LEFT + (i as f64 / num_labels as f64) * Plot::plot_width();
        let _ = ctx.fill_text(&year_label(ts), x - 15.0, CANVAS_HEIGHT - 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::global::parse_date_ms;

    fn pt(date: &str, price: f64) -> PricePoint {
        PricePoint { ts: parse_date_ms(date), price }
    }

    fn event(date: &str, label: &str) -> EventRecord {
        EventRecord {
            date: date.to_string(),
            label: label.to_string(),
            kind: None,
        }
    }

    #[test]
    fn test_x_domain_skips_nan_timestamps() {
        let points = vec![
            pt("2020-01-01", 50.0),
            PricePoint { ts: f64::NAN, price: 99.0 },
            pt("2020-06-01", 55.0),
        ];

        let (min, max) = x_domain(&points).unwrap();
        assert_eq!(min, parse_date_ms("2020-01-01"));
        assert_eq!(max, parse_date_ms("2020-06-01"));
    }

    #[test]
    fn test_x_domain_empty_when_nothing_plottable() {
        assert!(x_domain(&[]).is_none());
        assert!(x_domain(&[PricePoint { ts: f64::NAN, price: 1.0 }]).is_none());
    }

    #[test]
    fn test_y_domain_padding_is_ten_percent() {
        let points = vec![pt("2020-01-01", 50.0), pt("2020-06-01", 60.0)];
        let (min, max) = y_domain(&points);
        assert_eq!(min, 49.0);
        assert_eq!(max, 61.0);
    }

    #[test]
    fn test_y_domain_flat_series_widened() {
        let points = vec![pt("2020-01-01", 50.0), pt("2020-06-01", 50.0)];
        let (min, max) = y_domain(&points);
        assert!(max > min);
        assert_eq!(min, 49.0);
        assert_eq!(max, 51.0);
    }

    #[test]
    fn test_plot_round_trips_x_coordinates() {
        let points = vec![pt("2020-01-01", 50.0), pt("2020-06-01", 55.0)];
        let plot = Plot::from_points(&points).unwrap();

        let ts = parse_date_ms("2020-03-01");
        let px = plot.x(ts);
        assert!((plot.ts_at(px) - ts).abs() < 1.0);

        assert_eq!(plot.x(plot.x_min), MARGIN_LEFT);
        assert_eq!(plot.x(plot.x_max), CANVAS_WIDTH - MARGIN_RIGHT);
    }

    #[test]
    fn test_nearest_point_picks_closest_finite() {
        let points = vec![
            pt("2020-01-01", 50.0),
            PricePoint { ts: f64::NAN, price: 99.0 },
            pt("2020-06-01", 55.0),
        ];

        let near_start = parse_date_ms("2020-01-15");
        assert_eq!(nearest_point(&points, near_start), Some(0));

        let near_end = parse_date_ms("2020-05-20");
        assert_eq!(nearest_point(&points, near_end), Some(2));

        assert_eq!(nearest_point(&[], 0.0), None);
    }

    #[test]
    fn test_event_join_requires_exact_timestamp() {
        let events = vec![event("2020-06-01", "Policy X")];
        let point_ts = parse_date_ms("2020-06-01");

        assert_eq!(event_at(&events, point_ts).unwrap().label, "Policy X");

        // One day off never matches
        assert!(event_at(&events, parse_date_ms("2020-06-02")).is_none());

        // NaN timestamps never match anything
        assert!(event_at(&events, f64::NAN).is_none());
    }

    #[test]
    fn test_event_markers_drop_unparseable_dates() {
        let events = vec![event("2020-06-01", "Policy X"), event("bogus", "Phantom")];
        let markers = event_markers(&events);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].0, parse_date_ms("2020-06-01"));
        assert_eq!(markers[0].1, "Policy X");
    }

    #[test]
    fn test_event_tooltip_line_includes_kind() {
        let plain = event("2020-06-01", "Policy X");
        assert_eq!(event_tooltip_line(&plain), "Event: Policy X");

        let typed = EventRecord {
            date: "1990-08-02".to_string(),
            label: "Gulf War begins".to_string(),
            kind: Some("Conflict".to_string()),
        };
        assert_eq!(event_tooltip_line(&typed), "Event: Gulf War begins (Conflict)");
    }

    #[test]
    fn test_year_label_matches_calendar_year() {
        assert_eq!(year_label(parse_date_ms("2020-06-01")), "2020");
        assert_eq!(year_label(parse_date_ms("1987-05-20")), "1987");
    }

    #[test]
    fn test_monotone_tangents_never_oppose_secants() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 2.0, 2.5, 4.0, 10.0];
        let m = monotone_tangents(&xs, &ys);

        assert_eq!(m.len(), xs.len());
        // Monotone increasing input: every tangent is non-negative
        assert!(m.iter().all(|t| *t >= 0.0));
    }

    #[test]
    fn test_monotone_tangents_flat_segment_is_flat() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 5.0, 5.0, 2.0];
        let m = monotone_tangents(&xs, &ys);

        // Both ends of the flat segment get zero tangents so the curve does
        // not dip between equal samples
        assert_eq!(m[1], 0.0);
        assert_eq!(m[2], 0.0);
    }

    #[test]
    fn test_monotone_tangents_degenerate_inputs() {
        assert!(monotone_tangents(&[], &[]).is_empty());
        assert_eq!(monotone_tangents(&[1.0], &[2.0]), vec![0.0]);
    }

    // One change-point line and one event line at the same timestamp,
    // tooltip join on the second data point.
    #[test]
    fn test_reference_scenario_alignment() {
        use crate::state::global::ChangePointResult;

        let points = vec![pt("2020-01-01", 50.0), pt("2020-06-01", 55.0)];
        let events = vec![event("2020-06-01", "Policy X")];
        let model = ChangePointResult {
            most_probable_date: "2020-06-01".to_string(),
            sigma_1_mean: 0.01,
            sigma_2_mean: 0.05,
        };

        let expected_ts = parse_date_ms("2020-06-01");
        let plot = Plot::from_points(&points).unwrap();

        // Exactly one event marker, positioned at the same x as the change point
        let markers = event_markers(&events);
        assert_eq!(markers.len(), 1);
        assert!(model.ts().is_finite());
        assert_eq!(markers[0].0, model.ts());
        assert!(plot.contains_x(model.ts()));
        assert_eq!(plot.x(markers[0].0), plot.x(model.ts()));

        // Hovering the second data point surfaces the event label
        let hovered = nearest_point(&points, expected_ts).unwrap();
        assert_eq!(hovered, 1);
        let matched = event_at(&events, points[hovered].ts).unwrap();
        assert_eq!(matched.label, "Policy X");
    }
}
