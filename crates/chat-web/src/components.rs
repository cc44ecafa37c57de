//! UI Components

use std::rc::Rc;

use chrono::Utc;
use leptos::prelude::*;
use rust_decimal::prelude::ToPrimitive;

use chat_core::{
    chart::{self, ChartClient, ChartPanel, ChartRequest, ChartStatus, PriceSeries, Timeframe},
    conversation::SUGGESTIONS,
    detector::AssetId,
    message::Turn,
};

/// Shared chart backend handle; `Rc` keeps it on the local arena
pub type ChartHandle = StoredValue<Rc<dyn ChartClient>, LocalStorage>;

const CHART_WIDTH: f64 = 320.0;
const CHART_HEIGHT: f64 = 120.0;

/// Message bubble component; assistant turns about an asset carry a chart
#[component]
pub fn MessageBubble(turn: Turn, chart: ChartHandle) -> impl IntoView {
    let class = if turn.is_user() {
        "message message-user"
    } else {
        "message message-assistant"
    };
    let age = turn.age_label(Utc::now());
    let asset = turn.chart_asset();

    view! {
        <div class=class>
            <p class="content">{turn.text}</p>
            <span class="age">{age}</span>
            {asset.map(|asset| view! { <PriceChart asset=asset chart=chart /> })}
        </div>
    }
}

/// Inline price chart with its own timeframe selector
#[component]
pub fn PriceChart(asset: AssetId, chart: ChartHandle) -> impl IntoView {
    let (initial, request) = ChartPanel::for_asset(asset);
    let panel = RwSignal::new(initial);

    let load = move |request: ChartRequest| {
        leptos::task::spawn_local(async move {
            let client = chart.get_value();
            let result = chart::fetch(client.as_ref(), request).await;
            panel.update(|p| {
                p.apply(request, result);
            });
        });
    };
    load(request);

    let buttons = Timeframe::ALL
        .into_iter()
        .map(|tf| {
            let class = move || {
                if panel.with(ChartPanel::timeframe) == tf {
                    "timeframe active"
                } else {
                    "timeframe"
                }
            };
            view! {
                <button
                    class=class
                    on:click=move |_| {
                        if let Some(request) = panel.try_update(|p| p.set_timeframe(tf)).flatten() {
                            load(request);
                        }
                    }
                >
                    {tf.label()}
                </button>
            }
        })
        .collect_view();

    let body = move || match panel.with(|p| p.status().clone()) {
        ChartStatus::Idle => ().into_any(),
        ChartStatus::Loading => view! { <div class="chart-loading">"Loading chart..."</div> }.into_any(),
        ChartStatus::Failed(message) => view! { <div class="chart-error">{message}</div> }.into_any(),
        ChartStatus::Ready(series) => {
            let latest = series
                .latest_price()
                .map(|p| format!("${p:.2}"))
                .unwrap_or_default();
            view! {
                <div class="chart-latest">{latest}</div>
                <svg
                    class="chart-line"
                    viewBox=format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")
                    preserveAspectRatio="none"
                >
                    <polyline fill="none" stroke="currentColor" points=polyline_points(&series, CHART_WIDTH, CHART_HEIGHT) />
                </svg>
            }
            .into_any()
        }
    };

    view! {
        <div class="price-chart">
            <h4>{format!("{} Price Chart", asset.as_str().to_uppercase())}</h4>
            <div class="timeframes">{buttons}</div>
            {body}
        </div>
    }
}

/// Quick-start prompts shown while the conversation is fresh
#[component]
pub fn SuggestionChips(on_pick: Callback<String>) -> impl IntoView {
    let chips = SUGGESTIONS
        .into_iter()
        .map(|text| {
            view! {
                <button class="suggestion" on:click=move |_| on_pick.run(text.to_string())>
                    {text}
                </button>
            }
        })
        .collect_view();

    view! { <div class="suggestions">{chips}</div> }
}

/// SVG polyline points scaled into a `width` x `height` box, y pointing down
pub fn polyline_points(series: &PriceSeries, width: f64, height: f64) -> String {
    let prices: Vec<f64> = series.prices().iter().filter_map(ToPrimitive::to_f64).collect();
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if high > low { high - low } else { 1.0 };
    #[allow(clippy::cast_precision_loss)]
    let step = if prices.len() > 1 { width / (prices.len() - 1) as f64 } else { 0.0 };

    prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64 * step;
            let y = height - (price - low) / span * height;
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
