//! Terminal rendering for turns and charts

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use chat_core::{
    chart::{ChartPanel, ChartStatus, PriceSeries, Timeframe},
    detector::AssetId,
    message::Turn,
};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the sparkline in columns
pub const SPARK_WIDTH: usize = 48;

/// One turn as printed in the transcript
pub fn turn(turn: &Turn, now: DateTime<Utc>) -> String {
    let author = if turn.is_user() { "You" } else { "Assistant" };
    let text = turn
        .text
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{author} · {}\n{text}", turn.age_label(now))
}

/// Badge shown in the prompt for the most recently detected asset
pub fn badge(asset: Option<AssetId>) -> String {
    asset.map_or_else(String::new, |a| format!("[{}] ", a.display_name()))
}

/// Timeframe selector with the active entry bracketed
pub fn timeframes(active: Timeframe) -> String {
    let buttons: Vec<String> = Timeframe::ALL
        .iter()
        .map(|tf| {
            if *tf == active {
                format!("[{}]", tf.label())
            } else {
                tf.label().to_string()
            }
        })
        .collect();
    format!("Timeframe: {}", buttons.join(" "))
}

/// Chart block for a panel in any state
pub fn chart(panel: &ChartPanel) -> String {
    let Some(asset) = panel.asset() else {
        return "No cryptocurrency discussed yet.".into();
    };

    let header = format!("{} Price Chart", asset.as_str().to_uppercase());
    let body = match panel.status() {
        ChartStatus::Idle => String::new(),
        ChartStatus::Loading => "Loading chart...".into(),
        ChartStatus::Failed(message) => message.clone(),
        ChartStatus::Ready(series) => series_summary(series),
    };
    format!("{header}\n{}\n{body}", timeframes(panel.timeframe()))
}

fn series_summary(series: &PriceSeries) -> String {
    let Some(latest) = series.latest_price() else {
        return "No price data for this timeframe.".into();
    };

    let mut lines = vec![format!("Latest price: ${latest:.2}")];
    if let Some(change) = series.change_percent() {
        lines.push(format!("Change: {change:+.2}%"));
    }
    if let Some((low, high)) = series.range() {
        lines.push(format!("Range: ${low:.2} – ${high:.2}"));
    }
    lines.push(sparkline(series.prices(), SPARK_WIDTH));
    lines.join("\n")
}

/// Bar-glyph sparkline, bucket-averaged down to at most `width` columns
pub fn sparkline(prices: &[Decimal], width: usize) -> String {
    if prices.is_empty() || width == 0 {
        return String::new();
    }

    let chunk = prices.len().div_ceil(width);
    let columns: Vec<Decimal> = prices
        .chunks(chunk)
        .map(|c| c.iter().copied().sum::<Decimal>() / Decimal::from(c.len()))
        .collect();

    let low = columns.iter().copied().min().unwrap_or_default();
    let high = columns.iter().copied().max().unwrap_or_default();
    let span = high - low;
    let top = Decimal::from(SPARK_LEVELS.len() - 1);

    columns
        .iter()
        .map(|value| {
            if span.is_zero() {
                return SPARK_LEVELS[0];
            }
            let index = ((*value - low) / span * top).round().to_usize().unwrap_or(0);
            SPARK_LEVELS[index.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sparkline_levels() {
        let line = sparkline(&[dec!(1), dec!(2), dec!(3), dec!(8)], 10);
        assert_eq!(line.chars().count(), 4);
        assert!(line.starts_with('▁'));
        assert!(line.ends_with('█'));
    }

    #[test]
    fn test_sparkline_flat_and_empty() {
        assert_eq!(sparkline(&[dec!(5), dec!(5)], 10), "▁▁");
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn test_sparkline_downsamples() {
        let prices: Vec<Decimal> = (1..=365).map(Decimal::from).collect();
        assert!(sparkline(&prices, SPARK_WIDTH).chars().count() <= SPARK_WIDTH);
    }

    #[test]
    fn test_chart_states() {
        assert_eq!(chart(&ChartPanel::new()), "No cryptocurrency discussed yet.");

        let (mut panel, request) = ChartPanel::for_asset(AssetId::Bitcoin);
        assert!(chart(&panel).contains("Loading chart..."));

        let series = PriceSeries::new(vec![1, 2], vec![dec!(100), dec!(110)]).unwrap();
        panel.apply(request, Ok(series));
        let out = chart(&panel);
        assert!(out.starts_with("BITCOIN Price Chart"));
        assert!(out.contains("[1M]"));
        assert!(out.contains("Latest price: $110.00"));
        assert!(out.contains("Change: +10.00%"));
    }

    #[test]
    fn test_turn_and_badge() {
        let t = Turn::user("eth?", Some(AssetId::Ethereum));
        let out = turn(&t, t.created_at);
        assert_eq!(out, "You · just now\n  eth?");
        assert_eq!(badge(Some(AssetId::Ethereum)), "[Ethereum] ");
        assert_eq!(badge(None), "");
    }
}
