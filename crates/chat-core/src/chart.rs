//! Price Charts
//!
//! Timeframes, price series, the chart backend trait and the per-chart panel
//! state that guards against stale responses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

use crate::detector::AssetId;
use crate::error::{ChatError, Result};

/// Message shown in place of a chart that failed to load
pub const CHART_ERROR_TEXT: &str = "Failed to load chart data. Please try again later.";

/// Chart window selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl Timeframe {
    /// All timeframes in button order
    pub const ALL: [Self; 5] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::OneYear,
    ];

    /// Wire value (e.g., "1wk")
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::OneYear => "1y",
        }
    }

    /// Button label (e.g., "1W")
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1Y",
        }
    }

    /// Window length in days
    pub const fn days(self) -> u32 {
        match self {
            Self::OneDay => 1,
            Self::OneWeek => 7,
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::OneYear => 365,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(wanted) || tf.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ChatError::UnknownTimeframe(s.to_string()))
    }
}

/// Raw chart backend payload
#[derive(Clone, Debug, Deserialize)]
pub struct SeriesPayload {
    /// Epoch seconds, oldest first
    pub timestamps: Vec<i64>,
    pub prices: Vec<Decimal>,
}

/// Validated, time-ordered price series
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    timestamps: Vec<i64>,
    prices: Vec<Decimal>,
}

impl PriceSeries {
    /// Build a series; lengths must match and timestamps must not go backwards
    pub fn new(timestamps: Vec<i64>, prices: Vec<Decimal>) -> Result<Self> {
        if timestamps.len() != prices.len() {
            return Err(ChatError::MalformedSeries(format!(
                "{} timestamps but {} prices",
                timestamps.len(),
                prices.len()
            )));
        }
        if timestamps.windows(2).any(|w| w[1] < w[0]) {
            return Err(ChatError::MalformedSeries("timestamps out of order".into()));
        }
        Ok(Self { timestamps, prices })
    }

    /// Parse a chart backend response body
    pub fn from_json(raw: &str) -> Result<Self> {
        let payload: SeriesPayload = serde_json::from_str(raw)
            .map_err(|e| ChatError::MalformedSeries(e.to_string()))?;
        Self::try_from(payload)
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn prices(&self) -> &[Decimal] {
        &self.prices
    }

    /// `(time, price)` pairs, oldest first
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, Decimal)> + '_ {
        self.timestamps
            .iter()
            .zip(&self.prices)
            .filter_map(|(ts, price)| DateTime::from_timestamp(*ts, 0).map(|t| (t, *price)))
    }

    pub fn latest_price(&self) -> Option<Decimal> {
        self.prices.last().copied()
    }

    /// Percentage change from the first to the last price
    pub fn change_percent(&self) -> Option<Decimal> {
        let first = *self.prices.first()?;
        let last = *self.prices.last()?;
        if first.is_zero() {
            return None;
        }
        Some((last - first) / first * Decimal::ONE_HUNDRED)
    }

    /// Lowest and highest price in the window
    pub fn range(&self) -> Option<(Decimal, Decimal)> {
        let min = self.prices.iter().min()?;
        let max = self.prices.iter().max()?;
        Some((*min, *max))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl TryFrom<SeriesPayload> for PriceSeries {
    type Error = ChatError;

    fn try_from(payload: SeriesPayload) -> Result<Self> {
        Self::new(payload.timestamps, payload.prices)
    }
}

/// Chart backend trait (Strategy pattern)
///
/// Implement this for each market-data source.
#[async_trait(?Send)]
pub trait ChartClient {
    /// Fetch the price series for an asset over a timeframe
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Chart client that falls back to a second source on failure
pub struct FallbackChartClient {
    primary: Rc<dyn ChartClient>,
    fallback: Rc<dyn ChartClient>,
    name: String,
}

impl FallbackChartClient {
    pub fn new(primary: Rc<dyn ChartClient>, fallback: Rc<dyn ChartClient>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self { primary, fallback, name }
    }
}

#[async_trait(?Send)]
impl ChartClient for FallbackChartClient {
    async fn price_series(&self, asset: AssetId, timeframe: Timeframe) -> Result<PriceSeries> {
        match self.primary.price_series(asset, timeframe).await {
            Ok(series) => Ok(series),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "Primary chart source failed, using fallback: {}",
                    e
                );
                self.fallback.price_series(asset, timeframe).await
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// What a chart panel is currently showing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChartStatus {
    /// No asset selected
    #[default]
    Idle,
    Loading,
    Ready(PriceSeries),
    /// Localized error text shown instead of the chart
    Failed(String),
}

/// Ticket for one in-flight chart fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartRequest {
    pub asset: AssetId,
    pub timeframe: Timeframe,
}

/// State of one rendered chart
///
/// Every asset or timeframe change hands back a [`ChartRequest`]; the result
/// is committed through [`ChartPanel::apply`], which drops responses for a
/// request that no longer matches the panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartPanel {
    asset: Option<AssetId>,
    timeframe: Timeframe,
    status: ChartStatus,
}

impl ChartPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel for a fixed asset, already waiting on its first fetch
    pub fn for_asset(asset: AssetId) -> (Self, ChartRequest) {
        let mut panel = Self::new();
        let request = panel
            .set_asset(Some(asset))
            .unwrap_or(ChartRequest { asset, timeframe: panel.timeframe });
        (panel, request)
    }

    pub const fn asset(&self) -> Option<AssetId> {
        self.asset
    }

    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub const fn status(&self) -> &ChartStatus {
        &self.status
    }

    /// Point the panel at another asset (or none)
    pub fn set_asset(&mut self, asset: Option<AssetId>) -> Option<ChartRequest> {
        if asset == self.asset && self.status != ChartStatus::Idle {
            return None;
        }
        self.asset = asset;
        self.refresh()
    }

    /// Switch timeframe; re-fetches the same asset
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> Option<ChartRequest> {
        if timeframe == self.timeframe && self.status != ChartStatus::Idle {
            return None;
        }
        self.timeframe = timeframe;
        self.refresh()
    }

    /// Start a fetch for the current asset and timeframe
    pub fn refresh(&mut self) -> Option<ChartRequest> {
        let Some(asset) = self.asset else {
            self.status = ChartStatus::Idle;
            return None;
        };
        self.status = ChartStatus::Loading;
        Some(ChartRequest { asset, timeframe: self.timeframe })
    }

    /// Commit a fetch result. Returns `false` when the response is stale.
    pub fn apply(&mut self, request: ChartRequest, result: Result<PriceSeries>) -> bool {
        if self.asset != Some(request.asset) || self.timeframe != request.timeframe {
            tracing::debug!(
                asset = %request.asset,
                timeframe = %request.timeframe,
                "Discarding stale chart response"
            );
            return false;
        }

        self.status = match result {
            Ok(series) => ChartStatus::Ready(series),
            Err(e) => {
                tracing::warn!(asset = %request.asset, "Chart fetch failed: {}", e);
                ChartStatus::Failed(CHART_ERROR_TEXT.into())
            }
        };
        true
    }
}

/// Run one chart request against a client
pub async fn fetch(client: &dyn ChartClient, request: ChartRequest) -> Result<PriceSeries> {
    tracing::debug!(
        source = client.name(),
        asset = %request.asset,
        timeframe = %request.timeframe,
        "Fetching price series"
    );
    client.price_series(request.asset, request.timeframe).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series() -> PriceSeries {
        PriceSeries::new(vec![100, 200, 300], vec![dec!(10), dec!(12.5), dec!(15)]).unwrap()
    }

    struct FixedChart;

    #[async_trait(?Send)]
    impl ChartClient for FixedChart {
        async fn price_series(&self, asset: AssetId, _timeframe: Timeframe) -> Result<PriceSeries> {
            match asset {
                AssetId::Bitcoin => Ok(series()),
                other => Err(ChatError::Chart(format!("{other} unavailable"))),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_timeframe_parse_and_wire() {
        assert_eq!(Timeframe::default(), Timeframe::OneMonth);
        assert_eq!("1wk".parse::<Timeframe>().unwrap(), Timeframe::OneWeek);
        assert_eq!("3M".parse::<Timeframe>().unwrap(), Timeframe::ThreeMonths);
        assert!("2y".parse::<Timeframe>().is_err());
        assert_eq!(serde_json::to_string(&Timeframe::OneYear).unwrap(), "\"1y\"");
        assert_eq!(Timeframe::OneYear.days(), 365);
    }

    #[test]
    fn test_series_validation() {
        assert!(PriceSeries::new(vec![1, 2], vec![dec!(1)]).is_err());
        assert!(PriceSeries::new(vec![2, 1], vec![dec!(1), dec!(2)]).is_err());
        assert!(PriceSeries::new(vec![], vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_series_from_json_numbers() {
        let s = PriceSeries::from_json(r#"{"symbol":"bitcoin","timestamps":[1,2],"prices":[97000.5,97250]}"#)
            .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.latest_price(), Some(dec!(97250)));
        assert!(PriceSeries::from_json(r#"{"timestamps":[1],"prices":[]}"#).is_err());
    }

    #[test]
    fn test_series_stats() {
        let s = series();
        assert_eq!(s.change_percent(), Some(dec!(50)));
        assert_eq!(s.range(), Some((dec!(10), dec!(15))));
        assert_eq!(s.points().count(), 3);
    }

    #[test]
    fn test_panel_applies_matching_response() {
        let (mut panel, request) = ChartPanel::for_asset(AssetId::Bitcoin);
        assert_eq!(panel.status(), &ChartStatus::Loading);
        assert!(panel.apply(request, Ok(series())));
        assert_eq!(panel.status(), &ChartStatus::Ready(series()));
    }

    #[test]
    fn test_panel_discards_stale_asset() {
        let mut panel = ChartPanel::new();
        let old = panel.set_asset(Some(AssetId::Bitcoin)).unwrap();
        let new = panel.set_asset(Some(AssetId::Ethereum)).unwrap();

        assert!(!panel.apply(old, Ok(series())));
        assert_eq!(panel.status(), &ChartStatus::Loading);
        assert!(panel.apply(new, Ok(series())));
    }

    #[test]
    fn test_panel_discards_stale_timeframe() {
        let (mut panel, first) = ChartPanel::for_asset(AssetId::Solana);
        let second = panel.set_timeframe(Timeframe::OneYear).unwrap();
        assert_eq!(second.asset, AssetId::Solana);

        assert!(!panel.apply(first, Ok(series())));
        assert!(panel.apply(second, Err(ChatError::Chart("down".into()))));
        assert_eq!(panel.status(), &ChartStatus::Failed(CHART_ERROR_TEXT.into()));
    }

    #[test]
    fn test_panel_without_asset_is_idle() {
        let mut panel = ChartPanel::new();
        assert!(panel.refresh().is_none());
        assert!(panel.set_timeframe(Timeframe::OneDay).is_none());
        assert_eq!(panel.status(), &ChartStatus::Idle);
    }

    #[tokio::test]
    async fn test_fallback_client() {
        let client = FallbackChartClient::new(Rc::new(FixedChart), Rc::new(FixedChart));
        assert_eq!(client.name(), "fixed+fixed");
        assert!(client.price_series(AssetId::Bitcoin, Timeframe::OneDay).await.is_ok());
        assert!(client.price_series(AssetId::Solana, Timeframe::OneDay).await.is_err());

        struct Flat;

        #[async_trait(?Send)]
        impl ChartClient for Flat {
            async fn price_series(&self, _asset: AssetId, _timeframe: Timeframe) -> Result<PriceSeries> {
                PriceSeries::new(vec![1], vec![dec!(1)])
            }

            fn name(&self) -> &str {
                "flat"
            }
        }

        let client = FallbackChartClient::new(Rc::new(FixedChart), Rc::new(Flat));
        let series = client.price_series(AssetId::Solana, Timeframe::OneDay).await.unwrap();
        assert_eq!(series.latest_price(), Some(dec!(1)));
    }

    #[tokio::test]
    async fn test_fetch_through_client() {
        let (mut panel, request) = ChartPanel::for_asset(AssetId::Bitcoin);
        let result = fetch(&FixedChart, request).await;
        assert!(panel.apply(request, result));
        assert!(matches!(panel.status(), ChartStatus::Ready(_)));

        let request = panel.set_asset(Some(AssetId::Cardano)).unwrap();
        let result = fetch(&FixedChart, request).await;
        assert!(panel.apply(request, result));
        assert!(matches!(panel.status(), ChartStatus::Failed(_)));
    }
}
