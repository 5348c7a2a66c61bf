use crate::column_store::{self, ColumnStore};
use crate::error::ChartError;

pub const TIMESTAMP: &str = "timestamp";
pub const PRICE_OPEN: &str = "price_open";
pub const PRICE_HIGH: &str = "price_high";
pub const PRICE_LOW: &str = "price_low";
pub const PRICE_CLOSE: &str = "price_close";
pub const VOLUME: &str = "volume";

/// Indicator overlay used when none is configured explicitly.
pub const DEFAULT_INDICATOR: &str = "sma9";

/// Width of candle bodies and volume bars, in timestamp units.
pub const BAR_WIDTH: f64 = 50.0;

/// One candlestick: timestamp plus open/high/low/close.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub timestamp: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// One bar of the volume histogram.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeBar {
    pub timestamp: f64,
    pub volume: f64,
}

/// One point of an indicator overlay line.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: f64,
    pub value: f64,
}

/// Named indicator overlay. Only rows holding real data contribute a point, so the
/// series may be shorter than the candle series and have gaps.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: Vec<IndicatorPoint>,
}

/// Tight bounding box over the (timestamp, high) pairs of rows with a valid indicator.
///
/// Starts inverted at (+∞, +∞, −∞, −∞) so the first observation overwrites every
/// edge; after that it only widens.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl AxisBounds {
    pub fn new() -> Self {
        AxisBounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn widen(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// `true` while nothing has widened the box since the last reset.
    pub fn is_unset(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a renderer needs to draw one loaded file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartFrame {
    pub candles: Vec<Candle>,
    pub volume: Vec<VolumeBar>,
    pub indicator: Option<IndicatorSeries>,
    pub bounds: AxisBounds,
    pub bar_width: f64,
}

impl ChartFrame {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Derives the renderable series from a loaded [`ColumnStore`].
#[derive(Debug, Clone)]
pub struct SeriesProjector {
    indicator: Option<String>,
}

impl SeriesProjector {
    pub fn new<S: Into<String>>(indicator: S) -> Self {
        SeriesProjector {
            indicator: Some(indicator.into()),
        }
    }

    /// Projects candles and volume only; the bounds stay unset.
    pub fn without_indicator() -> Self {
        SeriesProjector { indicator: None }
    }

    pub fn indicator(&self) -> Option<&str> {
        self.indicator.as_deref()
    }

    /// Walks the store once in row order and builds a complete frame.
    ///
    /// Candles and volume bars are emitted for every row, sentinel or not. An indicator
    /// point is emitted only where the indicator holds real data, and those same rows
    /// widen the bounds with `(timestamp, high)`: the box frames price action over the
    /// span the indicator covers, not the indicator's own range.
    ///
    /// # Errors
    /// * `ChartError::UnknownColumn` if a required column or the configured indicator is
    ///   missing from the store.
    pub fn project(&self, store: &ColumnStore) -> Result<ChartFrame, ChartError> {
        let timestamp = store.get(TIMESTAMP)?.samples();
        let open = store.get(PRICE_OPEN)?.samples();
        let high = store.get(PRICE_HIGH)?.samples();
        let low = store.get(PRICE_LOW)?.samples();
        let close = store.get(PRICE_CLOSE)?.samples();
        let volume = store.get(VOLUME)?.samples();
        let indicator = match &self.indicator {
            Some(name) => Some(store.get(name)?),
            None => None,
        };

        let n = timestamp.len();
        let mut candles = Vec::with_capacity(n);
        let mut volume_bars = Vec::with_capacity(n);
        let mut points = Vec::new();
        let mut bounds = AxisBounds::new();

        for i in 0..n {
            candles.push(Candle {
                timestamp: timestamp[i],
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
            });
            volume_bars.push(VolumeBar {
                timestamp: timestamp[i],
                volume: volume[i],
            });

            if let Some(value) = indicator.and_then(|column| column.get(i)) {
                if column_store::is_valid(value) {
                    points.push(IndicatorPoint {
                        timestamp: timestamp[i],
                        value,
                    });
                    bounds.widen(timestamp[i], high[i]);
                }
            }
        }

        tracing::debug!(
            candles = candles.len(),
            indicator_points = points.len(),
            "projected chart series"
        );

        Ok(ChartFrame {
            candles,
            volume: volume_bars,
            indicator: indicator.map(|column| IndicatorSeries {
                name: column.name().to_string(),
                points,
            }),
            bounds,
            bar_width: BAR_WIDTH,
        })
    }
}

impl Default for SeriesProjector {
    fn default() -> Self {
        Self::new(DEFAULT_INDICATOR)
    }
}
