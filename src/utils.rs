use crate::projector;

use chrono::TimeZone;

/// Date/time format of the x-axis ticks (date over time).
pub const AXIS_TICK_FORMAT: &str = "%Y-%m-%d\n%H:%M:%S";

/// Date/time format of the hover tooltip.
pub const TOOLTIP_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configures a custom Rayon thread pool with specified size.
///
/// Used when `--threads` is given so that batch processing doesn't touch the
/// global Rayon pool.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Formats an epoch-seconds timestamp with a chrono format string, in UTC.
///
/// The value is truncated to `u64` first without any range check, so negative
/// timestamps saturate to the epoch.
///
/// # Errors
/// * If the truncated value is outside chrono's representable range.
pub fn format_timestamp(ts: f64, format: &str) -> anyhow::Result<String> {
    let secs = ts as u64;
    let dt = i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::Utc.timestamp_opt(s, 0).single())
        .ok_or_else(|| anyhow::anyhow!("Timestamp {} is out of range", secs))?;
    anyhow::Ok(dt.format(format).to_string())
}

/// Text of an x-axis tick label.
pub fn format_axis_tick(ts: f64) -> anyhow::Result<String> {
    format_timestamp(ts, AXIS_TICK_FORMAT)
}

/// Hover tooltip for a candle: timestamp plus O/H/L/C at two decimals.
///
/// # Example Output
/// ```text
/// Timestamp: 2023-11-14 22:13:20
/// O: 10.00
/// H: 12.00
/// L: 9.00
/// C: 11.00
/// ```
pub fn format_tooltip(candle: &projector::Candle) -> anyhow::Result<String> {
    let date = format_timestamp(candle.timestamp, TOOLTIP_TIME_FORMAT)?;
    anyhow::Ok(format!(
        "Timestamp: {}\nO: {:.2}\nH: {:.2}\nL: {:.2}\nC: {:.2}",
        date, candle.open, candle.high, candle.low, candle.close,
    ))
}

/// One line per candle for the first `count` candles, tooltip fields comma-joined.
pub fn format_candles(candles: &[projector::Candle], count: usize) -> anyhow::Result<String> {
    let mut text = String::new();
    for candle in candles.iter().take(count) {
        let tooltip = format_tooltip(candle)?;
        text.push_str(&format!(" - {}\n", tooltip.replace('\n', ", ")));
    }

    anyhow::Ok(text)
}
