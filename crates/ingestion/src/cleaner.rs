//! Quote cleaning and normalization.
//!
//! Filters raw quotes down to regular-hours, positive, uncrossed quotes from
//! the allowed market centers and normalizes them into [`CleanedQuote`]s
//! ordered by (symbol, exchange, timestamp).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use hliq_core::{CleanedQuote, CleaningConfig, RawQuote};
use serde::Serialize;
use tracing::debug;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Row accounting for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    /// Rows handed to the cleaner.
    pub rows_in: usize,
    /// Dropped: exchange not in the allowed set.
    pub dropped_exchange: usize,
    /// Dropped: date/time did not parse.
    pub dropped_timestamp: usize,
    /// Dropped: outside the session window.
    pub dropped_session: usize,
    /// Dropped: non-positive (or missing) bid or ask.
    pub dropped_price: usize,
    /// Dropped: crossed or locked market.
    pub dropped_spread: usize,
    /// Rows in the cleaned table.
    pub rows_out: usize,
}

impl CleaningStats {
    /// Total rows removed by all filters.
    pub fn dropped(&self) -> usize {
        self.dropped_exchange
            + self.dropped_timestamp
            + self.dropped_session
            + self.dropped_price
            + self.dropped_spread
    }
}

/// Parse a date string in one of the accepted formats.
fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
}

/// Parse a time-of-day string in one of the accepted formats.
fn parse_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
}

/// Combine date and time strings into a UTC timestamp floored to whole seconds.
pub fn parse_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = parse_date(date)?;
    let time = parse_time(time)?.with_nanosecond(0)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

/// Round a price difference to whole cents, ties to even.
#[inline]
fn to_cents(spread: f64) -> i64 {
    (spread * 100.0).round_ties_even() as i64
}

/// Cleaner for raw quote tables.
pub struct QuoteCleaner {
    config: CleaningConfig,
}

impl QuoteCleaner {
    /// Create a new cleaner.
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    fn exchange_allowed(&self, exchange: &str) -> bool {
        self.config.allowed_exchanges.iter().any(|e| e == exchange)
    }

    fn in_session(&self, ts: &DateTime<Utc>) -> bool {
        let t = ts.time();
        t >= self.config.session_start && t <= self.config.session_end
    }

    /// Clean a raw quote table.
    pub fn clean(&self, raw: &[RawQuote]) -> Vec<CleanedQuote> {
        self.clean_with_stats(raw).0
    }

    /// Clean a raw quote table and report how many rows each filter removed.
    pub fn clean_with_stats(&self, raw: &[RawQuote]) -> (Vec<CleanedQuote>, CleaningStats) {
        let mut stats = CleaningStats {
            rows_in: raw.len(),
            ..CleaningStats::default()
        };

        let mut stamped: Vec<(&RawQuote, DateTime<Utc>)> = Vec::with_capacity(raw.len());
        for quote in raw {
            if !self.exchange_allowed(&quote.exchange) {
                stats.dropped_exchange += 1;
                continue;
            }
            match parse_timestamp(&quote.date, &quote.time) {
                Some(ts) => stamped.push((quote, ts)),
                None => stats.dropped_timestamp += 1,
            }
        }

        // Stable, so rows sharing a key keep their input order.
        stamped.sort_by(|(a, ts_a), (b, ts_b)| {
            a.symbol
                .cmp(&b.symbol)
                .then_with(|| a.exchange.cmp(&b.exchange))
                .then_with(|| ts_a.cmp(ts_b))
        });

        let mut cleaned = Vec::with_capacity(stamped.len());
        for (quote, ts) in stamped {
            if !self.in_session(&ts) {
                stats.dropped_session += 1;
                continue;
            }
            // Written as negated `>` so NaN prices are dropped too.
            if !(quote.bid > 0.0 && quote.ask > 0.0) {
                stats.dropped_price += 1;
                continue;
            }
            let spread = quote.ask - quote.bid;
            if spread <= 0.0 {
                stats.dropped_spread += 1;
                continue;
            }

            cleaned.push(CleanedQuote {
                symbol: quote.symbol.clone(),
                exchange: quote.exchange.clone(),
                ts,
                bid: quote.bid,
                offer: quote.ask,
                bid_size: quote.bid_size,
                ask_size: quote.ask_size,
                spread,
                spread_cents: to_cents(spread),
                time: ts.format("%H:%M:%S").to_string(),
            });
        }

        stats.rows_out = cleaned.len();
        debug!(?stats, "cleaned quote table");
        (cleaned, stats)
    }
}

impl Default for QuoteCleaner {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}
