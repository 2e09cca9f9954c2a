//! Quote table loading.
//!
//! Reads a comma-separated quote table with a header row into [`RawQuote`]s.
//! Required columns are located by name, so column order is free and extra
//! columns are ignored.
//!
//! Fields are split on every comma. A field may be wrapped in double quotes,
//! but a quoted field must not itself contain a comma.

use hliq_core::{Error, RawQuote, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Columns the loader requires, matched case-sensitively.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "DATE", "TIME_M", "EX", "SYM_ROOT", "BID", "ASK", "BIDSIZ", "OFRSIZ",
];

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    time: usize,
    exchange: usize,
    symbol: usize,
    bid: usize,
    ask: usize,
    bid_size: usize,
    ask_size: usize,
}

impl ColumnIndex {
    fn from_header(header: &[&str]) -> Result<Self> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = header
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| Error::schema(format!("missing required column '{}'", name)))?;
        }

        let [date, time, exchange, symbol, bid, ask, bid_size, ask_size] = positions;
        Ok(Self {
            date,
            time,
            exchange,
            symbol,
            bid,
            ask,
            bid_size,
            ask_size,
        })
    }
}

/// Split a CSV line into trimmed fields, removing surrounding double quotes.
fn split_fields(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|f| {
            let f = f.trim();
            f.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(f)
        })
        .collect()
}

/// Parse a numeric field. Empty fields read as NaN; anything else that is not
/// a number is a schema violation.
fn parse_number(value: &str, column: &str, line_number: usize) -> Result<f64> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|_| {
        Error::schema(format!(
            "column '{}' line {}: cannot parse '{}' as a number",
            column, line_number, value
        ))
    })
}

fn parse_row(fields: &[&str], idx: &ColumnIndex, line_number: usize) -> Result<RawQuote> {
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    Ok(RawQuote {
        symbol: field(idx.symbol).to_string(),
        exchange: field(idx.exchange).to_string(),
        date: field(idx.date).to_string(),
        time: field(idx.time).to_string(),
        bid: parse_number(field(idx.bid), "BID", line_number)?,
        ask: parse_number(field(idx.ask), "ASK", line_number)?,
        bid_size: parse_number(field(idx.bid_size), "BIDSIZ", line_number)?,
        ask_size: parse_number(field(idx.ask_size), "OFRSIZ", line_number)?,
    })
}

/// Read a quote table from any reader.
pub fn read_quotes<R: Read>(reader: R) -> Result<Vec<RawQuote>> {
    // Physical line numbers, 1-based, counting blank lines.
    let mut lines = BufReader::new(reader)
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line));

    let header_line = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(Error::schema("quote table is empty (no header row)")),
        }
    };

    // A UTF-8 byte order mark would otherwise stick to the first column name.
    let header_line = header_line.trim_start_matches('\u{feff}');
    let header = split_fields(header_line);
    let idx = ColumnIndex::from_header(&header)?;

    let mut quotes = Vec::new();
    for (line_number, line) in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let fields = split_fields(trimmed);
        quotes.push(parse_row(&fields, &idx, line_number)?);
    }

    debug!(rows = quotes.len(), "loaded quote table");
    Ok(quotes)
}

/// Load a quote table from a CSV file.
pub fn load_quotes_csv(path: impl AsRef<Path>) -> Result<Vec<RawQuote>> {
    let file = File::open(path.as_ref())?;
    read_quotes(file)
}
