//! End-to-end estimation scenarios on synthetic quote tables.

use approx::assert_relative_eq;
use hliq_core::{Config, Error, RawQuote};
use hliq_estimation::{run_pipeline, weighted_loss, Estimator};
use std::io::Write;

const ROWS: usize = 400;
const PER_DECILE: usize = ROWS / 10;

fn clock(sec: usize) -> String {
    let total = 10 * 3600 + sec;
    format!("{:02}:{:02}:{:02}.250", total / 3600, (total / 60) % 60, total % 60)
}

fn raw(symbol: &str, ex: &str, sec: usize, bid: f64, ask: f64, bid_size: f64, ask_size: f64) -> RawQuote {
    RawQuote {
        symbol: symbol.to_string(),
        exchange: ex.to_string(),
        date: "2024-01-02".to_string(),
        time: clock(sec),
        bid,
        ask,
        bid_size,
        ask_size,
    }
}

/// One symbol on two exchanges. Sizes are permutations of 1..=400, so every
/// decile holds exactly 40 quotes; the next mid on the same exchange rises
/// exactly when the bid decile exceeds the ask decile.
fn bid_led_table(symbol: &str) -> Vec<RawQuote> {
    let mut mids = [100.0_f64, 100.0_f64];
    let mut quotes = Vec::with_capacity(ROWS);
    for k in 0..ROWS {
        let bid_size = ((k * 7919) % ROWS + 1) as f64;
        let ask_size = ((k * 123 + 57) % ROWS + 1) as f64;
        let lane = k % 2;
        let ex = if lane == 0 { "T" } else { "P" };
        let mid = mids[lane];
        quotes.push(raw(symbol, ex, k, mid - 0.01, mid + 0.01, bid_size, ask_size));

        let bid_dec = (bid_size as usize - 1) / PER_DECILE + 1;
        let ask_dec = (ask_size as usize - 1) / PER_DECILE + 1;
        mids[lane] = if bid_dec > ask_dec { mid + 0.01 } else { mid - 0.01 };
    }
    quotes
}

fn estimator() -> Estimator {
    Estimator::new(Config::default()).unwrap()
}

#[test]
fn bid_led_moves_fit_small_h() {
    let table = bid_led_table("AAPL");
    let result = estimator().estimate_raw(&table, "AAPL").unwrap();

    assert_eq!(result.u_empirical.shape(), (10, 10));
    assert_eq!(result.u_model.shape(), (10, 10));
    assert!(result.implied_h >= 0.001 && result.implied_h < 0.01);
    assert!(result.loss < 0.01);
    assert!(result.loss < weighted_loss(5.0, &result.u_empirical, &result.d_weights));

    for i in 1..=10 {
        for j in 1..=10 {
            if result.d_weights.get(i, j) == 0.0 {
                continue;
            }
            let expected = if i > j { 1.0 } else { 0.0 };
            assert_eq!(result.u_empirical.get(i, j), expected, "cell ({}, {})", i, j);
        }
    }
}

#[test]
fn matrix_invariants_hold() {
    let result = estimator().estimate_raw(&bid_led_table("AAPL"), "AAPL").unwrap();

    assert!(result.u_empirical.cells().all(|c| (0.0..=1.0).contains(&c)));
    assert!(result.d_weights.cells().all(|c| (0.0..=1.0).contains(&c)));
    assert_relative_eq!(result.d_weights.sum(), 1.0, epsilon = 1e-12);
    assert!(result.u_model.cells().all(|c| c > 0.0 && c < 1.0));
    // Two rows (one per exchange) have no successor.
    let observations = ROWS - 2;
    let min_weight = 1.0 / observations as f64;
    assert!(result
        .d_weights
        .cells()
        .all(|c| c == 0.0 || c >= min_weight - 1e-15));
}

#[test]
fn single_row_is_degenerate_not_empty() {
    let table = vec![raw("AAPL", "T", 0, 100.0, 100.02, 3.0, 4.0)];
    let result = estimator().estimate_raw(&table, "AAPL").unwrap();

    assert!(result.is_degenerate());
    assert_eq!(result.d_weights.sum(), 0.0);
    assert_eq!(result.loss, 0.0);
    assert!(result.implied_h >= 0.001 && result.implied_h <= 20.0);
}

#[test]
fn absent_symbol_is_empty_selection() {
    let table = bid_led_table("AAPL");
    match estimator().estimate_raw(&table, "MSFT") {
        Err(Error::EmptySelection { symbol }) => assert_eq!(symbol, "MSFT"),
        other => panic!("expected empty selection, got {:?}", other),
    }
}

#[test]
fn symbol_with_only_filtered_rows_is_empty_selection() {
    let table = vec![
        raw("AAPL", "N", 0, 100.0, 100.02, 3.0, 4.0),
        raw("AAPL", "T", 1, 100.02, 100.0, 3.0, 4.0),
    ];
    assert!(matches!(
        estimator().estimate_raw(&table, "AAPL"),
        Err(Error::EmptySelection { .. })
    ));
}

#[test]
fn crossed_quote_is_excluded() {
    let clean_table = bid_led_table("AAPL");
    let mut table = clean_table.clone();
    // Crossed quote on its own exchange so it cannot disturb any pair.
    table.push(raw("AAPL", "Z", 10, 100.05, 100.00, 1.0, 400.0));

    let est = estimator();
    let (cleaned, stats) = est.clean(&table);
    assert_eq!(stats.rows_in, ROWS + 1);
    assert_eq!(stats.dropped_spread, 1);
    assert_eq!(stats.rows_out, ROWS);
    assert_eq!(cleaned.len(), ROWS);
    assert!(cleaned.iter().all(|q| q.offer > q.bid));

    let with_crossed = est.estimate(&cleaned, "AAPL").unwrap();
    let without = est.estimate_raw(&clean_table, "AAPL").unwrap();
    assert_eq!(with_crossed, without);
}

#[test]
fn shuffled_rows_give_identical_result() {
    let table = bid_led_table("AAPL");
    let mut shuffled = table.clone();
    shuffled.reverse();
    for k in (0..shuffled.len()).step_by(3) {
        let j = (k * 37 + 11) % shuffled.len();
        shuffled.swap(k, j);
    }

    let est = estimator();
    assert_eq!(
        est.estimate_raw(&table, "AAPL").unwrap(),
        est.estimate_raw(&shuffled, "AAPL").unwrap()
    );
}

#[test]
fn repeated_runs_are_identical() {
    let table = bid_led_table("AAPL");
    let est = estimator();
    let first = est.estimate_raw(&table, "AAPL").unwrap();
    let second = est.estimate_raw(&table, "AAPL").unwrap();
    assert_eq!(first, second);
}

#[test]
fn other_symbols_do_not_affect_fit() {
    let aapl = bid_led_table("AAPL");
    let mut mixed = aapl.clone();
    mixed.extend(bid_led_table("MSFT").into_iter().map(|mut q| {
        q.bid_size *= 3.0;
        q
    }));

    let est = estimator();
    assert_eq!(
        est.estimate_raw(&aapl, "AAPL").unwrap(),
        est.estimate_raw(&mixed, "AAPL").unwrap()
    );
}

#[test]
fn csv_file_end_to_end() {
    let path = std::env::temp_dir().join(format!("hliq_quotes_{}.csv", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "DATE,TIME_M,EX,SYM_ROOT,BID,BIDSIZ,ASK,OFRSIZ").unwrap();
        for q in bid_led_table("AAPL") {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                q.date, q.time, q.exchange, q.symbol, q.bid, q.bid_size, q.ask, q.ask_size
            )
            .unwrap();
        }
    }

    let from_file = run_pipeline(&path, "AAPL");
    let missing = run_pipeline(&path, "IBM");
    std::fs::remove_file(&path).unwrap();

    let from_file = from_file.unwrap();
    let in_memory = estimator().estimate_raw(&bid_led_table("AAPL"), "AAPL").unwrap();
    assert_relative_eq!(from_file.implied_h, in_memory.implied_h, epsilon = 1e-9);
    assert_eq!(from_file.d_weights, in_memory.d_weights);
    assert!(matches!(missing, Err(Error::EmptySelection { .. })));
}

#[test]
fn missing_file_is_io_error() {
    let result = run_pipeline("/nonexistent/quotes.csv", "AAPL");
    assert!(matches!(result, Err(Error::Io(_))));
}
