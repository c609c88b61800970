//! Tradovate "Performance" export: one already-paired round trip per row.
//!
//! ```text
//! symbol,...,qty,buyPrice,sellPrice,pnl,boughtTimestamp,soldTimestamp,duration
//! MESZ4,...,1,5700.25,5702.50,$11.25,09/16/2024 09:31:02,09/16/2024 09:33:10,2min 8sec
//! ```

use crate::fields::{field, non_empty_lines, parse_accounting, parse_number, split_record};
use core_types::{Leg, Trade, TradeSide};
use regex::Regex;
use std::sync::LazyLock;

static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)min").expect("valid minutes pattern"));
static SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)sec").expect("valid seconds pattern"));

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    qty: Option<usize>,
    buy_price: Option<usize>,
    sell_price: Option<usize>,
    pnl: Option<usize>,
    bought_timestamp: Option<usize>,
    sold_timestamp: Option<usize>,
    duration: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Self {
            qty: find("qty"),
            buy_price: find("buyPrice"),
            sell_price: find("sellPrice"),
            pnl: find("pnl"),
            bought_timestamp: find("boughtTimestamp"),
            sold_timestamp: find("soldTimestamp"),
            duration: find("duration"),
        }
    }
}

/// Parses a duration cell such as `1min 30sec`, `45sec` or `12min`.
///
/// The minute and second tokens are matched independently; a missing token
/// contributes nothing.
pub fn parse_duration_ms(raw: &str) -> u64 {
    let token = |re: &Regex| {
        re.captures(raw)
            .and_then(|c| c[1].parse::<u64>().ok())
            .unwrap_or(0)
    };
    token(&MINUTES) * 60_000 + token(&SECONDS) * 1_000
}

/// Quantity defaults to one when missing, zero or unparseable.
fn parse_size(raw: &str) -> f64 {
    let qty = parse_number(raw);
    if qty.is_nan() || qty == 0.0 { 1.0 } else { qty }
}

fn parse_row(values: &[String], columns: &Columns) -> Trade {
    let size = parse_size(field(values, columns.qty));
    let buy_price = parse_number(field(values, columns.buy_price));
    let sell_price = parse_number(field(values, columns.sell_price));

    let pnl_cell = field(values, columns.pnl);
    let pnl = if pnl_cell.is_empty() {
        0.0
    } else {
        parse_accounting(pnl_cell)
    };

    // The cheaper leg is taken as the opening side.
    let entry_type = if buy_price < sell_price {
        TradeSide::Buy
    } else {
        TradeSide::Sell
    };

    Trade::round_trip(
        entry_type,
        Leg::new(field(values, columns.bought_timestamp), buy_price),
        Leg::new(field(values, columns.sold_timestamp), sell_price),
        size,
        pnl,
        parse_duration_ms(field(values, columns.duration)),
    )
}

/// Converts a performance export into trades, one per data row, in file order.
pub fn parse(text: &str) -> Vec<Trade> {
    let mut lines = non_empty_lines(text);
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns = Columns::resolve(&split_record(header));

    lines
        .map(|line| parse_row(&split_record(line), &columns))
        .collect()
}
