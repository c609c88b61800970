//! ThinkOrSwim account statement. Only the "Account Trade History" section is
//! read; it lists raw executions which are paired into round trips per symbol.

use crate::fields::{field, parse_number, split_record};
use crate::pairing::{ClosingSize, Fill, PairingRules, PositionBook};
use core_types::{Trade, TradeSide};

const SECTION_MARKER: &str = "account trade history";
const EXEC_TIME_MARKER: &str = "exec time";

/// The statement does not report holding time.
fn no_duration(_: &Fill, _: &Fill) -> u64 {
    0
}

const RULES: PairingRules = PairingRules {
    closing_size: ClosingSize::Entry,
    duration: no_duration,
};

#[derive(Debug)]
struct Columns {
    exec_time: Option<usize>,
    side: Option<usize>,
    qty: Option<usize>,
    symbol: Option<usize>,
    price: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let exact = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Self {
            exec_time: headers
                .iter()
                .position(|h| h.to_lowercase().contains(EXEC_TIME_MARKER)),
            side: exact("side"),
            qty: exact("qty"),
            symbol: exact("symbol"),
            // Exact match keeps "Net Price" out.
            price: exact("price"),
        }
    }
}

/// One execution row that passed the required-field checks.
#[derive(Debug)]
struct Execution {
    symbol: String,
    fill: Fill,
}

fn is_section_end(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("Account Summary") || trimmed.contains("Total")
}

fn parse_execution(values: &[String], columns: &Columns, header_len: usize) -> Option<Execution> {
    if values.len() < header_len {
        return None;
    }

    let time = field(values, columns.exec_time);
    let symbol = field(values, columns.symbol);
    let side = TradeSide::from_label(field(values, columns.side))?;
    let qty = parse_number(field(values, columns.qty));
    let price = parse_number(field(values, columns.price));

    let usable = |v: f64| !v.is_nan() && v != 0.0;
    if time.is_empty() || symbol.is_empty() || !usable(qty) || !usable(price) {
        return None;
    }

    Some(Execution {
        symbol: symbol.to_string(),
        fill: Fill {
            time: time.to_string(),
            side,
            price,
            // Sells are written with a signed quantity ("-5").
            size: qty.abs(),
        },
    })
}

/// Extracts the executions of the trade-history section, in file order.
fn executions(text: &str) -> Vec<Execution> {
    let mut lines = text
        .lines()
        .skip_while(|line| !line.to_lowercase().contains(SECTION_MARKER))
        .skip(1);

    let Some(header) = lines.find(|line| line.to_lowercase().contains(EXEC_TIME_MARKER)) else {
        return Vec::new();
    };
    let headers = split_record(header.trim());
    let columns = Columns::resolve(&headers);

    lines
        .take_while(|line| !is_section_end(line))
        .filter_map(|line| {
            let parsed = parse_execution(&split_record(line.trim()), &columns, headers.len());
            if parsed.is_none() {
                tracing::debug!(row = line, "Skipping malformed trade-history row.");
            }
            parsed
        })
        .collect()
}

/// Converts an account statement into round trips, most recent first.
pub fn parse(text: &str) -> Vec<Trade> {
    executions(text)
        .into_iter()
        .fold(PositionBook::new(RULES), |book, execution| {
            book.apply(execution.symbol, execution.fill)
        })
        .into_trades_newest_first()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: &str = "Account Statement for 12345678 since 9/1/24 through 9/30/24\n\
        \n\
        Cash Balance\n\
        DATE,TIME,TYPE,REF #,DESCRIPTION\n\
        \n\
        Account Trade History\n";
    const HEADER: &str =
        ",Exec Time,Spread,Side,Qty,Pos Effect,Symbol,Exp,Strike,Type,Price,Net Price,Order Type\n";

    fn statement(rows: &[&str]) -> String {
        let mut text = format!("{PREAMBLE}{HEADER}");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.push_str("\nAccount Summary\n");
        text
    }

    #[test]
    fn pairs_buy_then_sell() {
        let text = statement(&[
            ",9/16/24 09:31:00,STOCK,BUY,+5,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 10:15:00,STOCK,SELL,-5,TO CLOSE,AAPL,,,STOCK,110,110,MKT",
        ]);
        let trades = parse(&text);

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.entry_type, TradeSide::Buy);
        assert_eq!(t.exit_type, TradeSide::Sell);
        assert_eq!(t.entry_price, 100.0);
        assert_eq!(t.exit_price, 110.0);
        assert_eq!(t.size, 5.0);
        assert_eq!(t.pnl, 50.0);
        assert_eq!(t.duration_ms, 0);
        assert_eq!(t.entry_time, "9/16/24 09:31:00");
    }

    #[test]
    fn short_round_trip() {
        let text = statement(&[
            ",9/16/24 09:31:00,STOCK,SELL,-2,TO OPEN,TSLA,,,STOCK,250,250,LMT",
            ",9/16/24 09:40:00,STOCK,BUY,+2,TO CLOSE,TSLA,,,STOCK,240,240,LMT",
        ]);
        let t = &parse(&text)[0];
        assert_eq!(t.entry_type, TradeSide::Sell);
        assert_eq!(t.pnl, 20.0);
    }

    #[test]
    fn symbols_pair_independently_and_newest_first() {
        let text = statement(&[
            ",9/16/24 09:31:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 09:32:00,STOCK,BUY,1,TO OPEN,MSFT,,,STOCK,300,300,MKT",
            ",9/16/24 09:33:00,STOCK,SELL,1,TO CLOSE,AAPL,,,STOCK,101,101,MKT",
            ",9/16/24 09:34:00,STOCK,SELL,1,TO CLOSE,MSFT,,,STOCK,290,290,MKT",
        ]);
        let trades = parse(&text);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].exit_time, "9/16/24 09:34:00");
        assert_eq!(trades[0].pnl, -10.0);
        assert_eq!(trades[1].pnl, 1.0);
    }

    #[test]
    fn same_side_execution_is_ignored() {
        let text = statement(&[
            ",9/16/24 09:31:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 09:32:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,90,90,MKT",
            ",9/16/24 09:33:00,STOCK,SELL,1,TO CLOSE,AAPL,,,STOCK,105,105,MKT",
        ]);
        let trades = parse(&text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_price, 100.0);
        assert_eq!(trades[0].pnl, 5.0);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let text = statement(&[
            ",9/16/24 09:30:00,STOCK,BUY",
            ",,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 09:30:30,STOCK,BUY,0,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 09:30:45,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,~,100,MKT",
            ",9/16/24 09:31:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT",
            ",9/16/24 09:33:00,STOCK,SELL,1,TO CLOSE,AAPL,,,STOCK,105,105,MKT",
        ]);
        let trades = parse(&text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_time, "9/16/24 09:31:00");
    }

    #[test]
    fn stops_at_total_line() {
        let mut text = format!("{PREAMBLE}{HEADER}");
        text.push_str(",9/16/24 09:31:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT\n");
        text.push_str(",Total,,,,,,,,,,,\n");
        text.push_str(",9/16/24 09:33:00,STOCK,SELL,1,TO CLOSE,AAPL,,,STOCK,105,105,MKT\n");
        assert!(parse(&text).is_empty());
    }

    #[test]
    fn stops_at_blank_line() {
        let mut text = format!("{PREAMBLE}{HEADER}");
        text.push_str(",9/16/24 09:31:00,STOCK,BUY,1,TO OPEN,AAPL,,,STOCK,100,100,MKT\n\n");
        text.push_str(",9/16/24 09:33:00,STOCK,SELL,1,TO CLOSE,AAPL,,,STOCK,105,105,MKT\n");
        assert!(parse(&text).is_empty());
    }

    #[test]
    fn net_price_column_is_not_the_price() {
        let text = format!(
            "{PREAMBLE},Exec Time,Side,Qty,Symbol,Net Price,Price\n\
             ,9/16/24 09:31:00,BUY,+5,AAPL,999,100\n\
             ,9/16/24 10:15:00,SELL,-5,AAPL,1,110\n"
        );
        let trades = parse(&text);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_price, 100.0);
        assert_eq!(trades[0].exit_price, 110.0);
        assert_eq!(trades[0].pnl, 50.0);
    }

    #[test]
    fn stops_at_account_summary_line() {
        let text = format!(
            "{PREAMBLE}{HEADER}\
             ,9/16/24 09:31:00,STOCK,BUY,+5,TO OPEN,AAPL,,,STOCK,100,100,MKT\n\
             Account Summary\n\
             ,9/16/24 10:15:00,STOCK,SELL,-5,TO CLOSE,AAPL,,,STOCK,110,110,MKT\n"
        );
        assert!(parse(&text).is_empty());
    }

    #[test]
    fn missing_section_yields_nothing() {
        assert!(parse("Account Statement for 1\nCash Balance\n").is_empty());
        assert!(parse("Account Trade History\nno header here\n").is_empty());
    }
}
