//! Row splitting and lenient numeric parsing shared by all export parsers.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

/// Splits one export line into trimmed fields.
///
/// Quoted fields may contain commas. A line the CSV reader rejects falls back
/// to a plain comma split so that no row is lost to quoting accidents.
pub fn split_record(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => line.split(',').map(|field| field.trim().to_string()).collect(),
    }
}

/// Lines of `text` that contain something other than whitespace.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// Reads the leading numeric prefix of `raw` (`"12.5 USD"` reads as 12.5).
///
/// Anything without a numeric prefix is NaN.
pub fn parse_number(raw: &str) -> f64 {
    LEADING_NUMBER
        .find(raw.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parses a money amount in accounting notation: `$1,234.50`, `($5.00)`.
///
/// Currency symbols and thousands separators are dropped; parentheses make
/// the amount negative.
pub fn parse_accounting(raw: &str) -> f64 {
    let negative = raw.contains('(');
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '(' | ')' | ','))
        .collect();
    let value = parse_number(&cleaned);
    if negative { -value } else { value }
}

/// A field by optional column index, empty when the column or the cell is missing.
pub fn field<'a>(values: &'a [String], index: Option<usize>) -> &'a str {
    index
        .and_then(|i| values.get(i))
        .map(String::as_str)
        .unwrap_or("")
}
