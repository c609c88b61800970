//! Recognizes which platform produced an export from its text alone.
//!
//! Detection is an ordered rule table. Rules are evaluated top to bottom and
//! the first match wins; several exports satisfy more than one weak signal, so
//! the order is part of the contract.

use crate::fields::non_empty_lines;
use core_types::PlatformFormat;

/// Phrase TradingView writes on every fill line of its strategy log.
pub const EXECUTION_PHRASE: &str = "has been executed at price";

/// Pre-computed views of the export the rules look at.
#[derive(Debug)]
pub struct Probe<'a> {
    lowered: String,
    first_line: Option<String>,
    second_line: Option<&'a str>,
}

impl<'a> Probe<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = non_empty_lines(text);
        let first_line = lines.next().map(str::to_lowercase);
        let second_line = lines.next();
        Self {
            lowered: text.to_lowercase(),
            first_line,
            second_line,
        }
    }

    fn first_line_has_all(&self, markers: &[&str]) -> bool {
        self.first_line
            .as_deref()
            .is_some_and(|line| markers.iter().all(|m| line.contains(m)))
    }
}

/// One predicate and the format it identifies.
pub struct DetectionRule {
    pub name: &'static str,
    pub format: PlatformFormat,
    pub matches: fn(&Probe<'_>) -> bool,
}

fn statement_sections(probe: &Probe<'_>) -> bool {
    probe.lowered.contains("account statement") && probe.lowered.contains("account trade history")
}

fn performance_header(probe: &Probe<'_>) -> bool {
    probe.first_line_has_all(&["symbol", "buyprice", "sellprice", "pnl", "boughttimestamp"])
}

fn time_text_header(probe: &Probe<'_>) -> bool {
    probe.first_line_has_all(&["time", "text"])
}

fn narrative_fill_line(probe: &Probe<'_>) -> bool {
    probe
        .second_line
        .is_some_and(|line| line.contains(EXECUTION_PHRASE))
}

pub const RULES: [DetectionRule; 4] = [
    DetectionRule {
        name: "statement-sections",
        format: PlatformFormat::ThinkOrSwim,
        matches: statement_sections,
    },
    DetectionRule {
        name: "performance-header",
        format: PlatformFormat::Tradovate,
        matches: performance_header,
    },
    DetectionRule {
        name: "time-text-header",
        format: PlatformFormat::TradingView,
        matches: time_text_header,
    },
    DetectionRule {
        name: "narrative-fill-line",
        format: PlatformFormat::TradingView,
        matches: narrative_fill_line,
    },
];

/// Returns the format of `text`, or `None` when no rule matches.
pub fn detect_format(text: &str) -> Option<PlatformFormat> {
    let probe = Probe::new(text);
    let rule = RULES.iter().find(|rule| (rule.matches)(&probe))?;
    tracing::debug!(rule = rule.name, format = %rule.format, "Export format detected.");
    Some(rule.format)
}
