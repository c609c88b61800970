use analytics::format::{
    format_currency, format_duration, format_pct, format_signed_compact_currency,
    format_signed_currency, period_label, win_loss_ratio,
};
use analytics::{GroupedTrades, MonthCalendar, PerformanceReport};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use configuration::{Config, init_tracing, load_config};
use core_types::{PlatformFormat, Trade, ViewMode};
use engine::error::EngineError;
use engine::{Dataset, Journal, View, read_export};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// The main entry point for the Tradebook application.
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    // Held until exit so a file writer flushes.
    let _log_guard = init_tracing(&config.logging)?;
    debug!(?config, "Configuration loaded");

    // Execute the appropriate command
    match cli.command {
        Commands::Detect { file } => handle_detect(file).await,
        Commands::Report(args) => handle_report(args, &config).await,
        Commands::Trades(source) => handle_trades(source, &config).await,
        Commands::Calendar(args) => handle_calendar(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A trading journal for broker and charting-platform trade exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `tradebook.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected format of an export file.
    Detect {
        /// The export file to inspect.
        file: PathBuf,
    },
    /// Summarize performance, all-time or per day, week or month.
    Report(ReportArgs),
    /// List the round-trip trades found in an export.
    Trades(SourceArgs),
    /// Show a month calendar with daily P&L.
    Calendar(CalendarArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// The export file to read.
    file: PathBuf,

    /// Parse as this format instead of detecting it.
    #[arg(long, value_enum)]
    format: Option<PlatformFormat>,
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Statistics view. Defaults to `display.view` from the configuration.
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CalendarArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// The month to show (format: YYYY-MM).
    #[arg(long, value_parser = parse_month)]
    month: String,
}

fn parse_month(value: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map(|first| first.format("%Y-%m").to_string())
        .map_err(|_| format!("'{value}' is not a YYYY-MM month"))
}

// ==============================================================================
// Loading
// ==============================================================================

/// Reads the export and ingests it into a fresh journal.
///
/// An explicit `--format` skips detection. When detection fails the format comes from the
/// configuration, then from an interactive prompt if stdin is a terminal.
async fn load_journal(source: &SourceArgs, config: &Config) -> Result<Journal> {
    let text = read_export(&source.file)
        .await
        .with_context(|| format!("Could not read {}", source.file.display()))?;

    let mut journal = Journal::new();
    if let Some(format) = source.format {
        journal.ingest_as(&text, format);
        return Ok(journal);
    }

    match journal.ingest(text).map(|dataset| dataset.format) {
        Ok(format) => info!(%format, "Detected export format"),
        Err(EngineError::UnrecognizedFormat) => {
            let format = match config.import.format {
                Some(format) => format,
                None if std::io::stdin().is_terminal() => prompt_for_format()?,
                None => return Err(EngineError::UnrecognizedFormat.into()),
            };
            journal.choose_format(format)?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(journal)
}

fn active_dataset(journal: &Journal) -> Result<&Dataset> {
    journal.dataset().context("No export has been loaded")
}

fn prompt_for_format() -> Result<PlatformFormat> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Could not recognize the export format. Which platform is it from?")?;
    for (i, format) in PlatformFormat::ALL.iter().enumerate() {
        writeln!(stdout, "  {}) {} [{}]", i + 1, format.display_name(), format.tag())?;
    }
    write!(stdout, "Choice (empty to cancel): ")?;
    stdout.flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    if answer.is_empty() {
        bail!("Import cancelled");
    }

    if let Some(format) = answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| PlatformFormat::ALL.get(i))
    {
        return Ok(*format);
    }
    Ok(answer.parse::<PlatformFormat>()?)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_detect(file: PathBuf) -> Result<()> {
    let text = read_export(&file)
        .await
        .with_context(|| format!("Could not read {}", file.display()))?;

    match importers::detect_format(&text) {
        Some(format) => println!("{format}"),
        None => println!("unknown"),
    }
    Ok(())
}

async fn handle_report(args: ReportArgs, config: &Config) -> Result<()> {
    let journal = load_journal(&args.source, config).await?;
    let dataset = active_dataset(&journal)?;
    let mode = args.view.unwrap_or(config.display.view);
    let view = journal.view(mode).context("No export has been loaded")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{} export, {} trades",
        dataset.format.display_name(),
        dataset.trades.len()
    );
    match view {
        View::AllTime(Some(report)) => println!("{}", summary_table(report)),
        View::AllTime(None) => println!("No completed trades found."),
        View::Periods(groups) if groups.is_empty() => println!("No completed trades found."),
        View::Periods(groups) => println!("{}", period_table(groups)),
    }
    Ok(())
}

async fn handle_trades(source: SourceArgs, config: &Config) -> Result<()> {
    let journal = load_journal(&source, config).await?;
    let dataset = active_dataset(&journal)?;

    if dataset.is_empty() {
        println!("No completed trades found.");
        return Ok(());
    }

    let shown = dataset.trades.len().min(config.display.max_rows);
    println!("{}", trade_table(&dataset.trades[..shown]));
    if shown < dataset.trades.len() {
        println!("... {} more (raise display.max_rows to see them)", dataset.trades.len() - shown);
    }
    Ok(())
}

async fn handle_calendar(args: CalendarArgs, config: &Config) -> Result<()> {
    let journal = load_journal(&args.source, config).await?;
    let dataset = active_dataset(&journal)?;
    let calendar = MonthCalendar::build(&args.month, &dataset.trades)?;

    println!("{}", period_label(&calendar.key, core_types::Period::Month));
    println!("{}", calendar_table(&calendar));
    match &calendar.stats {
        Some(stats) => println!(
            "{} trading days, {} trades, {} ({} win rate)",
            calendar.trading_days(),
            stats.total_trades,
            format_signed_currency(stats.total_pnl),
            format_pct(stats.win_rate, 1)
        ),
        None => println!("No trades closed this month."),
    }
    Ok(())
}

// ==============================================================================
// Rendering
// ==============================================================================

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn pnl_cell(value: f64, text: String) -> Cell {
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if value > 0.0 {
        cell.fg(Color::Green)
    } else if value < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn summary_table(report: &PerformanceReport) -> Table {
    let ratio = win_loss_ratio(report).map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total Trades"), Cell::new(report.total_trades)]);
    table.add_row(vec![
        Cell::new("Wins / Losses"),
        Cell::new(format!("{} / {}", report.total_wins, report.total_losses)),
    ]);
    table.add_row(vec![Cell::new("Win Rate"), Cell::new(format_pct(report.win_rate, 1))]);
    table.add_row(vec![
        Cell::new("Total P&L"),
        pnl_cell(report.total_pnl, format_signed_currency(report.total_pnl)),
    ]);
    table.add_row(vec![Cell::new("Avg Win"), pnl_cell(report.avg_win, format_currency(report.avg_win))]);
    table.add_row(vec![Cell::new("Avg Loss"), pnl_cell(report.avg_loss, format_currency(report.avg_loss))]);
    table.add_row(vec![Cell::new("Profit Factor"), Cell::new(format!("{:.2}", report.profit_factor))]);
    table.add_row(vec![Cell::new("Win/Loss Ratio"), Cell::new(ratio)]);
    table.add_row(vec![
        Cell::new("Largest Win"),
        pnl_cell(report.largest_win, format_currency(report.largest_win)),
    ]);
    table.add_row(vec![
        Cell::new("Largest Loss"),
        pnl_cell(report.largest_loss, format_currency(report.largest_loss)),
    ]);
    table.add_row(vec![Cell::new("Avg Duration"), Cell::new(format_duration(report.avg_duration))]);
    table.add_row(vec![Cell::new("Max Win Streak"), Cell::new(report.max_win_streak)]);
    table.add_row(vec![Cell::new("Max Loss Streak"), Cell::new(report.max_loss_streak)]);
    table
}

fn period_table(grouped: &GroupedTrades) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Trades", "Win Rate", "P&L", "Profit Factor", "Avg Duration"]);
    for group in &grouped.groups {
        let stats = &group.stats;
        table.add_row(vec![
            Cell::new(period_label(&group.key, grouped.period)),
            Cell::new(stats.total_trades),
            Cell::new(format_pct(stats.win_rate, 1)),
            pnl_cell(stats.total_pnl, format_signed_currency(stats.total_pnl)),
            Cell::new(format!("{:.2}", stats.profit_factor)),
            Cell::new(format_duration(stats.avg_duration)),
        ]);
    }
    table
}

fn trade_table(trades: &[Trade]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "#", "Entry", "Side", "Entry Price", "Exit", "Exit Price", "Size", "P&L", "Duration",
    ]);
    for (i, trade) in trades.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&trade.entry_time),
            Cell::new(trade.entry_type),
            Cell::new(trade.entry_price),
            Cell::new(&trade.exit_time),
            Cell::new(trade.exit_price),
            Cell::new(trade.size),
            pnl_cell(trade.pnl, format_signed_currency(trade.pnl)),
            Cell::new(format_duration(trade.duration_ms as f64)),
        ]);
    }
    table
}

fn calendar_table(calendar: &MonthCalendar) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    for week in &calendar.weeks {
        table.add_row(week.iter().map(|slot| match slot {
            None => Cell::new(""),
            Some(day) => match calendar.day(*day) {
                None => Cell::new(day),
                Some(traded) => pnl_cell(
                    traded.stats.total_pnl,
                    format!(
                        "{day}\n{}\n{}",
                        format_signed_compact_currency(traded.stats.total_pnl),
                        format_pct(traded.stats.win_rate, 0)
                    ),
                ),
            },
        }));
    }
    table
}
