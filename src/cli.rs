//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{compute_indicators, run_analysis, AnalysisConfig, AnalysisReport};
use crate::domain::error::CrossbenchError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "crossbench", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Price CSV; falls back to `[data] path` in the config
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// Write the per-bar results table here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the crossover backtest and compare it with buy-and-hold
    Backtest(DataArgs),
    /// Compute indicators and signals only
    Indicators(DataArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Unknown levels fall back to info.
pub fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the stderr fmt subscriber. Fails if a global subscriber is
/// already set.
pub fn init_logging(level: &str) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

pub fn execute(command: Command) -> Result<(), CrossbenchError> {
    match command {
        Command::Backtest(args) => run_backtest(&args),
        Command::Indicators(args) => run_indicators(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CrossbenchError> {
    FileConfigAdapter::from_file(path).map_err(|e| CrossbenchError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// The `--data` argument wins over `[data] path`.
pub fn resolve_data_path(
    cli_path: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, CrossbenchError> {
    match cli_path {
        Some(p) => Ok(p.clone()),
        None => config
            .get_string("data", "path")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| CrossbenchError::ConfigMissing {
                section: "data".to_string(),
                key: "path".to_string(),
            }),
    }
}

fn load_inputs(args: &DataArgs) -> Result<(AnalysisConfig, PriceSeries), CrossbenchError> {
    // Stage 1: config
    info!(path = %args.config.display(), "loading config");
    let adapter = load_config(&args.config)?;
    let config = AnalysisConfig::from_port(&adapter)?;

    // Stage 2: price data
    let data_path = resolve_data_path(args.data.as_ref(), &adapter)?;
    info!(path = %data_path.display(), "loading price data");
    let series = CsvAdapter::new(data_path).fetch_series(args.start, args.end)?;
    if series.is_empty() {
        return Err(CrossbenchError::Data {
            reason: "no price bars in the selected range".to_string(),
        });
    }
    Ok((config, series))
}

fn run_backtest(args: &DataArgs) -> Result<(), CrossbenchError> {
    let (config, series) = load_inputs(args)?;

    // Stage 3: analysis
    let report = run_analysis(&series, &config)?;

    // Stage 4: output
    print!("{}", format_report(&report));
    if let Some(output) = &args.output {
        CsvReportAdapter::new().write(&report.results_table(&series), output)?;
    }
    Ok(())
}

fn run_indicators(args: &DataArgs) -> Result<(), CrossbenchError> {
    let (config, series) = load_inputs(args)?;
    let table = compute_indicators(&series, &config)?.results_table(&series);

    let writer = CsvReportAdapter::new();
    match &args.output {
        Some(output) => writer.write(&table, output),
        None => writer.write_to(&table, std::io::stdout().lock()),
    }
}

fn run_validate(path: &Path) -> Result<(), CrossbenchError> {
    let adapter = load_config(path)?;
    let config = AnalysisConfig::from_port(&adapter)?;
    println!(
        "Configuration valid: {}({}) / {}({}), capital {}",
        config.ma_kind, config.fast_window, config.ma_kind, config.slow_window,
        config.backtest.initial_capital
    );
    Ok(())
}

fn format_optional(value: Option<f64>, percent: bool) -> String {
    match value {
        Some(v) if percent => format!("{:.2}%", v * 100.0),
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}

pub fn format_summary(label: &str, summary: &PerformanceSummary) -> String {
    format!(
        "{label}\n  total return:      {}\n  annualized return: {}\n  max drawdown:      {}\n  sharpe ratio:      {}\n  win rate:          {}\n  trades:            {}\n",
        format_optional(Some(summary.total_return), true),
        format_optional(summary.annualized_return, true),
        format_optional(Some(summary.max_drawdown), true),
        format_optional(summary.sharpe_ratio, false),
        format_optional(summary.win_rate, true),
        summary.trade_count,
    )
}

pub fn format_report(report: &AnalysisReport) -> String {
    let interval = report
        .interval
        .map(|i| i.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut out = format!(
        "Bars: {}  Interval: {}  Periods/year: {}  Crossovers: {}\n",
        report.backtest.strategy_equity.len(),
        interval,
        report.periods_per_year,
        report.crossovers.len(),
    );
    out.push_str(&format_summary("Strategy", &report.comparison.strategy));
    out.push_str(&format_summary("Buy & hold", &report.comparison.benchmark));
    out.push_str(&format!(
        "Excess return: {}\n",
        format_optional(Some(report.comparison.excess_return()), true)
    ));
    out
}
