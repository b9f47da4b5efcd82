mod backend;
mod browser;
mod reports;
mod scenarios;
mod util;

use anyhow::{Context, Result};
use busbook_core::config::BookingConfig;
use busbook_core::model::{BookingKey, parse_travel_date};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use browser::{BrowserConfig, BrowserKind, DetailPage, new_session};
use reports::ScenarioResult;
use scenarios::{Scenario, ScenarioCtx};
use util::{artifacts_dir, capture_artifacts, split_csv};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Booking-flow logic against a simulated backend (fast, no browser)
    Logic,
    /// Browser automation against a running deployment
    Browser,
    /// Run both logic and browser tests
    Both,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeadlessMode {
    /// Run browsers in headless mode
    Headless,
    /// Run browsers with visible windows
    Windowed,
}

impl HeadlessMode {
    const fn is_headless(self) -> bool {
        matches!(self, Self::Headless)
    }
}

#[derive(Debug, Parser)]
#[command(name = "busbook-tester", version)]
#[command(about = "Automated QA for the Busbook booking UI - booking-flow logic and browser smoke tests")]
struct Args {
    /// Test mode: logic (fast), browser (live deployment), or both
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds for the simulated inventory (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Booking configuration JSON (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bus to book
    #[arg(long, default_value = "bus-7")]
    bus_id: String,

    /// Travel date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    date: Option<String>,

    // Browser-specific options
    /// Browsers to run (chrome,edge,firefox,safari) - browser mode only
    #[arg(long, default_value = "chrome")]
    browsers: String,

    /// Base URL of the deployed UI
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Artifacts directory for screenshots and logs
    #[arg(long, default_value = "target/test-artifacts")]
    artifacts_dir: String,

    /// Connect to a Selenium Grid hub instead of local drivers
    #[arg(long)]
    hub: Option<String>,

    /// Run headless where supported
    #[arg(long, value_enum, default_value_t = HeadlessMode::Headless)]
    headless: HeadlessMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let config = load_config(args.config.as_deref())?;
    let date = travel_date(args.date.as_deref())?;

    let mut results = Vec::new();
    if matches!(args.mode, TestMode::Logic | TestMode::Both) {
        results.extend(run_logic_scenarios(&args, &scenarios, &seeds, &config, date).await);
    }
    if matches!(args.mode, TestMode::Browser | TestMode::Both) {
        results.extend(run_browser_scenarios(&args, &scenarios, date).await);
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in Scenario::ALL {
        let browser = if scenario.has_browser_steps() { " [browser]" } else { "" };
        writeln!(
            output_target.writer(),
            "  {:22} - {}{browser}",
            scenario.key(),
            scenario.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚌 Busbook Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for scenario in Scenario::ALL {
            let key = scenario.key().to_string();
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    split_csv(raw)
        .iter()
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid seed `{s}`")))
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<BookingConfig> {
    let Some(path) = path else {
        return Ok(BookingConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    BookingConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn travel_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_travel_date(raw)
            .with_context(|| format!("invalid date `{raw}`, expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

async fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    config: &BookingConfig,
    date: NaiveDate,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut results = Vec::new();
    for name in scenarios {
        let Some(scenario) = Scenario::from_key(name) else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
            continue;
        };
        for &seed in seeds {
            let ctx = ScenarioCtx {
                bus_id: args.bus_id.clone(),
                date,
                seed,
                config: config.clone(),
                verbose: args.verbose,
            };
            if args.verbose {
                println!("🧪 {} (seed {seed})", scenario.key().bright_white());
            }
            let started = Instant::now();
            let outcome = scenario.run_logic(&ctx).await;
            let result =
                ScenarioResult::new(scenario.key(), "logic", seed, started.elapsed(), &outcome);
            if let Err(err) = &outcome {
                log::warn!("{} seed {seed}: {err:#}", scenario.key());
            }
            results.push(result);
        }
    }
    results
}

async fn run_browser_scenarios(
    args: &Args,
    scenarios: &[String],
    date: NaiveDate,
) -> Vec<ScenarioResult> {
    println!("{}", "🌐 Running Browser Tests".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let cfg = BrowserConfig {
        headless: args.headless.is_headless(),
        remote_hub: args.hub.clone(),
        ..BrowserConfig::default()
    };
    let key = BookingKey::new(args.bus_id.clone(), date);
    let mut results = Vec::new();

    for browser_name in split_csv(&args.browsers) {
        let Ok(kind) = BrowserKind::from_str(&browser_name, true) else {
            eprintln!("⚠️  Unknown browser: {}", browser_name.yellow());
            continue;
        };

        let driver = match new_session(kind, &cfg).await {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Could not start {kind:?}: {e}");
                continue;
            }
        };

        let page = DetailPage::new(&driver, &args.base_url, &key);
        for name in scenarios {
            let Some(scenario) = Scenario::from_key(name) else {
                eprintln!("⚠️  Unknown scenario: {}", name.yellow());
                continue;
            };
            if !scenario.has_browser_steps() {
                log::info!("{} has no browser steps; skipped", scenario.key());
                continue;
            }
            let label = kind.label();
            let started = Instant::now();
            let outcome = scenario.run_browser(&page).await;
            let duration = started.elapsed();
            match &outcome {
                Ok(()) => println!("✅ [{}] {} - {duration:?}", label.green(), scenario.key()),
                Err(e) => {
                    eprintln!("❌ [{}] {} - {duration:?}: {e:#}", label.red(), scenario.key());
                    let dir = artifacts_dir(&args.artifacts_dir, &label, scenario.key(), 0);
                    if let Err(artifact_err) = capture_artifacts(&driver, &dir, e).await {
                        log::warn!("artifacts not captured: {artifact_err:#}");
                    }
                }
            }
            results.push(ScenarioResult::new(scenario.key(), &label, 0, duration, &outcome));
        }
        let _ = driver.quit().await;
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(output_target.writer(), results)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(output_target.writer(), results)?;
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(output_target.writer(), "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    output_target.writer(),
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(output_target.writer())?;
            writeln!(output_target.writer(), "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
