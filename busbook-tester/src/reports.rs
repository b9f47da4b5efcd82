use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

/// Outcome of one scenario for one seed on one runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    /// `logic` or the browser name.
    pub runner: String,
    pub seed: u64,
    pub passed: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioResult {
    #[must_use]
    pub fn new(
        scenario: &str,
        runner: &str,
        seed: u64,
        duration: Duration,
        outcome: &anyhow::Result<()>,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            runner: runner.to_string(),
            seed,
            passed: outcome.is_ok(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            error: outcome.as_ref().err().map(|err| format!("{err:#}")),
        }
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    if total > 0 {
        #[allow(clippy::cast_precision_loss)]
        let rate = passed as f64 / total as f64 * 100.0;
        writeln!(out, "Success rate: {rate:.1}%")?;
    }
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} [{} seed {}] {}ms",
            result.scenario.bold(),
            result.runner,
            result.seed,
            result.duration_ms
        )?;
        if let Some(error) = &result.error {
            writeln!(out, "     • {}", error.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Busbook Test Results\n")?;
    if results.is_empty() {
        writeln!(out, "_No scenarios executed._")?;
        return Ok(());
    }
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "**{passed}/{} passed**\n", results.len())?;
    writeln!(out, "| Scenario | Runner | Seed | Result | Time (ms) | Error |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for r in results {
        let status = if r.passed { "✅" } else { "❌" };
        let error = r.error.as_deref().unwrap_or("").replace('|', "\\|");
        writeln!(
            out,
            "| {} | {} | {} | {status} | {} | {error} |",
            r.scenario, r.runner, r.seed, r.duration_ms
        )?;
    }
    Ok(())
}
