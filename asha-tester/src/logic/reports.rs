use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::RunSummary;

#[allow(clippy::cast_precision_loss)]
fn success_rate(summary: &RunSummary) -> f64 {
    if summary.missions.is_empty() {
        return 0.0;
    }
    (summary.passed() as f64 / summary.missions.len() as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    summary: &RunSummary,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Mission Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;

    let total = summary.missions.len();
    let passed = summary.passed();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(summary))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in &summary.missions {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} {} [{}]",
            status,
            result.mission_id,
            result.title.bold(),
            result.simulation
        )?;
        writeln!(
            out,
            "   Strategy {} | seed {} | {} steps ({} ignored) | {:?}",
            result.strategy.label(),
            result.seed,
            result.steps,
            result.ignored_steps,
            result.duration
        )?;
        for failure in &result.failures {
            writeln!(out, "     • {}", failure.red())?;
        }
    }

    if !summary.realms.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "🗺  Realm Progress".bright_yellow().bold())?;
        writeln!(out, "{}", "=================".yellow())?;
        for realm in &summary.realms {
            writeln!(
                out,
                "{:<28} {}/{} ({}%)",
                realm.name, realm.completed, realm.total, realm.percent
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, summary: &RunSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, summary: &RunSummary) -> Result<()> {
    writeln!(out, "# Asha's Bitcoin Journey Mission Results\n")?;

    let total = summary.missions.len();
    let passed = summary.passed();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(summary))?;

    writeln!(out, "## Missions\n")?;
    writeln!(out, "| Status | Mission | Simulation | Seed | Steps |")?;
    writeln!(out, "| --- | --- | --- | --- | --- |")?;
    for result in &summary.missions {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {status} | {} {} | {} | {} | {} |",
            result.mission_id, result.title, result.simulation, result.seed, result.steps
        )?;
    }

    let failing: Vec<_> = summary
        .missions
        .iter()
        .filter(|result| !result.failures.is_empty())
        .collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            for failure in &result.failures {
                writeln!(out, "- {} (seed {}): {failure}", result.mission_id, result.seed)?;
            }
        }
    }

    if !summary.realms.is_empty() {
        writeln!(out, "\n## Realm Progress\n")?;
        for realm in &summary.realms {
            writeln!(
                out,
                "- **{}**: {}/{} ({}%)",
                realm.name, realm.completed, realm.total, realm.percent
            )?;
        }
    }
    Ok(())
}
