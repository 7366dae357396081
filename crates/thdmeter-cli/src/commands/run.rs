//! Batch measurement of every capture in a test plan.

use super::common::{Measurement, format_thd, measure_clip};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::process::ExitCode;
use thdmeter_analysis::Verdict;
use thdmeter_config::{ConfigError, TestPlan, find_plan};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Test plan name (from the user plans directory) or path to a TOML file
    plan: String,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

/// Result of one clip: a measurement, or the reason none could be made.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ClipOutcome {
    Measured(Measurement),
    Failed {
        label: String,
        path: String,
        verdict: Verdict,
        error: String,
    },
}

impl ClipOutcome {
    fn passed(&self) -> bool {
        match self {
            ClipOutcome::Measured(m) => m.evaluation.verdict.is_pass(),
            ClipOutcome::Failed { .. } => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport {
    plan: String,
    passed: usize,
    failed: usize,
    clips: Vec<ClipOutcome>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let path =
        find_plan(&args.plan).ok_or_else(|| ConfigError::PlanNotFound(args.plan.clone()))?;
    let plan = TestPlan::load(&path)?;
    plan.validate().with_context(|| format!("validating {}", path.display()))?;
    let clips = plan.resolve_all()?;

    tracing::info!(plan = %plan.name, clips = clips.len(), "running test plan");

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(clips.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut outcomes = Vec::with_capacity(clips.len());
    for settings in &clips {
        pb.set_message(settings.label.clone());
        let outcome = match measure_clip(settings) {
            Ok(measurement) => ClipOutcome::Measured(measurement),
            Err(e) => {
                tracing::warn!(clip = %settings.label, error = %e, "clip could not be measured");
                ClipOutcome::Failed {
                    label: settings.label.clone(),
                    path: settings.path.display().to_string(),
                    verdict: Verdict::Fail,
                    error: format!("{e:#}"),
                }
            }
        };
        outcomes.push(outcome);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    let report = RunReport {
        plan: plan.name.clone(),
        passed,
        failed: outcomes.len() - passed,
        clips: outcomes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(if report.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(report: &RunReport) {
    println!("Test plan: {}", report.plan);
    println!();
    println!(
        "{:<24} {:>12} {:>10} {:>10}  Result",
        "Clip", "Fundamental", "THD", "Threshold"
    );
    println!("{}", "-".repeat(66));

    for outcome in &report.clips {
        match outcome {
            ClipOutcome::Measured(m) => println!(
                "{:<24} {:>9.1} Hz {:>10} {:>9.4}%  {}",
                m.label,
                m.fundamental_hz,
                format_thd(&m.report),
                m.evaluation.threshold_percent,
                m.evaluation.verdict
            ),
            ClipOutcome::Failed {
                label,
                verdict,
                error,
                ..
            } => println!(
                "{:<24} {:>12} {:>10} {:>10}  {}  ({})",
                label, "-", "error", "-", verdict, error
            ),
        }
    }

    println!();
    println!(
        "{}/{} clips passed",
        report.passed,
        report.passed + report.failed
    );
}
