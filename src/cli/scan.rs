use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::commands::ScanArgs;
use crate::errors::DeepScanError;
use crate::models::{ScanReport, Severity};
use crate::pipeline::{RiskLevel, RunOutcome};
use crate::utils::formatting::format_duration;

pub async fn handle_scan(args: ScanArgs, quiet: bool) -> Result<(), DeepScanError> {
    let shutdown = CancellationToken::new();
    let trigger = super::open_trigger(&args.store, shutdown.clone()).await?;
    let orchestrator = trigger.orchestrator().clone();

    let spinner = (!quiet && !args.json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {elapsed_precise} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("starting");
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    });

    // Mirror the live phase onto the spinner until the run finishes.
    let watcher = spinner.clone().map(|bar| {
        let lock = orchestrator.active_scans().clone();
        let subject_id = args.subject_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(200)).await;
                if let Some(state) = lock.snapshot(&subject_id) {
                    bar.set_message(state.phase.to_string());
                }
            }
        })
    });

    let ctrl_c = shutdown.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, terminating running tools");
            ctrl_c.cancel();
        }
    });

    let outcome = orchestrator.run(&args.subject_id).await;
    // Alert delivery is detached from the run; let it land before exit.
    orchestrator.wait_for_alerts().await;

    interrupt.abort();
    if let Some(handle) = watcher {
        handle.abort();
    }
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }

    match outcome? {
        RunOutcome::AlreadyRunning => {
            println!("{} A deep scan of {} is already running", style("!").yellow(), args.subject_id);
        }
        RunOutcome::Completed(report) if args.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RunOutcome::Completed(report) => print_summary(&report),
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let risk = RiskLevel::from_score(report.score);
    let score = match risk {
        RiskLevel::Low => style(report.score).green(),
        RiskLevel::Moderate => style(report.score).yellow(),
        RiskLevel::High => style(report.score).red(),
    };
    println!(
        "\n{} Deep scan of {} finished in {}",
        style("✓").green().bold(),
        style(&report.domain).bold(),
        format_duration(report.duration_ms),
    );
    println!("  Score:   {}/100 ({})", score.bold(), risk.label());
    println!(
        "  Hosts:   {} scanned of {} discovered",
        report.summary.host_count, report.summary.discovered_host_count
    );
    println!("  Ports:   {} open", report.summary.open_port_count);
    println!(
        "  Vulns:   {} ({} critical, {} high, {} medium, {} low)",
        report.summary.vulnerability_count,
        report.summary.count(Severity::Critical),
        report.summary.count(Severity::High),
        report.summary.count(Severity::Medium),
        report.summary.count(Severity::Low),
    );
}
