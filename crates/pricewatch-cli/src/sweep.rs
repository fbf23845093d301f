//! Sweep commands: a single pass, or the scheduler until shutdown.

use pricewatch_core::{SweepReport, SweepStatus};
use pricewatch_sweep::Scheduler;

use crate::output::Output;

/// # Errors
///
/// Fails when the sweep aborted on a storage error.
pub(crate) async fn run_sweep_once(scheduler: &Scheduler, out: Output) -> anyhow::Result<()> {
    let Some(report) = scheduler.run_now().await else {
        anyhow::bail!("a sweep is already running");
    };
    out.emit(&report, || print_report(&report))?;
    if report.status == SweepStatus::Aborted {
        anyhow::bail!(
            "sweep aborted: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_report(report: &SweepReport) {
    let s = &report.summary;
    println!(
        "sweep {} {}: {} checked, {} updated, {} alerts, {} errors in {} ms{}",
        report.run_id,
        report.status,
        s.checked,
        s.updated,
        s.alerts_triggered,
        s.errors,
        s.duration_ms,
        if s.cancelled { " (cancelled)" } else { "" }
    );
}

/// Starts scheduled sweeps and blocks until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the scheduler cannot start or stop cleanly.
pub(crate) async fn run_scheduler(scheduler: &Scheduler, interval_hours: u64) -> anyhow::Result<()> {
    scheduler.start_hours(interval_hours).await?;
    println!("sweeping every {interval_hours}h; press Ctrl-C to stop");

    shutdown_signal().await;
    scheduler.stop().await?;
    println!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
