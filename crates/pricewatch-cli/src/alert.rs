//! Alert threshold commands.

use clap::Subcommand;
use pricewatch_core::TrackingAdmin;

use crate::output::Output;

/// Sub-commands available under `alert`.
#[derive(Debug, Subcommand)]
pub enum AlertCommands {
    /// Alert once the price drops to or below a threshold
    Set { id: i64, threshold: f64 },
    /// Re-arm a triggered alert, keeping its threshold
    Clear { id: i64 },
    /// Remove the threshold entirely
    Remove { id: i64 },
}

/// # Errors
///
/// Fails for a non-positive threshold, an unknown item, or a failed write.
pub(crate) async fn run_alert(
    admin: &dyn TrackingAdmin,
    command: &AlertCommands,
    out: Output,
) -> anyhow::Result<()> {
    match *command {
        AlertCommands::Set { id, threshold } => {
            if !threshold.is_finite() || threshold <= 0.0 {
                anyhow::bail!("threshold must be a positive number, got {threshold}");
            }
            admin.set_alert_threshold(id, Some(threshold)).await?;
            out.emit(
                &serde_json::json!({ "id": id, "alert_threshold": threshold }),
                || println!("item {id}: alert at or below {threshold:.2}"),
            )
        }
        AlertCommands::Clear { id } => {
            admin.clear_alert(id).await?;
            out.emit(
                &serde_json::json!({ "id": id, "alert_triggered": false }),
                || println!("item {id}: alert re-armed"),
            )
        }
        AlertCommands::Remove { id } => {
            admin.set_alert_threshold(id, None).await?;
            out.emit(
                &serde_json::json!({ "id": id, "alert_threshold": null }),
                || println!("item {id}: alert removed"),
            )
        }
    }
}
