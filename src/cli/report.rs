use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::commands::ReportArgs;
use crate::errors::DeepScanError;

pub async fn handle_report(args: ReportArgs) -> Result<(), DeepScanError> {
    let trigger = super::open_trigger(&args.store, CancellationToken::new()).await?;
    let markdown = trigger.render_latest_report(&args.subject_id).await?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, markdown).await?;
            info!(path = %path, "Report written");
        }
        None => print!("{}", markdown),
    }
    Ok(())
}
