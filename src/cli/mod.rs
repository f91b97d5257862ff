pub mod add;
pub mod commands;
pub mod report;
pub mod scan;
pub mod serve;
pub mod status;

pub use commands::{Cli, Commands};

use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::errors::DeepScanError;
use crate::trigger::{self, ScanTrigger};
use commands::StoreArgs;

/// Open the store named by `args` and wire a trigger over it.
pub(crate) async fn open_trigger(
    args: &StoreArgs,
    shutdown: CancellationToken,
) -> Result<ScanTrigger, DeepScanError> {
    let config = trigger::load_config(args.config.as_deref()).await?;
    let db = Database::new(&trigger::resolve_db_path(args.db.as_deref(), &config))?;
    Ok(trigger::build_trigger(db, &config, shutdown))
}
