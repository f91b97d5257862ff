use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{self, DeepScanConfig, ScanSettings};
use crate::db::{Database, PersistenceStore};
use crate::errors::DeepScanError;
use crate::jobs::JobQueue;
use crate::notify::create_notifier;
use crate::pipeline::{ActiveScanLock, ScanOrchestrator};
use crate::process::{CommandRunner, ProcessRunner};
use super::service::ScanTrigger;

pub const DEFAULT_DB_PATH: &str = "./data/deepscan.db";

/// Load the YAML config at `path`, or the all-defaults config when absent.
pub async fn load_config(path: Option<&str>) -> Result<DeepScanConfig, DeepScanError> {
    match path {
        Some(path) => config::parse_config(&PathBuf::from(path)).await,
        None => Ok(DeepScanConfig::default()),
    }
}

/// Command-line path wins over `storage.path`, which wins over the default.
pub fn resolve_db_path(cli: Option<&str>, config: &DeepScanConfig) -> String {
    cli.map(str::to_string)
        .or_else(|| config.storage.as_ref().and_then(|s| s.path.clone()))
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

/// Wire the store, process runner, notifier and orchestrator into a trigger.
///
/// Cancelling `shutdown` terminates any tool still running.
pub fn build_trigger(db: Database, config: &DeepScanConfig, shutdown: CancellationToken) -> ScanTrigger {
    let settings = ScanSettings::resolve(config);
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new(&settings, shutdown));
    build_trigger_with_runner(Arc::new(db), runner, &settings)
}

pub fn build_trigger_with_runner(
    store: Arc<dyn PersistenceStore>,
    runner: Arc<dyn CommandRunner>,
    settings: &ScanSettings,
) -> ScanTrigger {
    let orchestrator = ScanOrchestrator::new(
        store.clone(),
        create_notifier(settings),
        runner,
        ActiveScanLock::new(),
        settings,
    );
    ScanTrigger::new(store, Arc::new(orchestrator), JobQueue::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[test]
    fn test_resolve_db_path_precedence() {
        let config = DeepScanConfig {
            storage: Some(StorageConfig { path: Some("/var/lib/deepscan.db".into()) }),
            ..Default::default()
        };
        assert_eq!(resolve_db_path(Some("cli.db"), &config), "cli.db");
        assert_eq!(resolve_db_path(None, &config), "/var/lib/deepscan.db");
        assert_eq!(resolve_db_path(None, &DeepScanConfig::default()), DEFAULT_DB_PATH);
    }

    #[tokio::test]
    async fn test_load_config_absent_is_default() {
        let config = load_config(None).await.unwrap();
        assert!(config.tools.is_none());
    }
}
