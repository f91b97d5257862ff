pub mod runtime;
pub mod service;

pub use runtime::{build_trigger, build_trigger_with_runner, load_config, resolve_db_path};
pub use service::{JobListResponse, ScanStatusResponse, ScanTrigger, StartScanResponse};
