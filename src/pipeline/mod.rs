pub mod lock;
pub mod metrics;
pub mod orchestrator;
pub mod scoring;
pub mod state;
pub mod target_scanner;

pub use lock::{ActiveScanLock, ScanGuard};
pub use orchestrator::ScanOrchestrator;
pub use scoring::{score, RiskLevel};
pub use state::{RunOutcome, RunPhase, RunState};
pub use target_scanner::TargetScanner;
