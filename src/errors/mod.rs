pub mod types;
pub mod classification;

pub use types::DeepScanError;
pub use classification::ErrorClassification;
