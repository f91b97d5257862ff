pub mod health;
pub mod jobs;
pub mod reports;
pub mod scans;
pub mod subjects;
