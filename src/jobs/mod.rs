pub mod job;
pub mod queue;

pub use job::{Job, JobStatus};
pub use queue::JobQueue;
