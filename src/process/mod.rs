pub mod buffer;
pub mod runner;
pub mod signal;

pub use buffer::OutputBuffer;
pub use runner::{CommandRunner, CommandSpec, ProcessOutput, ProcessRunner};
