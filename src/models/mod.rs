pub mod finding;
pub mod report;
pub mod subject;
pub mod target;

pub use finding::*;
pub use report::*;
pub use subject::*;
pub use target::*;
