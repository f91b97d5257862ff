pub mod connection;
pub mod logs;
pub mod reports;
pub mod schema;
pub mod store;
pub mod subjects;

pub use connection::Database;
pub use store::PersistenceStore;
