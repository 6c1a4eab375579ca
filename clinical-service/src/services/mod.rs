pub mod database;
pub mod migration;
pub mod store;

pub use database::MongoDb;
pub use migration::rename_legacy_ecg_fields;
pub use store::{DocumentStore, MemoryStore, MongoStore};
