// Core infrastructure modules
pub mod blob_store;      // Media byte storage
pub mod database;        // Entity store interface and PostgreSQL implementation
pub mod middleware;      // Request extractors
pub mod security;        // Password hashing
pub mod sqlite_database; // SQLite implementation

pub use blob_store::{BlobStore, LocalBlobStore};
pub use database::{initialize_database, DatabaseInterface, PostgresDatabase};
pub use sqlite_database::SqliteDatabase;
