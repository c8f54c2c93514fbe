//! Storage infrastructure - PostgreSQL schema management

pub mod migrations;

pub use migrations::{run_storage_migrations, Migration, PostgresMigrator};
