//! Locare Store - the Entity Store boundary
//!
//! Provides:
//! - The `EntityStore` trait the engines consume (get-by-id, find, insert,
//!   partial update, delete, and the two aggregation primitives)
//! - `MemoryStore`, a thread-safe in-memory implementation
//! - `SqliteStore`, a SQLite implementation with embedded migrations
//! - Process configuration (`StoreConfig`) with explicit open/close
//!   lifecycle, no implicit singletons

pub mod config;
pub mod entity_store;
pub mod errors;
pub mod memory;
pub mod sqlite;

pub use config::{ConfigError, StoreConfig};
pub use entity_store::EntityStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
