//! Locare Engine - lease lifecycle and reporting
//!
//! The only path by which leases are created, updated, terminated, or
//! deleted, and the only writer of a property's availability flag. Also
//! hosts the read-only reporting queries and the plain entity registry.
//!
//! The engine owns operation boundary logging (`log_op_start!` /
//! `log_op_end!` / `log_op_error!`); the store below it logs at debug
//! level only.

pub mod lifecycle;
pub mod locks;
pub mod registry;
pub mod reports;

pub use lifecycle::LeaseEngine;
pub use registry::Registry;
pub use reports::{OwnerOccupancy, PropertyOccupancy, Reports};
