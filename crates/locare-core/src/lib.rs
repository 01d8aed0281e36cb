//! Locare Core - domain model for rental-property inventory
//!
//! This crate provides the foundational pieces of the locare system:
//! - Owner, Tenant, Property, and Lease models with partial-update payloads
//! - The canonical error facility with a stable kind/code taxonomy
//! - Validation helpers for date ranges and monetary amounts
//! - The structured logging facility (`init`, `log_op_*!` macros)
//!
//! The lease lifecycle rules themselves live in `locare-engine`; this crate
//! only knows what the records look like and what a well-formed value is.

pub mod errors;
pub mod logging;
pub mod model;
pub mod validate;

// Re-export commonly used types
pub use errors::{ErrorKind, LocareError, Result};
pub use model::{
    Lease, LeaseStatus, LeaseUpdate, NewLease, NewOwner, NewProperty, NewTenant, Owner,
    OwnerUpdate, Property, PropertyStatus, PropertyUpdate, Tenant, TenantUpdate,
};
