//! Domain models for the rental inventory
//!
//! Four record kinds keyed by opaque string identifiers (UUIDv7 in
//! practice). Each record carries creation/update timestamps; each has a
//! `New*` creation payload and a `*Update` partial-update payload with
//! `Option` fields.
//!
//! Cross-entity references (`Property.owner_id`, `Lease.tenant_id`,
//! `Lease.property_id`) are plain foreign-key strings, never in-memory
//! object graphs; every resolution is an explicit store lookup.

pub mod lease;
pub mod owner;
pub mod property;
pub mod tenant;

pub use lease::{Lease, LeaseStatus, LeaseUpdate, NewLease};
pub use owner::{NewOwner, Owner, OwnerUpdate};
pub use property::{NewProperty, Property, PropertyStatus, PropertyUpdate};
pub use tenant::{NewTenant, Tenant, TenantUpdate};
