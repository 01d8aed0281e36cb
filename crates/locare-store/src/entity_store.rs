//! The Entity Store interface consumed by the engines
//!
//! Get, find, insert, partial-update, delete, and aggregate, rendered as
//! typed methods per record kind. Implementations must be safe
//! to share between threads; every method is a single store round trip with
//! no cross-record coordination - that coordination belongs to the lease
//! lifecycle engine.

use std::collections::BTreeMap;

use locare_core::errors::Result;
use locare_core::model::{
    Lease, LeaseStatus, LeaseUpdate, Owner, OwnerUpdate, Property, PropertyStatus, PropertyUpdate,
    Tenant, TenantUpdate,
};

/// Narrow persistence interface over the four record collections
///
/// Identifier arguments are opaque strings; an id that does not resolve
/// yields `NotFound`. Partial updates apply only the `Some` fields of the
/// payload. `set_property_status` is the one conditional write: a
/// compare-and-set that fails with `Conflict` when the stored status no
/// longer matches the expected one, and is never retried by the store.
pub trait EntityStore: Send + Sync {
    // ---- Owners ----
    fn insert_owner(&self, owner: Owner) -> Result<Owner>;
    fn get_owner(&self, id: &str) -> Result<Owner>;
    fn list_owners(&self) -> Result<Vec<Owner>>;
    fn update_owner(&self, id: &str, update: OwnerUpdate) -> Result<Owner>;
    fn delete_owner(&self, id: &str) -> Result<()>;

    // ---- Tenants ----
    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant>;
    fn get_tenant(&self, id: &str) -> Result<Tenant>;
    fn list_tenants(&self) -> Result<Vec<Tenant>>;
    fn update_tenant(&self, id: &str, update: TenantUpdate) -> Result<Tenant>;
    fn delete_tenant(&self, id: &str) -> Result<()>;

    // ---- Properties ----
    fn insert_property(&self, property: Property) -> Result<Property>;
    fn get_property(&self, id: &str) -> Result<Property>;
    fn list_properties(&self) -> Result<Vec<Property>>;
    fn properties_by_owner(&self, owner_id: &str) -> Result<Vec<Property>>;
    fn update_property(&self, id: &str, update: PropertyUpdate) -> Result<Property>;
    fn delete_property(&self, id: &str) -> Result<()>;

    /// Compare-and-set the availability flag
    ///
    /// Commits only if the stored status still equals `expected`; a failed
    /// condition is `Conflict`. This is the storage-level guard that makes
    /// the availability flip race-safe across processes.
    fn set_property_status(
        &self,
        id: &str,
        expected: PropertyStatus,
        next: PropertyStatus,
    ) -> Result<()>;

    // ---- Leases ----
    fn insert_lease(&self, lease: Lease) -> Result<Lease>;
    fn get_lease(&self, id: &str) -> Result<Lease>;
    fn list_leases(&self, status: Option<LeaseStatus>) -> Result<Vec<Lease>>;
    fn leases_by_tenant(&self, tenant_id: &str) -> Result<Vec<Lease>>;
    fn leases_by_property(&self, property_id: &str) -> Result<Vec<Lease>>;

    /// The Active lease referencing this property, if any
    ///
    /// The invariant allows at most one; implementations return the first
    /// match without asserting uniqueness (reconciliation owns drift
    /// detection).
    fn active_lease_for_property(&self, property_id: &str) -> Result<Option<Lease>>;

    /// Leases whose end date falls in the given calendar month
    fn leases_ending_in(&self, year: i32, month: u32) -> Result<Vec<Lease>>;

    /// Mechanical partial update of lease fields; lifecycle rules are the
    /// engine's responsibility
    fn update_lease_fields(&self, id: &str, update: LeaseUpdate) -> Result<Lease>;
    fn delete_lease(&self, id: &str) -> Result<()>;

    // ---- Aggregation primitives ----

    /// Group-count of properties by type tag
    fn count_properties_by_kind(&self) -> Result<BTreeMap<String, u64>>;

    /// Sum of rent over Active leases; 0.0 when there are none
    fn sum_active_lease_rent(&self) -> Result<f64>;
}
