//! In-memory Entity Store
//!
//! HashMap-per-collection storage behind `parking_lot::RwLock`s. Used by
//! the engine test suites and suitable for single-process deployments;
//! the compare-and-set on property status is performed under the write
//! lock, so it is atomic with respect to other callers of this store.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use locare_core::errors::{conflict, not_found, Result};
use locare_core::model::{
    Lease, LeaseStatus, LeaseUpdate, Owner, OwnerUpdate, Property, PropertyStatus, PropertyUpdate,
    Tenant, TenantUpdate,
};

use crate::entity_store::EntityStore;

/// Thread-safe in-memory store over the four record collections
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: RwLock<HashMap<String, Owner>>,
    tenants: RwLock<HashMap<String, Tenant>>,
    properties: RwLock<HashMap<String, Property>>,
    leases: RwLock<HashMap<String, Lease>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stable listing order: creation time, then id as tiebreaker
fn sorted<T, K>(mut items: Vec<T>, key: K) -> Vec<T>
where
    K: Fn(&T) -> (chrono::DateTime<chrono::Utc>, String),
{
    items.sort_by_key(|item| key(item));
    items
}

impl EntityStore for MemoryStore {
    // ---- Owners ----

    fn insert_owner(&self, owner: Owner) -> Result<Owner> {
        self.owners
            .write()
            .insert(owner.id.clone(), owner.clone());
        Ok(owner)
    }

    fn get_owner(&self, id: &str) -> Result<Owner> {
        self.owners
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("owner", id))
    }

    fn list_owners(&self) -> Result<Vec<Owner>> {
        let owners = self.owners.read().values().cloned().collect();
        Ok(sorted(owners, |o: &Owner| (o.created_at, o.id.clone())))
    }

    fn update_owner(&self, id: &str, update: OwnerUpdate) -> Result<Owner> {
        let mut owners = self.owners.write();
        let owner = owners.get_mut(id).ok_or_else(|| not_found("owner", id))?;
        owner.apply(update);
        Ok(owner.clone())
    }

    fn delete_owner(&self, id: &str) -> Result<()> {
        self.owners
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("owner", id))
    }

    // ---- Tenants ----

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant> {
        self.tenants
            .write()
            .insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    fn get_tenant(&self, id: &str) -> Result<Tenant> {
        self.tenants
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("tenant", id))
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let tenants = self.tenants.read().values().cloned().collect();
        Ok(sorted(tenants, |t: &Tenant| (t.created_at, t.id.clone())))
    }

    fn update_tenant(&self, id: &str, update: TenantUpdate) -> Result<Tenant> {
        let mut tenants = self.tenants.write();
        let tenant = tenants.get_mut(id).ok_or_else(|| not_found("tenant", id))?;
        tenant.apply(update);
        Ok(tenant.clone())
    }

    fn delete_tenant(&self, id: &str) -> Result<()> {
        self.tenants
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("tenant", id))
    }

    // ---- Properties ----

    fn insert_property(&self, property: Property) -> Result<Property> {
        self.properties
            .write()
            .insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn get_property(&self, id: &str) -> Result<Property> {
        self.properties
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("property", id))
    }

    fn list_properties(&self) -> Result<Vec<Property>> {
        let properties = self.properties.read().values().cloned().collect();
        Ok(sorted(properties, |p: &Property| {
            (p.created_at, p.id.clone())
        }))
    }

    fn properties_by_owner(&self, owner_id: &str) -> Result<Vec<Property>> {
        let properties = self
            .properties
            .read()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sorted(properties, |p: &Property| {
            (p.created_at, p.id.clone())
        }))
    }

    fn update_property(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let mut properties = self.properties.write();
        let property = properties
            .get_mut(id)
            .ok_or_else(|| not_found("property", id))?;
        property.apply(update);
        Ok(property.clone())
    }

    fn delete_property(&self, id: &str) -> Result<()> {
        self.properties
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("property", id))
    }

    fn set_property_status(
        &self,
        id: &str,
        expected: PropertyStatus,
        next: PropertyStatus,
    ) -> Result<()> {
        let mut properties = self.properties.write();
        let property = properties
            .get_mut(id)
            .ok_or_else(|| not_found("property", id))?;
        if property.status != expected {
            return Err(conflict(format!(
                "property status is {}, expected {}",
                property.status, expected
            ))
            .with_entity_id(id));
        }
        property.status = next;
        property.updated_at = chrono::Utc::now();
        Ok(())
    }

    // ---- Leases ----

    fn insert_lease(&self, lease: Lease) -> Result<Lease> {
        self.leases
            .write()
            .insert(lease.id.clone(), lease.clone());
        Ok(lease)
    }

    fn get_lease(&self, id: &str) -> Result<Lease> {
        self.leases
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("lease", id))
    }

    fn list_leases(&self, status: Option<LeaseStatus>) -> Result<Vec<Lease>> {
        let leases = self
            .leases
            .read()
            .values()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .cloned()
            .collect();
        Ok(sorted(leases, |l: &Lease| (l.created_at, l.id.clone())))
    }

    fn leases_by_tenant(&self, tenant_id: &str) -> Result<Vec<Lease>> {
        let leases = self
            .leases
            .read()
            .values()
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .collect();
        Ok(sorted(leases, |l: &Lease| (l.created_at, l.id.clone())))
    }

    fn leases_by_property(&self, property_id: &str) -> Result<Vec<Lease>> {
        let leases = self
            .leases
            .read()
            .values()
            .filter(|l| l.property_id == property_id)
            .cloned()
            .collect();
        Ok(sorted(leases, |l: &Lease| (l.created_at, l.id.clone())))
    }

    fn active_lease_for_property(&self, property_id: &str) -> Result<Option<Lease>> {
        Ok(self
            .leases
            .read()
            .values()
            .find(|l| l.property_id == property_id && l.is_active())
            .cloned())
    }

    fn leases_ending_in(&self, year: i32, month: u32) -> Result<Vec<Lease>> {
        use chrono::Datelike;
        let leases = self
            .leases
            .read()
            .values()
            .filter(|l| l.end_date.year() == year && l.end_date.month() == month)
            .cloned()
            .collect();
        Ok(sorted(leases, |l: &Lease| (l.created_at, l.id.clone())))
    }

    fn update_lease_fields(&self, id: &str, update: LeaseUpdate) -> Result<Lease> {
        let mut leases = self.leases.write();
        let lease = leases.get_mut(id).ok_or_else(|| not_found("lease", id))?;
        lease.apply(update);
        Ok(lease.clone())
    }

    fn delete_lease(&self, id: &str) -> Result<()> {
        self.leases
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("lease", id))
    }

    // ---- Aggregation primitives ----

    fn count_properties_by_kind(&self) -> Result<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for property in self.properties.read().values() {
            *counts.entry(property.kind.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn sum_active_lease_rent(&self) -> Result<f64> {
        Ok(self
            .leases
            .read()
            .values()
            .filter(|l| l.is_active())
            .map(|l| l.rent_amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use locare_core::errors::ErrorKind;
    use locare_core::model::{NewLease, NewOwner, NewProperty, NewTenant};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_property(store: &MemoryStore, id: &str, kind: &str) -> Property {
        let owner = Owner::from_new(
            format!("owner-for-{}", id),
            NewOwner {
                name: "Owner".to_string(),
                tax_id: "000".to_string(),
                email: None,
                phone: "555".to_string(),
                address: None,
            },
        );
        store.insert_owner(owner.clone()).unwrap();
        let property = Property::from_new(
            id.to_string(),
            NewProperty {
                nickname: id.to_string(),
                description: None,
                address: "somewhere".to_string(),
                base_rent: 900.0,
                kind: kind.to_string(),
                owner_id: owner.id,
            },
        );
        store.insert_property(property.clone()).unwrap();
        property
    }

    #[test]
    fn test_owner_crud_round_trip() {
        let store = MemoryStore::new();
        let owner = Owner::from_new(
            "owner-1".to_string(),
            NewOwner {
                name: "Ana".to_string(),
                tax_id: "111".to_string(),
                email: None,
                phone: "555".to_string(),
                address: None,
            },
        );
        store.insert_owner(owner.clone()).unwrap();
        assert_eq!(store.get_owner("owner-1").unwrap().name, "Ana");

        store
            .update_owner(
                "owner-1",
                OwnerUpdate {
                    name: Some("Ana Souza".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.get_owner("owner-1").unwrap().name, "Ana Souza");

        store.delete_owner("owner-1").unwrap();
        assert_eq!(
            store.get_owner("owner-1").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_set_property_status_cas() {
        let store = MemoryStore::new();
        seed_property(&store, "p1", "house");

        store
            .set_property_status("p1", PropertyStatus::Available, PropertyStatus::Rented)
            .unwrap();
        assert_eq!(
            store.get_property("p1").unwrap().status,
            PropertyStatus::Rented
        );

        // Stale expectation fails with Conflict and does not write
        let err = store
            .set_property_status("p1", PropertyStatus::Available, PropertyStatus::Rented)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            store.get_property("p1").unwrap().status,
            PropertyStatus::Rented
        );
    }

    #[test]
    fn test_set_property_status_unknown_id() {
        let store = MemoryStore::new();
        let err = store
            .set_property_status("nope", PropertyStatus::Available, PropertyStatus::Rented)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_active_lease_lookup_ignores_closed_leases() {
        let store = MemoryStore::new();
        seed_property(&store, "p1", "house");

        let mut closed = Lease::from_new(
            "l1".to_string(),
            NewLease {
                tenant_id: "t1".to_string(),
                property_id: "p1".to_string(),
                start_date: date(2023, 1, 1),
                end_date: date(2023, 6, 1),
                rent_amount: 800.0,
            },
        );
        closed.status = LeaseStatus::Terminated;
        store.insert_lease(closed).unwrap();

        assert!(store.active_lease_for_property("p1").unwrap().is_none());

        let active = Lease::from_new(
            "l2".to_string(),
            NewLease {
                tenant_id: "t1".to_string(),
                property_id: "p1".to_string(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 6, 1),
                rent_amount: 900.0,
            },
        );
        store.insert_lease(active).unwrap();
        assert_eq!(
            store
                .active_lease_for_property("p1")
                .unwrap()
                .unwrap()
                .id,
            "l2"
        );
    }

    #[test]
    fn test_leases_ending_in_filters_by_month() {
        let store = MemoryStore::new();
        for (id, end) in [
            ("l1", date(2024, 6, 1)),
            ("l2", date(2024, 6, 30)),
            ("l3", date(2024, 7, 1)),
        ] {
            store
                .insert_lease(Lease::from_new(
                    id.to_string(),
                    NewLease {
                        tenant_id: "t1".to_string(),
                        property_id: "p1".to_string(),
                        start_date: date(2024, 1, 1),
                        end_date: end,
                        rent_amount: 500.0,
                    },
                ))
                .unwrap();
        }

        let june: Vec<String> = store
            .leases_ending_in(2024, 6)
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(june, vec!["l1".to_string(), "l2".to_string()]);
    }

    #[test]
    fn test_aggregates() {
        let store = MemoryStore::new();
        seed_property(&store, "p1", "house");
        seed_property(&store, "p2", "house");
        seed_property(&store, "p3", "apartment");

        let counts = store.count_properties_by_kind().unwrap();
        assert_eq!(counts.get("house"), Some(&2));
        assert_eq!(counts.get("apartment"), Some(&1));

        // No active leases: sum is zero, not an error
        assert_eq!(store.sum_active_lease_rent().unwrap(), 0.0);

        store
            .insert_lease(Lease::from_new(
                "l1".to_string(),
                NewLease {
                    tenant_id: "t1".to_string(),
                    property_id: "p1".to_string(),
                    start_date: date(2024, 1, 1),
                    end_date: date(2024, 6, 1),
                    rent_amount: 1000.0,
                },
            ))
            .unwrap();
        assert_eq!(store.sum_active_lease_rent().unwrap(), 1000.0);
    }
}
