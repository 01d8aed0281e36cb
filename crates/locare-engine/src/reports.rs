//! Read-only reporting queries
//!
//! Reports never mutate state and never hold property locks; they read a
//! snapshot and may momentarily disagree with an in-flight lifecycle
//! operation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use locare_core::errors::{ErrorKind, Result};
use locare_core::model::{Lease, PropertyStatus};
use locare_core::{log_op_end, log_op_error, log_op_start};
use locare_core_types::RequestContext;
use locare_store::EntityStore;

/// One property in an owner's occupancy rollup
///
/// When an active lease exists it wins over the stored record: the status
/// shows Rented, the rent is the lease rent, and the tenant and end date
/// come from the lease.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyOccupancy {
    pub property_id: String,
    pub nickname: String,
    pub kind: String,
    pub address: String,
    pub status: PropertyStatus,
    pub current_rent: f64,
    pub tenant_name: Option<String>,
    pub lease_end: Option<NaiveDate>,
}

/// Occupancy rollup for a single owner
#[derive(Debug, Clone, Serialize)]
pub struct OwnerOccupancy {
    pub owner_id: String,
    pub owner_name: String,
    pub email: Option<String>,
    pub total_properties: usize,
    pub properties: Vec<PropertyOccupancy>,
}

/// The reporting engine
pub struct Reports<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> Reports<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Number of properties per kind, ordered by kind name
    pub fn count_by_property_kind(&self) -> Result<BTreeMap<String, u64>> {
        self.store.count_properties_by_kind()
    }

    /// Sum of rent across all Active leases; 0.0 when there are none
    pub fn active_revenue_total(&self) -> Result<f64> {
        self.store.sum_active_lease_rent()
    }

    /// Leases whose end date falls in the given month
    pub fn leases_expiring(&self, year: i32, month: u32) -> Result<Vec<Lease>> {
        self.store.leases_ending_in(year, month)
    }

    /// Occupancy rollup across every owner
    ///
    /// Owners with no properties still appear, with an empty list.
    pub fn owner_occupancy_report(&self) -> Result<Vec<OwnerOccupancy>> {
        let ctx = RequestContext::new();
        log_op_start!("owner_occupancy_report", request_id = %ctx.request_id);
        let start = Instant::now();

        let result = self.owner_occupancy_report_impl().map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "owner_occupancy_report",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "owner_occupancy_report",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            owners = result.len()
        );
        Ok(result)
    }

    fn owner_occupancy_report_impl(&self) -> Result<Vec<OwnerOccupancy>> {
        let owners = self.store.list_owners()?;
        let mut report = Vec::with_capacity(owners.len());

        for owner in owners {
            let properties = self.store.properties_by_owner(&owner.id)?;
            let mut rows = Vec::with_capacity(properties.len());
            for property in properties {
                rows.push(self.occupancy_row_for(property)?);
            }
            report.push(OwnerOccupancy {
                owner_id: owner.id,
                owner_name: owner.name,
                email: owner.email,
                total_properties: rows.len(),
                properties: rows,
            });
        }
        Ok(report)
    }

    fn occupancy_row_for(
        &self,
        property: locare_core::model::Property,
    ) -> Result<PropertyOccupancy> {
        let active = self.store.active_lease_for_property(&property.id)?;

        let row = match active {
            Some(lease) => {
                // Tolerate a dangling tenant reference; the row still
                // reports the lease itself.
                let tenant_name = match self.store.get_tenant(&lease.tenant_id) {
                    Ok(tenant) => Some(tenant.name),
                    Err(e) if e.kind() == ErrorKind::NotFound => None,
                    Err(e) => return Err(e),
                };
                PropertyOccupancy {
                    property_id: property.id,
                    nickname: property.nickname,
                    kind: property.kind,
                    address: property.address,
                    status: PropertyStatus::Rented,
                    current_rent: lease.rent_amount,
                    tenant_name,
                    lease_end: Some(lease.end_date),
                }
            }
            None => PropertyOccupancy {
                property_id: property.id,
                nickname: property.nickname,
                kind: property.kind,
                address: property.address,
                status: PropertyStatus::Available,
                current_rent: property.base_rent,
                tenant_name: None,
                lease_end: None,
            },
        };
        Ok(row)
    }
}
