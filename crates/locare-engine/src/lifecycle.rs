//! Lease lifecycle engine
//!
//! Enforces the one-active-lease-per-property invariant across create,
//! update, terminate, and delete, and keeps the property availability flag
//! in step with it.
//!
//! Every mutation that changes a lease's Active-ness is a release/acquire
//! pair on the property, under the property's critical section. The two
//! writes are not atomic at the storage layer, so their order is a rule,
//! not an accident:
//!
//! - acquire direction (create): insert the lease first, then flip the
//!   property to Rented. A crash in between leaves an Active lease with a
//!   stale Available flag, which the lease ledger alone can detect.
//! - release direction (terminate/cancel/delete): flip the property to
//!   Available first, then commit the lease write. A crash in between
//!   leaves a lease still showing Active over a free property.
//!
//! Both intermediate states mark the property busier than the ledger
//! justifies or equal to it, never quieter; the reverse order could strand
//! a property as unleasable with no lease record explaining it.
//! Reconciliation of the two detectable states is an external maintenance
//! task, not done here.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use locare_core::errors::{conflict, ErrorKind, Result};
use locare_core::model::{Lease, LeaseStatus, LeaseUpdate, NewLease, PropertyStatus};
use locare_core::validate;
use locare_core::{log_op_end, log_op_error, log_op_start};
use locare_core_types::RequestContext;
use locare_store::EntityStore;

use crate::locks::PropertyLocks;

/// The lease lifecycle engine
///
/// Holds the constructor-injected Entity Store and the per-property lock
/// registry. Cheap to share behind an `Arc` across concurrent callers.
/// Each operation mints a `RequestContext`; its request id appears in the
/// boundary logs and is stamped onto any error the operation returns.
pub struct LeaseEngine<S: EntityStore> {
    store: Arc<S>,
    locks: PropertyLocks,
}

impl<S: EntityStore> LeaseEngine<S> {
    /// Create an engine over the given store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: PropertyLocks::new(),
        }
    }

    /// Create a new lease; the lease starts Active and the property
    /// becomes Rented
    ///
    /// # Errors
    /// - `NotFound`: tenant or property id does not resolve
    /// - `InvalidRange`: end date not after start date, or rent not positive
    /// - `Conflict`: the property already has an active lease
    pub fn create_lease(&self, new: NewLease) -> Result<Lease> {
        let ctx = RequestContext::new();
        log_op_start!(
            "create_lease",
            request_id = %ctx.request_id,
            property_id = %new.property_id,
            tenant_id = %new.tenant_id
        );
        let start = Instant::now();

        let result = self.create_lease_impl(new).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "create_lease",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "create_lease",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            lease_id = %result.id
        );
        Ok(result)
    }

    fn create_lease_impl(&self, new: NewLease) -> Result<Lease> {
        // Resolve both references up front; nothing is written before all
        // preconditions pass.
        self.store.get_tenant(&new.tenant_id)?;
        self.store.get_property(&new.property_id)?;
        validate::date_range(new.start_date, new.end_date)?;
        validate::positive_amount("rent_amount", new.rent_amount)?;

        let handle = self.locks.handle(&new.property_id);
        let _guard = handle.lock();

        // Availability is re-read under the lock; the earlier read only
        // established existence.
        let property = self.store.get_property(&new.property_id)?;
        if !property.is_available() {
            return Err(conflict("property already has an active lease")
                .with_op("create_lease")
                .with_entity_id(&property.id));
        }

        let lease = Lease::from_new(Uuid::now_v7().to_string(), new);
        self.store.insert_lease(lease.clone())?;
        // Acquire after the lease write: see module docs for the ordering.
        self.store.set_property_status(
            &lease.property_id,
            PropertyStatus::Available,
            PropertyStatus::Rented,
        )?;
        Ok(lease)
    }

    /// Update a lease's mutable fields (dates, rent, status)
    ///
    /// Moving an Active lease to Terminated or Cancelled releases the
    /// property first; `terminate_lease` is this call with
    /// `{status: Terminated}`. Any status write, closing or not, runs
    /// under the property's critical section against a fresh read, so it
    /// cannot race a concurrent terminate. A status change requested on an
    /// already-closed lease is `Conflict`, and the property is never
    /// touched in that case.
    ///
    /// # Errors
    /// - `NotFound`: lease id does not resolve
    /// - `InvalidRange`: merged dates or rent invalid
    /// - `Conflict`: status change requested on an already-closed lease
    pub fn update_lease(&self, id: &str, update: LeaseUpdate) -> Result<Lease> {
        let ctx = RequestContext::new();
        log_op_start!("update_lease", request_id = %ctx.request_id, lease_id = %id);
        let start = Instant::now();

        let result = self.update_lease_impl(id, update).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "update_lease",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "update_lease",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            lease_id = %id
        );
        Ok(result)
    }

    fn update_lease_impl(&self, id: &str, update: LeaseUpdate) -> Result<Lease> {
        let lease = self.store.get_lease(id)?;

        // Validate against the merged record, not the patch alone
        let merged_start = update.start_date.unwrap_or(lease.start_date);
        let merged_end = update.end_date.unwrap_or(lease.end_date);
        validate::date_range(merged_start, merged_end)?;
        if let Some(rent) = update.rent_amount {
            validate::positive_amount("rent_amount", rent)?;
        }

        // Date and rent edits cannot change Active-ness and skip the
        // critical section.
        if update.status.is_none() {
            return self.store.update_lease_fields(id, update);
        }

        let handle = self.locks.handle(&lease.property_id);
        let _guard = handle.lock();

        // Every status write commits under the lock against a fresh read;
        // a concurrent terminate may have closed the lease since the
        // first read, and writing Active back over it would resurrect a
        // lease whose property was already released.
        let lease = self.store.get_lease(id)?;
        if !lease.is_active() {
            return Err(conflict("lease is already terminated or cancelled")
                .with_op("update_lease")
                .with_entity_id(id));
        }
        if update.closes_lease() {
            self.release_property(&lease)?;
        }
        self.store.update_lease_fields(id, update)
    }

    /// Terminate an Active lease, releasing its property
    ///
    /// # Errors
    /// - `NotFound`: lease id does not resolve
    /// - `Conflict`: the lease is not currently Active
    pub fn terminate_lease(&self, id: &str) -> Result<Lease> {
        let ctx = RequestContext::new();
        log_op_start!("terminate_lease", request_id = %ctx.request_id, lease_id = %id);
        let start = Instant::now();

        let result = self.terminate_lease_impl(id).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "terminate_lease",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "terminate_lease",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            lease_id = %id
        );
        Ok(result)
    }

    fn terminate_lease_impl(&self, id: &str) -> Result<Lease> {
        let lease = self.store.get_lease(id)?;

        let handle = self.locks.handle(&lease.property_id);
        let _guard = handle.lock();

        let lease = self.store.get_lease(id)?;
        if !lease.is_active() {
            return Err(conflict("lease is already terminated or cancelled")
                .with_op("terminate_lease")
                .with_entity_id(id));
        }

        // Release before the lease write commits: see module docs.
        self.release_property(&lease)?;
        self.store.update_lease_fields(
            id,
            LeaseUpdate {
                status: Some(LeaseStatus::Terminated),
                ..Default::default()
            },
        )
    }

    /// Delete a lease record entirely
    ///
    /// Deleting an Active lease releases its property exactly as
    /// terminating it would; deleting a closed lease never touches the
    /// property.
    ///
    /// # Errors
    /// - `NotFound`: lease id does not resolve
    pub fn delete_lease(&self, id: &str) -> Result<()> {
        let ctx = RequestContext::new();
        log_op_start!("delete_lease", request_id = %ctx.request_id, lease_id = %id);
        let start = Instant::now();

        self.delete_lease_impl(id).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "delete_lease",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "delete_lease",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            lease_id = %id
        );
        Ok(())
    }

    fn delete_lease_impl(&self, id: &str) -> Result<()> {
        let lease = self.store.get_lease(id)?;
        if !lease.is_active() {
            return self.store.delete_lease(id);
        }

        let handle = self.locks.handle(&lease.property_id);
        let _guard = handle.lock();

        let lease = self.store.get_lease(id)?;
        if lease.is_active() {
            self.release_property(&lease)?;
        }
        self.store.delete_lease(id)
    }

    /// Read a lease by id
    ///
    /// # Errors
    /// - `NotFound`: lease id does not resolve
    pub fn get_lease(&self, id: &str) -> Result<Lease> {
        self.store.get_lease(id)
    }

    /// List leases, optionally filtered by status
    pub fn list_leases(&self, status: Option<LeaseStatus>) -> Result<Vec<Lease>> {
        self.store.list_leases(status)
    }

    /// All leases held by a tenant
    pub fn leases_by_tenant(&self, tenant_id: &str) -> Result<Vec<Lease>> {
        self.store.get_tenant(tenant_id)?;
        self.store.leases_by_tenant(tenant_id)
    }

    /// All leases (historical and active) referencing a property
    pub fn leases_by_property(&self, property_id: &str) -> Result<Vec<Lease>> {
        self.store.get_property(property_id)?;
        self.store.leases_by_property(property_id)
    }

    /// Flip the property of a closing lease back to Available
    ///
    /// Defensive on two fronts: if another Active lease still references
    /// the property (the invariant forbids it, but drift is checked for),
    /// the property stays Rented; if the property is already Available or
    /// already gone, the release is absorbed as done. Caller must hold the
    /// property's critical section.
    fn release_property(&self, lease: &Lease) -> Result<()> {
        if let Some(other) = self.store.active_lease_for_property(&lease.property_id)? {
            if other.id != lease.id {
                tracing::debug!(
                    component = module_path!(),
                    property_id = %lease.property_id,
                    other_lease_id = %other.id,
                    "property kept Rented: another active lease references it"
                );
                return Ok(());
            }
        }
        match self.store.set_property_status(
            &lease.property_id,
            PropertyStatus::Rented,
            PropertyStatus::Available,
        ) {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::Conflict | ErrorKind::NotFound) => {
                // Already Available (or property deleted): nothing to undo.
                tracing::debug!(
                    component = module_path!(),
                    property_id = %lease.property_id,
                    "release absorbed: property not in Rented state"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
