//! Entity registry
//!
//! Plain CRUD for owners, tenants, and properties. Lease writes never
//! happen here; those go through the lifecycle engine. The registry
//! validates input and resolves cross-references, then passes through to
//! the store. Mutations mint a `RequestContext` for boundary logging and
//! error correlation; reads pass through unlogged.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use locare_core::errors::Result;
use locare_core::model::{
    NewOwner, NewProperty, NewTenant, Owner, OwnerUpdate, Property, PropertyUpdate, Tenant,
    TenantUpdate,
};
use locare_core::validate;
use locare_core::{log_op_end, log_op_error, log_op_start};
use locare_core_types::RequestContext;
use locare_store::EntityStore;

/// Registry over the Entity Store
pub struct Registry<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> Registry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new owner
    ///
    /// # Errors
    /// - `InvalidInput`: blank name or tax id
    pub fn create_owner(&self, new: NewOwner) -> Result<Owner> {
        let ctx = RequestContext::new();
        log_op_start!("create_owner", request_id = %ctx.request_id);
        let start = Instant::now();

        let result = self.create_owner_impl(new).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "create_owner",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "create_owner",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            owner_id = %result.id
        );
        Ok(result)
    }

    fn create_owner_impl(&self, new: NewOwner) -> Result<Owner> {
        validate::required_text("name", &new.name)?;
        validate::required_text("tax_id", &new.tax_id)?;
        self.store
            .insert_owner(Owner::from_new(Uuid::now_v7().to_string(), new))
    }

    pub fn get_owner(&self, id: &str) -> Result<Owner> {
        self.store.get_owner(id)
    }

    pub fn list_owners(&self) -> Result<Vec<Owner>> {
        self.store.list_owners()
    }

    pub fn update_owner(&self, id: &str, update: OwnerUpdate) -> Result<Owner> {
        let ctx = RequestContext::new();
        log_op_start!("update_owner", request_id = %ctx.request_id, owner_id = %id);
        let start = Instant::now();

        let result = self.store.update_owner(id, update).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "update_owner",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "update_owner",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(result)
    }

    pub fn delete_owner(&self, id: &str) -> Result<()> {
        let ctx = RequestContext::new();
        log_op_start!("delete_owner", request_id = %ctx.request_id, owner_id = %id);
        let start = Instant::now();

        self.store.delete_owner(id).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "delete_owner",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "delete_owner",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(())
    }

    /// Register a new tenant
    ///
    /// # Errors
    /// - `InvalidInput`: blank name or tax id
    /// - `InvalidRange`: non-positive monthly income
    pub fn create_tenant(&self, new: NewTenant) -> Result<Tenant> {
        let ctx = RequestContext::new();
        log_op_start!("create_tenant", request_id = %ctx.request_id);
        let start = Instant::now();

        let result = self.create_tenant_impl(new).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "create_tenant",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "create_tenant",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            tenant_id = %result.id
        );
        Ok(result)
    }

    fn create_tenant_impl(&self, new: NewTenant) -> Result<Tenant> {
        validate::required_text("name", &new.name)?;
        validate::required_text("tax_id", &new.tax_id)?;
        validate::positive_amount("monthly_income", new.monthly_income)?;
        self.store
            .insert_tenant(Tenant::from_new(Uuid::now_v7().to_string(), new))
    }

    pub fn get_tenant(&self, id: &str) -> Result<Tenant> {
        self.store.get_tenant(id)
    }

    pub fn list_tenants(&self) -> Result<Vec<Tenant>> {
        self.store.list_tenants()
    }

    pub fn update_tenant(&self, id: &str, update: TenantUpdate) -> Result<Tenant> {
        let ctx = RequestContext::new();
        log_op_start!("update_tenant", request_id = %ctx.request_id, tenant_id = %id);
        let start = Instant::now();

        let result = self.update_tenant_impl(id, update).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "update_tenant",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "update_tenant",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(result)
    }

    fn update_tenant_impl(&self, id: &str, update: TenantUpdate) -> Result<Tenant> {
        if let Some(income) = update.monthly_income {
            validate::positive_amount("monthly_income", income)?;
        }
        self.store.update_tenant(id, update)
    }

    pub fn delete_tenant(&self, id: &str) -> Result<()> {
        let ctx = RequestContext::new();
        log_op_start!("delete_tenant", request_id = %ctx.request_id, tenant_id = %id);
        let start = Instant::now();

        self.store.delete_tenant(id).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "delete_tenant",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "delete_tenant",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(())
    }

    /// Register a new property; it starts Available
    ///
    /// # Errors
    /// - `NotFound`: the owner id does not resolve
    /// - `InvalidInput`: blank nickname or address
    /// - `InvalidRange`: non-positive base rent
    pub fn create_property(&self, new: NewProperty) -> Result<Property> {
        let ctx = RequestContext::new();
        log_op_start!(
            "create_property",
            request_id = %ctx.request_id,
            owner_id = %new.owner_id
        );
        let start = Instant::now();

        let result = self.create_property_impl(new).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "create_property",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "create_property",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            property_id = %result.id
        );
        Ok(result)
    }

    fn create_property_impl(&self, new: NewProperty) -> Result<Property> {
        validate::required_text("nickname", &new.nickname)?;
        validate::required_text("address", &new.address)?;
        validate::positive_amount("base_rent", new.base_rent)?;
        self.store.get_owner(&new.owner_id)?;
        self.store
            .insert_property(Property::from_new(Uuid::now_v7().to_string(), new))
    }

    pub fn get_property(&self, id: &str) -> Result<Property> {
        self.store.get_property(id)
    }

    pub fn list_properties(&self) -> Result<Vec<Property>> {
        self.store.list_properties()
    }

    pub fn properties_by_owner(&self, owner_id: &str) -> Result<Vec<Property>> {
        self.store.get_owner(owner_id)?;
        self.store.properties_by_owner(owner_id)
    }

    /// Update a property's descriptive fields
    ///
    /// Availability is not part of the patch type; only the lifecycle
    /// engine moves it.
    pub fn update_property(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let ctx = RequestContext::new();
        log_op_start!("update_property", request_id = %ctx.request_id, property_id = %id);
        let start = Instant::now();

        let result = self.update_property_impl(id, update).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "update_property",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "update_property",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(result)
    }

    fn update_property_impl(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        if let Some(rent) = update.base_rent {
            validate::positive_amount("base_rent", rent)?;
        }
        self.store.update_property(id, update)
    }

    pub fn delete_property(&self, id: &str) -> Result<()> {
        let ctx = RequestContext::new();
        log_op_start!("delete_property", request_id = %ctx.request_id, property_id = %id);
        let start = Instant::now();

        self.store.delete_property(id).map_err(|e| {
            let e = e.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "delete_property",
                &e,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "delete_property",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        Ok(())
    }
}
