// Integration tests for the lease lifecycle engine over the in-memory
// store: the one-active-lease invariant, availability flag sync, and the
// error surface of every lifecycle operation.

use std::sync::Arc;

use chrono::NaiveDate;

use locare_core::errors::ErrorKind;
use locare_core::logging::{init, Profile};
use locare_core::model::{
    LeaseStatus, LeaseUpdate, NewLease, NewOwner, NewProperty, NewTenant, PropertyStatus,
};
use locare_engine::{LeaseEngine, Registry};
use locare_store::{EntityStore, MemoryStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Fixture {
    store: Arc<MemoryStore>,
    engine: LeaseEngine<MemoryStore>,
    tenant_id: String,
    property_id: String,
}

fn fixture() -> Fixture {
    init(Profile::Test);
    let store = Arc::new(MemoryStore::new());
    let registry = Registry::new(store.clone());

    let owner = registry
        .create_owner(NewOwner {
            name: "Ana Souza".to_string(),
            tax_id: "11122233344".to_string(),
            email: None,
            phone: "555-0100".to_string(),
            address: None,
        })
        .unwrap();
    let tenant = registry
        .create_tenant(NewTenant {
            name: "Bruno Lima".to_string(),
            tax_id: "55566677788".to_string(),
            email: "bruno@example.com".to_string(),
            phone: "555-0101".to_string(),
            monthly_income: 4200.0,
        })
        .unwrap();
    let property = registry
        .create_property(NewProperty {
            nickname: "harbor unit".to_string(),
            description: None,
            address: "12 Harbor Rd".to_string(),
            base_rent: 1500.0,
            kind: "apartment".to_string(),
            owner_id: owner.id,
        })
        .unwrap();

    Fixture {
        engine: LeaseEngine::new(store.clone()),
        store,
        tenant_id: tenant.id,
        property_id: property.id,
    }
}

fn new_lease(f: &Fixture) -> NewLease {
    NewLease {
        tenant_id: f.tenant_id.clone(),
        property_id: f.property_id.clone(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        rent_amount: 1600.0,
    }
}

#[test]
fn test_create_rents_property() {
    let f = fixture();

    let lease = f.engine.create_lease(new_lease(&f)).unwrap();
    assert_eq!(lease.status, LeaseStatus::Active);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Rented
    );
    assert_eq!(f.engine.get_lease(&lease.id).unwrap().id, lease.id);
}

#[test]
fn test_second_lease_on_rented_property_conflicts() {
    let f = fixture();
    f.engine.create_lease(new_lease(&f)).unwrap();

    let err = f.engine.create_lease(new_lease(&f)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // The losing attempt wrote nothing
    assert_eq!(f.store.list_leases(None).unwrap().len(), 1);
}

#[test]
fn test_terminate_releases_property() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    let closed = f.engine.terminate_lease(&lease.id).unwrap();
    assert_eq!(closed.status, LeaseStatus::Terminated);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );

    // Terminate is not idempotent: the second call reports the state
    let err = f.engine.terminate_lease(&lease.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );
}

#[test]
fn test_terminate_then_create_again() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();
    f.engine.terminate_lease(&lease.id).unwrap();

    // The property is free again, so a new lease succeeds
    let second = f.engine.create_lease(new_lease(&f)).unwrap();
    assert_ne!(second.id, lease.id);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Rented
    );
    assert_eq!(f.engine.leases_by_property(&f.property_id).unwrap().len(), 2);
}

#[test]
fn test_update_status_cancelled_releases_property() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    let updated = f
        .engine
        .update_lease(
            &lease.id,
            LeaseUpdate {
                status: Some(LeaseStatus::Cancelled),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, LeaseStatus::Cancelled);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );
}

#[test]
fn test_update_fields_keeps_property_rented() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    let updated = f
        .engine
        .update_lease(
            &lease.id,
            LeaseUpdate {
                rent_amount: Some(1750.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.rent_amount, 1750.0);
    assert_eq!(updated.status, LeaseStatus::Active);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Rented
    );
}

#[test]
fn test_reactivating_closed_lease_conflicts() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();
    f.engine.terminate_lease(&lease.id).unwrap();

    let err = f
        .engine
        .update_lease(
            &lease.id,
            LeaseUpdate {
                status: Some(LeaseStatus::Active),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        f.engine.get_lease(&lease.id).unwrap().status,
        LeaseStatus::Terminated
    );
}

#[test]
fn test_repeated_close_via_update_conflicts() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();
    let close = LeaseUpdate {
        status: Some(LeaseStatus::Terminated),
        ..Default::default()
    };

    f.engine.update_lease(&lease.id, close.clone()).unwrap();
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );

    let err = f.engine.update_lease(&lease.id, close).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );
}

#[test]
fn test_close_request_on_closed_lease_leaves_property_alone() {
    let f = fixture();
    let first = f.engine.create_lease(new_lease(&f)).unwrap();
    f.engine.terminate_lease(&first.id).unwrap();
    let second = f.engine.create_lease(new_lease(&f)).unwrap();

    // Cancelling the old, already-terminated lease is rejected and must
    // not free the property out from under the new lease
    let err = f
        .engine
        .update_lease(
            &first.id,
            LeaseUpdate {
                status: Some(LeaseStatus::Cancelled),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Rented
    );
    assert_eq!(
        f.engine.get_lease(&second.id).unwrap().status,
        LeaseStatus::Active
    );
}

#[test]
fn test_delete_active_lease_releases_property() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    f.engine.delete_lease(&lease.id).unwrap();
    assert_eq!(
        f.engine.get_lease(&lease.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );
}

#[test]
fn test_delete_closed_lease_keeps_property_state() {
    let f = fixture();
    let first = f.engine.create_lease(new_lease(&f)).unwrap();
    f.engine.terminate_lease(&first.id).unwrap();
    f.engine.create_lease(new_lease(&f)).unwrap();

    f.engine.delete_lease(&first.id).unwrap();
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Rented
    );
}

#[test]
fn test_validation_failures_write_nothing() {
    let f = fixture();

    let err = f
        .engine
        .create_lease(NewLease {
            end_date: date(2024, 1, 1),
            start_date: date(2024, 12, 31),
            ..new_lease(&f)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);

    let err = f
        .engine
        .create_lease(NewLease {
            rent_amount: 0.0,
            ..new_lease(&f)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);

    let err = f
        .engine
        .create_lease(NewLease {
            tenant_id: "missing".to_string(),
            ..new_lease(&f)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(f.store.list_leases(None).unwrap().is_empty());
    assert_eq!(
        f.store.get_property(&f.property_id).unwrap().status,
        PropertyStatus::Available
    );
}

#[test]
fn test_update_validates_merged_dates() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    // Patch end date alone behind the stored start date
    let err = f
        .engine
        .update_lease(
            &lease.id,
            LeaseUpdate {
                end_date: Some(date(2023, 6, 1)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert_eq!(
        f.engine.get_lease(&lease.id).unwrap().end_date,
        date(2024, 12, 31)
    );
}

#[test]
fn test_lookups_by_tenant_and_unknown_ids() {
    let f = fixture();
    let lease = f.engine.create_lease(new_lease(&f)).unwrap();

    let mine = f.engine.leases_by_tenant(&f.tenant_id).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, lease.id);

    assert_eq!(
        f.engine.leases_by_tenant("missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        f.engine.leases_by_property("missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        f.engine.terminate_lease("missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_engine_errors_carry_request_id() {
    let f = fixture();

    // Distinct operations get distinct correlation ids
    let a = f.engine.terminate_lease("missing").unwrap_err();
    let b = f.engine.delete_lease("missing").unwrap_err();
    assert!(a.request_id().is_some());
    assert!(b.request_id().is_some());
    assert_ne!(a.request_id(), b.request_id());

    let err = f
        .engine
        .create_lease(NewLease {
            rent_amount: -1.0,
            ..new_lease(&f)
        })
        .unwrap_err();
    assert!(err.request_id().is_some());
}
