// Reporting engine tests over the in-memory store, plus one pass against
// the SQLite store to keep the two backends honest with each other.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use locare_core::logging::{init, Profile};
use locare_core::model::{NewLease, NewOwner, NewProperty, NewTenant, PropertyStatus};
use locare_engine::{LeaseEngine, Registry, Reports};
use locare_store::{EntityStore, MemoryStore, SqliteStore, StoreConfig};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct World<S: EntityStore> {
    registry: Registry<S>,
    engine: LeaseEngine<S>,
    reports: Reports<S>,
}

fn world<S: EntityStore>(store: Arc<S>) -> World<S> {
    init(Profile::Test);
    World {
        registry: Registry::new(store.clone()),
        engine: LeaseEngine::new(store.clone()),
        reports: Reports::new(store),
    }
}

fn seed_owner<S: EntityStore>(w: &World<S>, name: &str) -> String {
    w.registry
        .create_owner(NewOwner {
            name: name.to_string(),
            tax_id: "11122233344".to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: "555-0100".to_string(),
            address: None,
        })
        .unwrap()
        .id
}

fn seed_tenant<S: EntityStore>(w: &World<S>, name: &str) -> String {
    w.registry
        .create_tenant(NewTenant {
            name: name.to_string(),
            tax_id: "55566677788".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0101".to_string(),
            monthly_income: 4200.0,
        })
        .unwrap()
        .id
}

fn seed_property<S: EntityStore>(w: &World<S>, owner_id: &str, nickname: &str, kind: &str) -> String {
    w.registry
        .create_property(NewProperty {
            nickname: nickname.to_string(),
            description: None,
            address: "12 Harbor Rd".to_string(),
            base_rent: 1500.0,
            kind: kind.to_string(),
            owner_id: owner_id.to_string(),
        })
        .unwrap()
        .id
}

fn seed_lease<S: EntityStore>(
    w: &World<S>,
    tenant_id: &str,
    property_id: &str,
    rent: f64,
    end: NaiveDate,
) -> String {
    w.engine
        .create_lease(NewLease {
            tenant_id: tenant_id.to_string(),
            property_id: property_id.to_string(),
            start_date: date(2024, 1, 1),
            end_date: end,
            rent_amount: rent,
        })
        .unwrap()
        .id
}

#[test]
fn test_counts_and_revenue() {
    let w = world(Arc::new(MemoryStore::new()));
    let owner = seed_owner(&w, "Ana");
    let tenant = seed_tenant(&w, "Bruno");
    let p1 = seed_property(&w, &owner, "unit 1", "house");
    seed_property(&w, &owner, "unit 2", "house");
    seed_property(&w, &owner, "unit 3", "apartment");

    let counts = w.reports.count_by_property_kind().unwrap();
    assert_eq!(counts.get("house"), Some(&2));
    assert_eq!(counts.get("apartment"), Some(&1));

    assert_eq!(w.reports.active_revenue_total().unwrap(), 0.0);
    let lease = seed_lease(&w, &tenant, &p1, 1000.0, date(2024, 12, 31));
    assert_eq!(w.reports.active_revenue_total().unwrap(), 1000.0);

    // Closed leases drop out of the revenue total
    w.engine.terminate_lease(&lease).unwrap();
    assert_eq!(w.reports.active_revenue_total().unwrap(), 0.0);
}

#[test]
fn test_owner_occupancy_rollup() {
    let w = world(Arc::new(MemoryStore::new()));
    let ana = seed_owner(&w, "Ana");
    let caio = seed_owner(&w, "Caio");
    let tenant = seed_tenant(&w, "Bruno");

    let rented = seed_property(&w, &ana, "rented unit", "house");
    let idle = seed_property(&w, &ana, "idle unit", "apartment");
    let historical = seed_property(&w, &ana, "history unit", "house");
    seed_lease(&w, &tenant, &rented, 2000.0, date(2024, 12, 31));
    let old = seed_lease(&w, &tenant, &historical, 900.0, date(2024, 6, 30));
    w.engine.terminate_lease(&old).unwrap();

    let report = w.reports.owner_occupancy_report().unwrap();
    assert_eq!(report.len(), 2);

    let ana_row = report.iter().find(|o| o.owner_id == ana).unwrap();
    assert_eq!(ana_row.owner_name, "Ana");
    assert_eq!(ana_row.total_properties, 3);

    let row = |id: &str| ana_row.properties.iter().find(|p| p.property_id == id).unwrap();
    let rented_row = row(&rented);
    assert_eq!(rented_row.status, PropertyStatus::Rented);
    assert_eq!(rented_row.current_rent, 2000.0);
    assert_eq!(rented_row.tenant_name.as_deref(), Some("Bruno"));
    assert_eq!(rented_row.lease_end, Some(date(2024, 12, 31)));

    // Base rent and no tenant for the idle unit
    let idle_row = row(&idle);
    assert_eq!(idle_row.status, PropertyStatus::Available);
    assert_eq!(idle_row.current_rent, 1500.0);
    assert_eq!(idle_row.tenant_name, None);

    // A historical-only lease does not count as occupancy
    let history_row = row(&historical);
    assert_eq!(history_row.status, PropertyStatus::Available);
    assert_eq!(history_row.lease_end, None);

    // Owners with no properties still appear
    let caio_row = report.iter().find(|o| o.owner_id == caio).unwrap();
    assert_eq!(caio_row.total_properties, 0);
    assert!(caio_row.properties.is_empty());
}

#[test]
fn test_expiring_leases_by_month() {
    let w = world(Arc::new(MemoryStore::new()));
    let owner = seed_owner(&w, "Ana");
    let tenant = seed_tenant(&w, "Bruno");
    let p1 = seed_property(&w, &owner, "unit 1", "house");
    let p2 = seed_property(&w, &owner, "unit 2", "house");

    let june = seed_lease(&w, &tenant, &p1, 1000.0, date(2024, 6, 15));
    seed_lease(&w, &tenant, &p2, 1000.0, date(2024, 7, 1));

    let hits: Vec<String> = w
        .reports
        .leases_expiring(2024, 6)
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(hits, vec![june]);
    assert!(w.reports.leases_expiring(2025, 6).unwrap().is_empty());
}

#[test]
fn test_reports_against_sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&StoreConfig::new(dir.path().join("test.db"))).unwrap();
    let w = world(Arc::new(store));

    let owner = seed_owner(&w, "Ana");
    let tenant = seed_tenant(&w, "Bruno");
    let p1 = seed_property(&w, &owner, "unit 1", "house");
    seed_property(&w, &owner, "unit 2", "apartment");
    seed_lease(&w, &tenant, &p1, 1250.0, date(2024, 9, 30));

    assert_eq!(
        w.reports.count_by_property_kind().unwrap().get("house"),
        Some(&1)
    );
    assert_eq!(w.reports.active_revenue_total().unwrap(), 1250.0);

    let report = w.reports.owner_occupancy_report().unwrap();
    assert_eq!(report.len(), 1);
    let rented = report[0]
        .properties
        .iter()
        .find(|p| p.property_id == p1)
        .unwrap();
    assert_eq!(rented.status, PropertyStatus::Rented);
    assert_eq!(rented.tenant_name.as_deref(), Some("Bruno"));

    assert_eq!(w.reports.leases_expiring(2024, 9).unwrap().len(), 1);
}
