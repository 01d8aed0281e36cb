//! SQLite Entity Store
//!
//! Single-connection store guarded by a mutex, with embedded migrations
//! applied at open time. The property-status compare-and-set is a
//! conditional UPDATE checked by affected-row count, so it holds across
//! processes sharing the database file, not just across threads.

pub mod migrations;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row};

use locare_core::errors::{conflict, not_found, Result};
use locare_core::model::{
    Lease, LeaseStatus, LeaseUpdate, Owner, OwnerUpdate, Property, PropertyStatus, PropertyUpdate,
    Tenant, TenantUpdate,
};

use crate::config::StoreConfig;
use crate::entity_store::EntityStore;
use crate::errors::{from_rusqlite, row_decode_error};

/// SQLite-backed Entity Store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database named by the configuration, applying pending
    /// migrations
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path).map_err(from_rusqlite)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        configure(&conn)?;
        migrations::apply_migrations(&mut conn)?;
        tracing::debug!(component = module_path!(), "sqlite store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Connection settings: WAL for concurrent readers, bounded busy wait so a
/// contended write surfaces as StoreUnavailable instead of blocking forever
fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(from_rusqlite)?;
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(from_rusqlite)?;
    Ok(())
}

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_date(table: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| row_decode_error(table, e))
}

fn read_owner(row: &Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: row.get(0)?,
        name: row.get(1)?,
        tax_id: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        created_at: ts(row.get(6)?),
        updated_at: ts(row.get(7)?),
    })
}

fn read_tenant(row: &Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: row.get(0)?,
        name: row.get(1)?,
        tax_id: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        monthly_income: row.get(5)?,
        created_at: ts(row.get(6)?),
        updated_at: ts(row.get(7)?),
    })
}

/// Property row before status parsing
type PropertyRow = (
    String,
    String,
    Option<String>,
    String,
    f64,
    String,
    String,
    String,
    i64,
    i64,
);

fn read_property_row(row: &Row<'_>) -> rusqlite::Result<PropertyRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn property_from_row(raw: PropertyRow) -> Result<Property> {
    let (id, nickname, description, address, base_rent, kind, status, owner_id, created, updated) =
        raw;
    Ok(Property {
        id,
        nickname,
        description,
        address,
        base_rent,
        kind,
        status: status.parse::<PropertyStatus>()?,
        owner_id,
        created_at: ts(created),
        updated_at: ts(updated),
    })
}

/// Lease row before date/status parsing
type LeaseRow = (
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    i64,
    i64,
);

fn read_lease_row(row: &Row<'_>) -> rusqlite::Result<LeaseRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn lease_from_row(raw: LeaseRow) -> Result<Lease> {
    let (id, tenant_id, property_id, start, end, rent_amount, status, created, updated) = raw;
    Ok(Lease {
        id,
        tenant_id,
        property_id,
        start_date: parse_date("leases", &start)?,
        end_date: parse_date("leases", &end)?,
        rent_amount,
        status: status.parse::<LeaseStatus>()?,
        created_at: ts(created),
        updated_at: ts(updated),
    })
}

const OWNER_COLS: &str = "id, name, tax_id, email, phone, address, created_at, updated_at";
const TENANT_COLS: &str = "id, name, tax_id, email, phone, monthly_income, created_at, updated_at";
const PROPERTY_COLS: &str =
    "id, nickname, description, address, base_rent, kind, status, owner_id, created_at, updated_at";
const LEASE_COLS: &str =
    "id, tenant_id, property_id, start_date, end_date, rent_amount, status, created_at, updated_at";

impl SqliteStore {
    fn write_owner(conn: &Connection, owner: &Owner) -> Result<()> {
        conn.execute(
            "INSERT INTO owners (id, name, tax_id, email, phone, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                tax_id = excluded.tax_id,
                email = excluded.email,
                phone = excluded.phone,
                address = excluded.address,
                updated_at = excluded.updated_at",
            rusqlite::params![
                owner.id,
                owner.name,
                owner.tax_id,
                owner.email,
                owner.phone,
                owner.address,
                owner.created_at.timestamp(),
                owner.updated_at.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn write_tenant(conn: &Connection, tenant: &Tenant) -> Result<()> {
        conn.execute(
            "INSERT INTO tenants (id, name, tax_id, email, phone, monthly_income, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                tax_id = excluded.tax_id,
                email = excluded.email,
                phone = excluded.phone,
                monthly_income = excluded.monthly_income,
                updated_at = excluded.updated_at",
            rusqlite::params![
                tenant.id,
                tenant.name,
                tenant.tax_id,
                tenant.email,
                tenant.phone,
                tenant.monthly_income,
                tenant.created_at.timestamp(),
                tenant.updated_at.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn write_property(conn: &Connection, property: &Property) -> Result<()> {
        conn.execute(
            "INSERT INTO properties (id, nickname, description, address, base_rent, kind, status, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                nickname = excluded.nickname,
                description = excluded.description,
                address = excluded.address,
                base_rent = excluded.base_rent,
                kind = excluded.kind,
                status = excluded.status,
                updated_at = excluded.updated_at",
            rusqlite::params![
                property.id,
                property.nickname,
                property.description,
                property.address,
                property.base_rent,
                property.kind,
                property.status.as_str(),
                property.owner_id,
                property.created_at.timestamp(),
                property.updated_at.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn write_lease(conn: &Connection, lease: &Lease) -> Result<()> {
        conn.execute(
            "INSERT INTO leases (id, tenant_id, property_id, start_date, end_date, rent_amount, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                rent_amount = excluded.rent_amount,
                status = excluded.status,
                updated_at = excluded.updated_at",
            rusqlite::params![
                lease.id,
                lease.tenant_id,
                lease.property_id,
                lease.start_date.to_string(),
                lease.end_date.to_string(),
                lease.rent_amount,
                lease.status.as_str(),
                lease.created_at.timestamp(),
                lease.updated_at.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn query_leases(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Lease>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let raws: Vec<LeaseRow> = stmt
            .query_map(params, read_lease_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;
        raws.into_iter().map(lease_from_row).collect()
    }

    fn query_properties(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Property>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let raws: Vec<PropertyRow> = stmt
            .query_map(params, read_property_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;
        raws.into_iter().map(property_from_row).collect()
    }

    fn fetch_owner(conn: &Connection, id: &str) -> Result<Owner> {
        conn.query_row(
            &format!("SELECT {} FROM owners WHERE id = ?1", OWNER_COLS),
            [id],
            read_owner,
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| not_found("owner", id))
    }

    fn fetch_tenant(conn: &Connection, id: &str) -> Result<Tenant> {
        conn.query_row(
            &format!("SELECT {} FROM tenants WHERE id = ?1", TENANT_COLS),
            [id],
            read_tenant,
        )
        .optional()
        .map_err(from_rusqlite)?
        .ok_or_else(|| not_found("tenant", id))
    }

    fn fetch_property(conn: &Connection, id: &str) -> Result<Property> {
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM properties WHERE id = ?1", PROPERTY_COLS),
                [id],
                read_property_row,
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| not_found("property", id))?;
        property_from_row(raw)
    }

    fn fetch_lease(conn: &Connection, id: &str) -> Result<Lease> {
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM leases WHERE id = ?1", LEASE_COLS),
                [id],
                read_lease_row,
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| not_found("lease", id))?;
        lease_from_row(raw)
    }
}

impl EntityStore for SqliteStore {
    // ---- Owners ----

    fn insert_owner(&self, owner: Owner) -> Result<Owner> {
        let conn = self.conn.lock();
        Self::write_owner(&conn, &owner)?;
        Ok(owner)
    }

    fn get_owner(&self, id: &str) -> Result<Owner> {
        let conn = self.conn.lock();
        Self::fetch_owner(&conn, id)
    }

    fn list_owners(&self) -> Result<Vec<Owner>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM owners ORDER BY created_at, id",
                OWNER_COLS
            ))
            .map_err(from_rusqlite)?;
        let owners = stmt
            .query_map([], read_owner)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;
        Ok(owners)
    }

    fn update_owner(&self, id: &str, update: OwnerUpdate) -> Result<Owner> {
        let conn = self.conn.lock();
        let mut owner = Self::fetch_owner(&conn, id)?;
        owner.apply(update);
        Self::write_owner(&conn, &owner)?;
        Ok(owner)
    }

    fn delete_owner(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let affected = conn
            .execute("DELETE FROM owners WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        if affected == 0 {
            return Err(not_found("owner", id));
        }
        Ok(())
    }

    // ---- Tenants ----

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant> {
        let conn = self.conn.lock();
        Self::write_tenant(&conn, &tenant)?;
        Ok(tenant)
    }

    fn get_tenant(&self, id: &str) -> Result<Tenant> {
        let conn = self.conn.lock();
        Self::fetch_tenant(&conn, id)
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tenants ORDER BY created_at, id",
                TENANT_COLS
            ))
            .map_err(from_rusqlite)?;
        let tenants = stmt
            .query_map([], read_tenant)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;
        Ok(tenants)
    }

    fn update_tenant(&self, id: &str, update: TenantUpdate) -> Result<Tenant> {
        let conn = self.conn.lock();
        let mut tenant = Self::fetch_tenant(&conn, id)?;
        tenant.apply(update);
        Self::write_tenant(&conn, &tenant)?;
        Ok(tenant)
    }

    fn delete_tenant(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let affected = conn
            .execute("DELETE FROM tenants WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        if affected == 0 {
            return Err(not_found("tenant", id));
        }
        Ok(())
    }

    // ---- Properties ----

    fn insert_property(&self, property: Property) -> Result<Property> {
        let conn = self.conn.lock();
        Self::write_property(&conn, &property)?;
        Ok(property)
    }

    fn get_property(&self, id: &str) -> Result<Property> {
        let conn = self.conn.lock();
        Self::fetch_property(&conn, id)
    }

    fn list_properties(&self) -> Result<Vec<Property>> {
        let conn = self.conn.lock();
        Self::query_properties(
            &conn,
            &format!(
                "SELECT {} FROM properties ORDER BY created_at, id",
                PROPERTY_COLS
            ),
            &[],
        )
    }

    fn properties_by_owner(&self, owner_id: &str) -> Result<Vec<Property>> {
        let conn = self.conn.lock();
        Self::query_properties(
            &conn,
            &format!(
                "SELECT {} FROM properties WHERE owner_id = ?1 ORDER BY created_at, id",
                PROPERTY_COLS
            ),
            &[&owner_id],
        )
    }

    fn update_property(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let conn = self.conn.lock();
        let mut property = Self::fetch_property(&conn, id)?;
        property.apply(update);
        Self::write_property(&conn, &property)?;
        Ok(property)
    }

    fn delete_property(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let affected = conn
            .execute("DELETE FROM properties WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        if affected == 0 {
            return Err(not_found("property", id));
        }
        Ok(())
    }

    fn set_property_status(
        &self,
        id: &str,
        expected: PropertyStatus,
        next: PropertyStatus,
    ) -> Result<()> {
        let conn = self.conn.lock();
        let affected = conn
            .execute(
                "UPDATE properties SET status = ?1, updated_at = ?2
                 WHERE id = ?3 AND status = ?4",
                rusqlite::params![
                    next.as_str(),
                    Utc::now().timestamp(),
                    id,
                    expected.as_str()
                ],
            )
            .map_err(from_rusqlite)?;
        if affected == 1 {
            return Ok(());
        }

        // Condition failed: distinguish a missing property from a lost race
        let current: Option<String> = conn
            .query_row("SELECT status FROM properties WHERE id = ?1", [id], |r| {
                r.get(0)
            })
            .optional()
            .map_err(from_rusqlite)?;
        match current {
            None => Err(not_found("property", id)),
            Some(status) => Err(conflict(format!(
                "property status is {}, expected {}",
                status, expected
            ))
            .with_entity_id(id)),
        }
    }

    // ---- Leases ----

    fn insert_lease(&self, lease: Lease) -> Result<Lease> {
        let conn = self.conn.lock();
        Self::write_lease(&conn, &lease)?;
        Ok(lease)
    }

    fn get_lease(&self, id: &str) -> Result<Lease> {
        let conn = self.conn.lock();
        Self::fetch_lease(&conn, id)
    }

    fn list_leases(&self, status: Option<LeaseStatus>) -> Result<Vec<Lease>> {
        let conn = self.conn.lock();
        match status {
            Some(status) => Self::query_leases(
                &conn,
                &format!(
                    "SELECT {} FROM leases WHERE status = ?1 ORDER BY created_at, id",
                    LEASE_COLS
                ),
                &[&status.as_str()],
            ),
            None => Self::query_leases(
                &conn,
                &format!("SELECT {} FROM leases ORDER BY created_at, id", LEASE_COLS),
                &[],
            ),
        }
    }

    fn leases_by_tenant(&self, tenant_id: &str) -> Result<Vec<Lease>> {
        let conn = self.conn.lock();
        Self::query_leases(
            &conn,
            &format!(
                "SELECT {} FROM leases WHERE tenant_id = ?1 ORDER BY created_at, id",
                LEASE_COLS
            ),
            &[&tenant_id],
        )
    }

    fn leases_by_property(&self, property_id: &str) -> Result<Vec<Lease>> {
        let conn = self.conn.lock();
        Self::query_leases(
            &conn,
            &format!(
                "SELECT {} FROM leases WHERE property_id = ?1 ORDER BY created_at, id",
                LEASE_COLS
            ),
            &[&property_id],
        )
    }

    fn active_lease_for_property(&self, property_id: &str) -> Result<Option<Lease>> {
        let conn = self.conn.lock();
        let leases = Self::query_leases(
            &conn,
            &format!(
                "SELECT {} FROM leases WHERE property_id = ?1 AND status = 'Active'
                 ORDER BY created_at, id LIMIT 1",
                LEASE_COLS
            ),
            &[&property_id],
        )?;
        Ok(leases.into_iter().next())
    }

    fn leases_ending_in(&self, year: i32, month: u32) -> Result<Vec<Lease>> {
        let prefix = format!("{:04}-{:02}", year, month);
        let conn = self.conn.lock();
        Self::query_leases(
            &conn,
            &format!(
                "SELECT {} FROM leases WHERE substr(end_date, 1, 7) = ?1
                 ORDER BY created_at, id",
                LEASE_COLS
            ),
            &[&prefix],
        )
    }

    fn update_lease_fields(&self, id: &str, update: LeaseUpdate) -> Result<Lease> {
        let conn = self.conn.lock();
        let mut lease = Self::fetch_lease(&conn, id)?;
        lease.apply(update);
        Self::write_lease(&conn, &lease)?;
        Ok(lease)
    }

    fn delete_lease(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let affected = conn
            .execute("DELETE FROM leases WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        if affected == 0 {
            return Err(not_found("lease", id));
        }
        Ok(())
    }

    // ---- Aggregation primitives ----

    fn count_properties_by_kind(&self) -> Result<BTreeMap<String, u64>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT kind, COUNT(*) FROM properties GROUP BY kind")
            .map_err(from_rusqlite)?;
        let rows: Vec<(String, u64)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows.into_iter().collect())
    }

    fn sum_active_lease_rent(&self) -> Result<f64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COALESCE(SUM(rent_amount), 0) FROM leases WHERE status = 'Active'",
            [],
            |r| r.get(0),
        )
        .map_err(from_rusqlite)
    }
}
