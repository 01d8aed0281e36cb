use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, LocareError};

/// Lifecycle status of a lease contract
///
/// A lease is created Active and leaves Active exactly once, to Terminated
/// or Cancelled. There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaseStatus {
    Active,
    Terminated,
    Cancelled,
}

impl LeaseStatus {
    /// Stable string form, used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Active => "Active",
            LeaseStatus::Terminated => "Terminated",
            LeaseStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeaseStatus {
    type Err = LocareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(LeaseStatus::Active),
            "Terminated" => Ok(LeaseStatus::Terminated),
            "Cancelled" => Ok(LeaseStatus::Cancelled),
            other => Err(LocareError::new(ErrorKind::Serialization)
                .with_message(format!("unknown lease status '{}'", other))),
        }
    }
}

/// Lease - a rental contract binding one Tenant to one Property
///
/// The tenant and property references are immutable once created; only
/// dates, rent amount, and status are mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    /// Unique identifier (UUIDv7)
    pub id: String,

    /// Foreign reference to the Tenant, immutable
    pub tenant_id: String,

    /// Foreign reference to the Property, immutable
    pub property_id: String,

    pub start_date: NaiveDate,

    /// Must be strictly after `start_date`
    pub end_date: NaiveDate,

    /// Contracted rent; may differ from the property's base rent
    pub rent_amount: f64,

    pub status: LeaseStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a Lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLease {
    pub tenant_id: String,
    pub property_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: f64,
}

/// Partial-update payload for a Lease (mutable fields only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaseUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rent_amount: Option<f64>,
    pub status: Option<LeaseStatus>,
}

impl Lease {
    /// Build an Active lease from a creation payload
    pub fn from_new(id: String, new: NewLease) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id: new.tenant_id,
            property_id: new.property_id,
            start_date: new.start_date,
            end_date: new.end_date,
            rent_amount: new.rent_amount,
            status: LeaseStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LeaseStatus::Active
    }

    /// Apply a partial update, bumping `updated_at`
    ///
    /// Purely mechanical merge; the lifecycle rules around status changes
    /// are enforced by the engine before this is called.
    pub fn apply(&mut self, update: LeaseUpdate) {
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(rent_amount) = update.rent_amount {
            self.rent_amount = rent_amount;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

impl LeaseUpdate {
    /// True when this update would move a lease out of Active
    pub fn closes_lease(&self) -> bool {
        matches!(
            self.status,
            Some(LeaseStatus::Terminated) | Some(LeaseStatus::Cancelled)
        )
    }
}
