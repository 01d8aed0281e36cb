use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, LocareError};

/// Availability status of a property
///
/// Central invariant of the system: `Rented` iff exactly one Active lease
/// references this property, `Available` iff zero do. Only the lease
/// lifecycle engine writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStatus {
    Available,
    Rented,
}

impl PropertyStatus {
    /// Stable string form, used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Rented => "Rented",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyStatus {
    type Err = LocareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(PropertyStatus::Available),
            "Rented" => Ok(PropertyStatus::Rented),
            other => Err(LocareError::new(ErrorKind::Serialization)
                .with_message(format!("unknown property status '{}'", other))),
        }
    }
}

/// Property - a rentable unit belonging to an Owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier (UUIDv7)
    pub id: String,

    /// Short human-facing name ("blue house", "unit 12b")
    pub nickname: String,

    pub description: Option<String>,

    pub address: String,

    /// Asking rent when no lease is active, must be positive
    pub base_rent: f64,

    /// Open-set type tag ("house", "apartment", ...)
    pub kind: String,

    /// Availability flag, kept consistent with Active leases by the engine
    pub status: PropertyStatus,

    /// Foreign reference to the owning Owner
    pub owner_id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a Property
///
/// Carries no status: a new property always starts `Available`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub nickname: String,
    pub description: Option<String>,
    pub address: String,
    pub base_rent: f64,
    pub kind: String,
    pub owner_id: String,
}

/// Partial-update payload for a Property
///
/// Deliberately has no status field; availability is owned by the lease
/// lifecycle engine and flips only as a lease side effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    pub nickname: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub base_rent: Option<f64>,
    pub kind: Option<String>,
}

impl Property {
    /// Build a Property record from a creation payload; starts Available
    pub fn from_new(id: String, new: NewProperty) -> Self {
        let now = Utc::now();
        Self {
            id,
            nickname: new.nickname,
            description: new.description,
            address: new.address,
            base_rent: new.base_rent,
            kind: new.kind,
            status: PropertyStatus::Available,
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == PropertyStatus::Available
    }

    /// Apply a partial update, bumping `updated_at`
    pub fn apply(&mut self, update: PropertyUpdate) {
        if let Some(nickname) = update.nickname {
            self.nickname = nickname;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(base_rent) = update.base_rent {
            self.base_rent = base_rent;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        self.updated_at = Utc::now();
    }
}
