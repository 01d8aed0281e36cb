use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner - a person or company that owns rentable properties
///
/// No invariant beyond identity uniqueness; owners are referenced by
/// `Property.owner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    /// Unique identifier (UUIDv7)
    pub id: String,

    /// Legal or display name
    pub name: String,

    /// National tax identifier
    pub tax_id: String,

    /// Contact email, if known
    pub email: Option<String>,

    /// Contact phone
    pub phone: String,

    /// Mailing address, if known
    pub address: Option<String>,

    /// Timestamp when this record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when this record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for an Owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
}

/// Partial-update payload for an Owner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerUpdate {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Owner {
    /// Build an Owner record from a creation payload
    pub fn from_new(id: String, new: NewOwner) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            tax_id: new.tax_id,
            email: new.email,
            phone: new.phone,
            address: new.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`
    pub fn apply(&mut self, update: OwnerUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(tax_id) = update.tax_id {
            self.tax_id = tax_id;
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        self.updated_at = Utc::now();
    }
}
