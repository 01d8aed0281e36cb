use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant - a person who can hold lease contracts
///
/// A tenant may hold multiple leases, concurrently or over time, with no
/// cap; nothing in the model restricts that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier (UUIDv7)
    pub id: String,

    pub name: String,

    /// National tax identifier
    pub tax_id: String,

    pub email: String,

    pub phone: String,

    /// Declared monthly income, must be positive
    pub monthly_income: f64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a Tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTenant {
    pub name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub monthly_income: f64,
}

/// Partial-update payload for a Tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub monthly_income: Option<f64>,
}

impl Tenant {
    /// Build a Tenant record from a creation payload
    pub fn from_new(id: String, new: NewTenant) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            tax_id: new.tax_id,
            email: new.email,
            phone: new.phone,
            monthly_income: new.monthly_income,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`
    pub fn apply(&mut self, update: TenantUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(tax_id) = update.tax_id {
            self.tax_id = tax_id;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(income) = update.monthly_income {
            self.monthly_income = income;
        }
        self.updated_at = Utc::now();
    }
}
