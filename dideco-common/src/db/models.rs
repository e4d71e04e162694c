//! Database models
//!
//! Row structs map 1:1 onto the tables created in [`crate::db::init`];
//! the serde renames follow the client's camelCase wire convention.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: i64,
    #[serde(rename = "code")]
    pub product_code: String,
    pub name: String,
    #[serde(rename = "category")]
    pub category_code: String,
    pub quantity: i64,
    #[serde(rename = "price")]
    pub unit_price: i64,
    #[serde(rename = "purchaseOrder")]
    pub purchase_order: String,
    #[serde(rename = "purchaseDate")]
    pub uploaded_at: Option<String>,
    #[serde(rename = "manualStatus")]
    pub manual_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Beneficiary {
    pub id: i64,
    pub rut: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "registeredAt")]
    pub registered_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Professional {
    pub id: i64,
    pub rut: String,
    pub name: String,
    pub position: String,
    pub active: bool,
}

/// System user as stored, including capability flags.
///
/// The stored password travels back to the admin screen by design of the
/// original management UI; it never appears in login responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemUser {
    pub id: i64,
    pub rut: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(rename = "canCreate")]
    pub can_create: bool,
    #[serde(rename = "canRead")]
    pub can_read: bool,
    #[serde(rename = "canUpdate")]
    pub can_update: bool,
    #[serde(rename = "canDelete")]
    pub can_delete: bool,
    pub active: bool,
}

/// Login/profile view of a user: permission flags, no password
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub rut: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permissions {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl From<SystemUser> for UserProfile {
    fn from(u: SystemUser) -> Self {
        UserProfile {
            id: u.id,
            rut: u.rut,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role,
            permissions: Permissions {
                create: u.can_create,
                read: u.can_read,
                update: u.can_update,
                delete: u.can_delete,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BenefitItem {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Delivery header row (one receipt)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Delivery {
    pub folio: i64,
    #[serde(rename = "date")]
    pub delivery_date: String,
    #[serde(rename = "beneficiaryRut")]
    pub beneficiary_rut: String,
    #[serde(rename = "beneficiaryName")]
    pub beneficiary_name: String,
    #[serde(rename = "professionalRut")]
    pub professional_rut: String,
    #[serde(rename = "professionalName")]
    pub professional_name: String,
    #[serde(rename = "receiverName")]
    pub receiver_name: String,
    pub observations: String,
    #[serde(rename = "aidType")]
    pub aid_type: String,
    #[serde(rename = "totalValue")]
    pub total_value: i64,
}

/// Delivery line item (one product on a receipt)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryLine {
    pub category: String,
    pub product: String,
    pub quantity: i64,
    #[serde(rename = "unitValue")]
    pub unit_value: i64,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub username: String,
    pub module: String,
    pub action: String,
    pub detail: String,
    #[serde(rename = "loggedAt")]
    pub logged_at: String,
}
