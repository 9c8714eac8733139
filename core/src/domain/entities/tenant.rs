//! Tenant and tenant group entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organization that owns principals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,

    /// National tax id
    pub tax_id: Option<String>,

    pub active: bool,

    /// Group this tenant belongs to, if any
    pub group_id: Option<Uuid>,
}

/// Group of tenants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantGroup {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub active: bool,
}
