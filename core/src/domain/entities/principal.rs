//! Principal entity: an authenticated actor and its role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of roles a principal can hold.
///
/// Wire values keep the names stored in the directory database; the English
/// names are accepted as aliases on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Professor")]
    Professor,
    #[serde(rename = "Estudante", alias = "Student")]
    Student,
    #[serde(rename = "Instituicao", alias = "Institution")]
    Institution,
    #[serde(rename = "Admin")]
    Admin,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 4] = [Role::Professor, Role::Student, Role::Institution, Role::Admin];

    /// Canonical wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Professor => "Professor",
            Role::Student => "Estudante",
            Role::Institution => "Instituicao",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Professor" => Ok(Role::Professor),
            "Estudante" | "Student" => Ok(Role::Student),
            "Instituicao" | "Institution" => Ok(Role::Institution),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Authenticated actor as read from the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,

    /// Tenant the principal belongs to
    pub tenant_id: Uuid,

    /// Login handle
    pub username: String,

    pub display_name: String,

    pub email: String,

    pub role: Role,

    pub enabled: bool,

    /// One-way credential hash, never serialized
    pub password_hash: String,
}

impl Principal {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
