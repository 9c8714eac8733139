//! Postgres implementation of the DirectoryRepository trait.
//!
//! Reads principals from `tb_user`, tenants from `tenants` and tenant groups
//! from `tb_tenant_group`. The directory owns those tables; nothing here
//! writes to them.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use ac_core::domain::entities::{Principal, Role, Tenant, TenantGroup};
use ac_core::errors::DomainError;
use ac_core::repositories::DirectoryRepository;

use crate::InfrastructureError;

const SELECT_PRINCIPAL_BY_LOGIN: &str = "SELECT id, id_tanant, username, name_full, email, enabled, hashed_password, role_usr \
     FROM tb_user WHERE username = $1";

const SELECT_TENANT_BY_ID: &str = "SELECT id, name, cnpj, is_active, group_id FROM tenants WHERE id = $1";

const SELECT_GROUP_BY_ID: &str = "SELECT id, name, cnpj, is_active FROM tb_tenant_group WHERE id = $1";

/// Postgres-backed identity directory
pub struct PgDirectoryRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PgDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        row.try_get(name).map_err(|e| DomainError::Internal {
            message: format!("Failed to read column {}: {}", name, e),
        })
    }

    /// Map a `tb_user` row, validating the stored role once here
    fn row_to_principal(row: &PgRow) -> Result<Principal, DomainError> {
        let role_value: String = Self::column(row, "role_usr")?;
        let role = role_value.parse::<Role>().map_err(|e| DomainError::Internal {
            message: format!("Directory holds an unusable role: {}", e),
        })?;

        Ok(Principal {
            id: Self::column(row, "id")?,
            tenant_id: Self::column(row, "id_tanant")?,
            username: Self::column(row, "username")?,
            display_name: Self::column::<Option<String>>(row, "name_full")?.unwrap_or_default(),
            email: Self::column::<Option<String>>(row, "email")?.unwrap_or_default(),
            role,
            enabled: Self::column(row, "enabled")?,
            password_hash: Self::column(row, "hashed_password")?,
        })
    }

    fn row_to_tenant(row: &PgRow) -> Result<Tenant, DomainError> {
        Ok(Tenant {
            id: Self::column(row, "id")?,
            name: Self::column(row, "name")?,
            tax_id: Self::column(row, "cnpj")?,
            active: Self::column(row, "is_active")?,
            group_id: Self::column(row, "group_id")?,
        })
    }

    fn row_to_group(row: &PgRow) -> Result<TenantGroup, DomainError> {
        Ok(TenantGroup {
            id: Self::column(row, "id")?,
            name: Self::column(row, "name")?,
            tax_id: Self::column(row, "cnpj")?,
            active: Self::column(row, "is_active")?,
        })
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn resolve_principal_by_login(&self, username: &str) -> Result<Option<Principal>, DomainError> {
        let row = sqlx::query(SELECT_PRINCIPAL_BY_LOGIN)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        row.as_ref().map(Self::row_to_principal).transpose()
    }

    async fn resolve_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError> {
        let row = sqlx::query(SELECT_TENANT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    async fn resolve_tenant_group_by_id(&self, id: Uuid) -> Result<Option<TenantGroup>, DomainError> {
        let row = sqlx::query(SELECT_GROUP_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        row.as_ref().map(Self::row_to_group).transpose()
    }
}
