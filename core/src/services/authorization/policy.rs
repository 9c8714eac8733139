//! Access policies and the session context a passed check yields.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Claims, Role};
use crate::errors::{AuthError, DomainError};

/// What a protected operation demands of the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// `None` admits every role
    allowed_roles: Option<Vec<Role>>,
    /// Relation the permission oracle must grant on the caller's tenant
    relation: Option<String>,
}

impl AccessPolicy {
    /// Any authenticated access token
    pub fn any() -> Self {
        Self::default()
    }

    /// Only callers holding one of `roles`
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            allowed_roles: Some(roles.to_vec()),
            relation: None,
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn permits(&self, role: Role) -> bool {
        match &self.allowed_roles {
            Some(roles) => roles.contains(&role),
            None => true,
        }
    }

    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }
}

/// Tenant every data access of the request is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantScope {
    tenant_id: Uuid,
}

impl TenantScope {
    pub fn new(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    /// Fails unless `tenant_id` is the bound tenant
    pub fn ensure(&self, tenant_id: Uuid) -> Result<(), DomainError> {
        if tenant_id == self.tenant_id {
            Ok(())
        } else {
            Err(AuthError::TenantForbidden {
                tenant_id: tenant_id.to_string(),
            }
            .into())
        }
    }
}

/// Caller identity established by the authorization gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    claims: Claims,
}

impl SessionContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn principal_id(&self) -> Uuid {
        self.claims.user_id
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn token_id(&self) -> &str {
        &self.claims.token_id
    }

    pub fn tenant(&self) -> TenantScope {
        TenantScope::new(self.claims.tenant_id)
    }

    /// Admins act across tenants; everyone else only inside their own
    pub fn ensure_tenant_access(&self, tenant_id: Uuid) -> Result<(), DomainError> {
        if self.claims.role == Role::Admin {
            return Ok(());
        }
        self.tenant().ensure(tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_roles() {
        assert!(AccessPolicy::any().permits(Role::Student));

        let policy = AccessPolicy::roles(&[Role::Admin, Role::Institution]);
        assert!(policy.permits(Role::Admin));
        assert!(policy.permits(Role::Institution));
        assert!(!policy.permits(Role::Professor));
        assert_eq!(policy.relation(), None);

        let policy = policy.with_relation("can_manage_sessions");
        assert_eq!(policy.relation(), Some("can_manage_sessions"));
    }

    #[test]
    fn test_tenant_scope() {
        let tenant_id = Uuid::new_v4();
        let scope = TenantScope::new(tenant_id);

        assert!(scope.ensure(tenant_id).is_ok());
        assert!(matches!(
            scope.ensure(Uuid::new_v4()),
            Err(DomainError::Auth(AuthError::TenantForbidden { .. }))
        ));
    }
}
