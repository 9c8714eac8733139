//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use ac_api::app::AppState;
use ac_core::domain::entities::{Principal, Role, Tenant, TenantGroup};
use ac_core::errors::DomainResult;
use ac_core::repositories::{InMemoryDirectory, MemoryTokenStore};
use ac_core::services::{AuthService, PermissionOracle, SystemClock, TokenService, TokenServiceConfig};
use ac_infra::BcryptPasswordVerifier;

pub const PASSWORD: &str = "correct horse battery staple";

pub type TestState = AppState<InMemoryDirectory, MemoryTokenStore>;

/// Oracle answering from a fixed set of (principal, relation, tenant) grants
pub struct StaticOracle {
    grants: HashSet<(Uuid, String, Uuid)>,
}

impl StaticOracle {
    pub fn granting(principal_id: Uuid, relation: &str, tenant_id: Uuid) -> Self {
        let mut grants = HashSet::new();
        grants.insert((principal_id, relation.to_string(), tenant_id));
        Self { grants }
    }
}

#[async_trait]
impl PermissionOracle for StaticOracle {
    async fn check(&self, principal_id: Uuid, relation: &str, tenant_id: Uuid) -> DomainResult<bool> {
        Ok(self.grants.contains(&(principal_id, relation.to_string(), tenant_id)))
    }
}

/// Two tenants: `home` (in a group) with one principal per role, and `other`
/// with a single professor.
pub struct TestContext {
    pub state: web::Data<TestState>,
    pub store: Arc<MemoryTokenStore>,
    pub group: TenantGroup,
    pub home: Tenant,
    pub other: Tenant,
    pub professor: Principal,
    pub institution: Principal,
    pub admin: Principal,
    pub outsider: Principal,
    pub disabled: Principal,
}

fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
        ..TokenServiceConfig::default()
    }
}

fn tenant(name: &str, group: Option<&TenantGroup>) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tax_id: None,
        active: true,
        group_id: group.map(|g| g.id),
    }
}

fn principal(tenant: &Tenant, username: &str, role: Role, hash: &str) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        tenant_id: tenant.id,
        username: username.to_string(),
        display_name: username.to_uppercase(),
        email: format!("{}@example.com", username),
        role,
        enabled: true,
        password_hash: hash.to_string(),
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Same fixture, with the professor granted `relation` on the home tenant
    pub fn with_grant(relation: &str) -> Self {
        Self::build(Some(relation))
    }

    fn build(grant: Option<&str>) -> Self {
        let hash = bcrypt::hash(PASSWORD, 4).expect("hash test password");

        let group = TenantGroup {
            id: Uuid::new_v4(),
            name: "Rede Sul".to_string(),
            tax_id: None,
            active: true,
        };
        let home = tenant("Colegio Central", Some(&group));
        let other = tenant("Escola Vizinha", None);

        let professor = principal(&home, "prof", Role::Professor, &hash);
        let institution = principal(&home, "inst", Role::Institution, &hash);
        let admin = principal(&home, "root", Role::Admin, &hash);
        let outsider = principal(&other, "fora", Role::Professor, &hash);
        let mut disabled = principal(&home, "off", Role::Student, &hash);
        disabled.enabled = false;

        let directory = InMemoryDirectory::new()
            .with_group(group.clone())
            .with_tenant(home.clone())
            .with_tenant(other.clone())
            .with_principal(professor.clone())
            .with_principal(institution.clone())
            .with_principal(admin.clone())
            .with_principal(outsider.clone())
            .with_principal(disabled.clone());

        let store = Arc::new(MemoryTokenStore::new());
        let mut tokens =
            TokenService::new(Arc::clone(&store), config(), Arc::new(SystemClock)).expect("valid token config");
        if let Some(relation) = grant {
            tokens = tokens.with_oracle(Arc::new(StaticOracle::granting(professor.id, relation, home.id)));
        }

        let auth = AuthService::new(
            Arc::new(directory),
            Arc::new(BcryptPasswordVerifier::new()),
            Arc::new(tokens),
        );

        Self {
            state: web::Data::new(AppState::new(Arc::new(auth))),
            store,
            group,
            home,
            other,
            professor,
            institution,
            admin,
            outsider,
            disabled,
        }
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// POST credentials to `getjwt` and return the parsed token body
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/user/getjwt")
            .set_json(serde_json::json!({ "username": $username, "password": $crate::common::PASSWORD }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200, "login as {}", $username);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body
    }};
}
