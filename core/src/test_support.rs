//! Fixtures shared by the crate's unit tests

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Principal, Role, Tenant, TenantGroup};
use crate::repositories::MemoryTokenStore;
use crate::services::token::{ManualClock, TokenService, TokenServiceConfig};

pub(crate) const SECRET: &str = "unit-test-secret-that-is-long-enough";
pub(crate) const EVENTS_CHANNEL: &str = "sessions";

pub(crate) fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: SECRET.to_string(),
        access_ttl: Duration::minutes(15),
        refresh_ttl: Duration::days(7),
        store_deadline: std::time::Duration::from_millis(500),
        check_liveness: true,
        events_channel: Some(EVENTS_CHANNEL.to_string()),
    }
}

pub(crate) fn group() -> TenantGroup {
    TenantGroup {
        id: Uuid::new_v4(),
        name: "Rede Educacional Norte".to_string(),
        tax_id: Some("11222333000181".to_string()),
        active: true,
    }
}

pub(crate) fn tenant(group: Option<&TenantGroup>) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: "Escola Municipal Central".to_string(),
        tax_id: Some("11444777000161".to_string()),
        active: true,
        group_id: group.map(|g| g.id),
    }
}

pub(crate) fn principal(tenant: &Tenant, username: &str, role: Role) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        tenant_id: tenant.id,
        username: username.to_string(),
        display_name: format!("{} (test)", username),
        email: format!("{}@example.com", username),
        role,
        enabled: true,
        password_hash: format!("plain:{}-password", username),
    }
}

/// Token service over a memory store on a manual clock
pub(crate) struct Fixture {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryTokenStore>,
    pub tokens: TokenService<MemoryTokenStore>,
    pub group: TenantGroup,
    pub tenant: Tenant,
    pub principal: Principal,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemoryTokenStore::with_clock(clock.clone()));
        let tokens = TokenService::new(store.clone(), config, clock.clone())
            .expect("valid test config");
        let group = group();
        let tenant = tenant(Some(&group));
        let principal = principal(&tenant, "ana", Role::Professor);

        Self {
            clock,
            store,
            tokens,
            group,
            tenant,
            principal,
        }
    }
}
