//! Shared harness for worksite-core integration tests

use std::sync::Arc;

use worksite_core::auth::{LogNavigator, PlatformUser, StaticRoleProvider};
use worksite_core::{MemoryStore, MockTransport, RoleProvider, Worksite, WorksiteConfig};

pub const BASE_URL: &str = "http://worksite.test";

#[allow(dead_code)]
pub struct Harness {
    pub mock: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<LogNavigator>,
    pub worksite: Worksite,
}

/// Worksite over a mock backend, signed in to the platform with `roles`
#[allow(dead_code)]
pub fn harness(roles: &[&str]) -> Harness {
    let mut user = PlatformUser::new("jo");
    for role in roles {
        user = user.with_role(*role);
    }
    harness_with_provider(Arc::new(StaticRoleProvider::new(user)))
}

/// Worksite whose platform context lookup always fails
#[allow(dead_code)]
pub fn harness_without_platform() -> Harness {
    harness_with_provider(Arc::new(StaticRoleProvider::unavailable()))
}

#[allow(dead_code)]
pub fn harness_on_store(roles: &[&str], store: Arc<MemoryStore>) -> Harness {
    let mut user = PlatformUser::new("jo");
    for role in roles {
        user = user.with_role(*role);
    }
    build(Arc::new(StaticRoleProvider::new(user)), store)
}

fn harness_with_provider(roles: Arc<dyn RoleProvider>) -> Harness {
    build(roles, Arc::new(MemoryStore::new()))
}

fn build(roles: Arc<dyn RoleProvider>, store: Arc<MemoryStore>) -> Harness {
    let mock = Arc::new(MockTransport::new());
    let navigator = Arc::new(LogNavigator::new("/dashboard"));

    let mut config = WorksiteConfig::default();
    config.api.base_url = BASE_URL.to_string();

    let worksite = Worksite::with_parts(
        &config,
        mock.clone(),
        store.clone(),
        navigator.clone(),
        roles,
    )
    .expect("harness wiring");

    Harness {
        mock,
        store,
        navigator,
        worksite,
    }
}
