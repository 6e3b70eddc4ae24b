//! Tests against a running worksite backend over real HTTP
//!
//! Gated behind the `integration` feature and configured through
//! `WORKSITE_TEST_BASE_URL` and `WORKSITE_TEST_TOKEN`. Run with:
//!
//! ```sh
//! cargo test -p worksite-core --features integration
//! ```

#![cfg(feature = "integration")]

use std::sync::Arc;

use worksite_core::auth::{LogNavigator, StaticRoleProvider};
use worksite_core::{MemoryStore, ReqwestTransport, Worksite, WorksiteConfig};

fn live_worksite() -> Worksite {
    let mut config = WorksiteConfig::default();
    if let Ok(base_url) = std::env::var("WORKSITE_TEST_BASE_URL") {
        config.api.base_url = base_url;
    }

    let worksite = Worksite::with_parts(
        &config,
        Arc::new(ReqwestTransport::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(LogNavigator::new("/")),
        Arc::new(StaticRoleProvider::unavailable()),
    )
    .expect("Failed to wire worksite");

    if let Ok(token) = std::env::var("WORKSITE_TEST_TOKEN") {
        worksite.state().set_token(&token).expect("Failed to store token");
    }
    worksite
}

#[tokio::test]
async fn token_status_matches_listing_access() {
    let worksite = live_worksite();
    let authenticated = worksite.auth.check_auth_status().await;

    let result = worksite.sites.list(None).await;
    if authenticated {
        assert!(result.is_ok(), "listing failed: {:?}", result.err());
    } else {
        assert!(result.is_err());
    }
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let mut config = WorksiteConfig::default();
    config.api.base_url = "http://127.0.0.1:9".to_string();

    let worksite = Worksite::with_parts(
        &config,
        Arc::new(ReqwestTransport::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(LogNavigator::new("/")),
        Arc::new(StaticRoleProvider::unavailable()),
    )
    .expect("Failed to wire worksite");

    let err = worksite.templates.list(None).await.unwrap_err();
    assert!(matches!(err, worksite_core::ServiceError::Network(_)));
}
