//! Dashboard aggregates degrade per branch

mod common;

use http::Method;
use serde_json::json;
use worksite_core::services::OverviewStats;

use common::harness;

#[tokio::test]
async fn both_fetches_failing_yields_zeroes() {
    let h = harness(&["admin"]);
    h.mock.fail(Method::GET, "/adm/sites", "offline");
    h.mock.respond(Method::GET, "/adm/users", 503, json!({"error": "maintenance"}));

    let stats = h.worksite.analytics.overview().await;
    assert_eq!(stats, OverviewStats::default());
    assert_eq!(
        serde_json::to_value(stats).unwrap(),
        json!({"totalSites": 0, "totalUsers": 0})
    );
}

#[tokio::test]
async fn both_lists_are_requested() {
    let h = harness(&["admin"]);
    h.mock.respond(Method::GET, "/adm/sites", 200, json!({"data": [{"id": "a"}]}));
    h.mock.respond(Method::GET, "/adm/users", 200, json!([]));

    let stats = h.worksite.analytics.overview().await;
    assert_eq!(stats.total_sites, 1);
    assert_eq!(stats.total_users, 0);
    assert_eq!(h.mock.call_count(), 2);
}

#[tokio::test]
async fn expired_token_in_both_branches_redirects_once() {
    let h = harness(&["admin"]);
    h.worksite.state().set_token("expired").unwrap();
    h.mock.respond(Method::GET, "/adm/sites", 401, json!({"error": "expired"}));
    h.mock.respond(Method::GET, "/adm/users", 401, json!({"error": "expired"}));

    let stats = h.worksite.analytics.overview().await;

    assert_eq!(stats, OverviewStats::default());
    assert!(!h.worksite.state().has_token());
    assert_eq!(h.navigator.history().len(), 1);
}
