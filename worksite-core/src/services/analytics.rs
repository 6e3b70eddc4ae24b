use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{SiteService, UserService};
use crate::http::ApiClient;
use crate::policy::FailurePolicy;

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_sites: usize,
    pub total_users: usize,
}

/// Aggregate reads for the dashboard
pub struct AnalyticsService {
    sites: SiteService,
    users: UserService,
}

impl AnalyticsService {
    /// Each branch of the overview degrades to zero on its own
    pub const POLICY: FailurePolicy = FailurePolicy::FailEmpty;

    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            sites: SiteService::new(client.clone()),
            users: UserService::new(client),
        }
    }

    /// Site and user totals, fetched concurrently. Never fails.
    pub async fn overview(&self) -> OverviewStats {
        let (sites, users) = tokio::join!(self.sites.list(None), self.users.list(None));

        OverviewStats {
            total_sites: Self::POLICY.settle("count sites", sites).len(),
            total_users: Self::POLICY.settle("count users", users).len(),
        }
    }
}
