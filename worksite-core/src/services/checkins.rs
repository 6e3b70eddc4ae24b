use std::sync::Arc;

use serde_json::Value;

use super::parse_list;
use crate::ServiceError;
use crate::http::ApiClient;
use crate::models::{CheckIn, CheckInFilter};

const CHECKINS_PATH: &str = "/adm/checkins";

/// Read-only view of worker check-ins
pub struct CheckInService {
    client: Arc<ApiClient>,
}

impl CheckInService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Option<&CheckInFilter>) -> Result<Vec<CheckIn>, ServiceError> {
        let query = filter.map(CheckInFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(CHECKINS_PATH, &query, "fetch check-ins")
            .await?;
        Ok(parse_list(&value, &["checkins"], CheckIn::from_json, "check-in"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn lists_checkins_for_site() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            CHECKINS_PATH,
            200,
            json!({"checkins": [
                {"id": "c1", "site_id": "a", "email": "jo@example.com"},
                {"id": "c2", "site_id": "a", "email": "al@example.com",
                 "check_out_time": "2026-05-04T16:00:00Z"}
            ]}),
        );

        let filter = CheckInFilter {
            site_id: Some("a".to_string()),
            date: None,
        };
        let checkins = CheckInService::new(client).list(Some(&filter)).await.unwrap();
        assert_eq!(checkins.iter().filter(|c| c.is_open()).count(), 1);

        let call = mock.last_call_to(Method::GET, CHECKINS_PATH).unwrap();
        assert_eq!(call.query_param("site_id").as_deref(), Some("a"));
    }
}
