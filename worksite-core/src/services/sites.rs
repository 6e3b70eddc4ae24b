use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use super::{parse_list, parse_one};
use crate::ServiceError;
use crate::http::{ApiClient, segment};
use crate::models::{Site, SiteDraft, SiteFilter, derive_site_id, first_str, record};

const SITES_PATH: &str = "/adm/sites";

/// Sites assigned to the signed-in user, with their role at each
pub const MY_SITES_PATH: &str = "/adm/users/me/sites";

const ENVELOPE: &[&str] = &["sites"];
const RECORD: &[&str] = &["site"];

/// Fill in a blank `site_id` from the name and the given time
pub fn prepare_site_draft(mut draft: SiteDraft, timestamp_millis: i64) -> SiteDraft {
    if draft.site_id.trim().is_empty() {
        draft.site_id = derive_site_id(&draft.name, timestamp_millis);
        debug!("Derived site id {} for {:?}", draft.site_id, draft.name);
    }
    draft
}

pub struct SiteService {
    client: Arc<ApiClient>,
}

impl SiteService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Option<&SiteFilter>) -> Result<Vec<Site>, ServiceError> {
        let query = filter.map(SiteFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(SITES_PATH, &query, "fetch sites")
            .await?;
        Ok(parse_list(&value, ENVELOPE, Site::from_json, "site"))
    }

    /// Sites the caller is assigned to, each carrying `user_role`
    pub async fn my_sites(&self) -> Result<Vec<Site>, ServiceError> {
        let value: Value = self
            .client
            .get_json(MY_SITES_PATH, &[], "fetch assigned sites")
            .await?;
        Ok(parse_list(&value, ENVELOPE, Site::from_json, "site"))
    }

    pub async fn get(&self, site_id: &str) -> Result<Site, ServiceError> {
        let value: Value = self
            .client
            .get_json(&site_path(site_id), &[], "fetch site")
            .await?;
        parse_one(&value, RECORD, Site::from_json, "site")
    }

    /// Create a site. A blank `site_id` is derived from the name; the id the
    /// server returns, if any, replaces it.
    pub async fn create(&self, draft: SiteDraft) -> Result<Site, ServiceError> {
        let draft = prepare_site_draft(draft, Utc::now().timestamp_millis());
        let value: Value = self
            .client
            .post_json(SITES_PATH, &draft, "create site")
            .await?;
        let site = written_site(&value, &draft);
        info!("Created site {}", site.id);
        Ok(site)
    }

    pub async fn update(&self, site_id: &str, draft: SiteDraft) -> Result<Site, ServiceError> {
        let mut draft = draft;
        draft.site_id = site_id.to_string();
        let value: Value = self
            .client
            .put_json(&site_path(site_id), &draft, "update site")
            .await?;
        Ok(written_site(&value, &draft))
    }

    pub async fn delete(&self, site_id: &str) -> Result<(), ServiceError> {
        self.client
            .delete(&site_path(site_id), "delete site")
            .await?;
        info!("Deleted site {}", site_id);
        Ok(())
    }
}

fn site_path(site_id: &str) -> String {
    format!("{}/{}", SITES_PATH, segment(site_id))
}

/// Site after a write: the server's record when it sent one, else the draft
/// under whatever id the server acknowledged.
fn written_site(value: &Value, draft: &SiteDraft) -> Site {
    let body = record(value, RECORD);
    let from_draft = |id: String| Site {
        id,
        name: draft.name.clone(),
        location: draft.location.clone(),
        folder_link: draft.folder_link.clone(),
        folder_type: draft.folder_type,
        user_role: None,
    };

    match Site::from_json(body) {
        Some(site) if first_str(body, &["name", "site_name", "siteName"]).is_some() => site,
        Some(ack) => from_draft(ack.id),
        None => from_draft(draft.site_id.clone()),
    }
}
