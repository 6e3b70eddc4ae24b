//! One service per backend resource
//!
//! Every service shares the same [`ApiClient`](crate::http::ApiClient):
//! bearer token attached per call, non-2xx mapped to [`ServiceError`],
//! 401 handled centrally. Responses are normalized into `crate::models`.

mod analytics;
mod checkins;
mod documents;
mod drive;
mod notifications;
mod sites;
mod system;
mod templates;
mod users;

pub use analytics::{AnalyticsService, OverviewStats};
pub use checkins::CheckInService;
pub use documents::DocumentService;
pub use drive::{DriveService, NewFile};
pub use notifications::NotificationService;
pub use sites::{MY_SITES_PATH, SiteService, prepare_site_draft};
pub use system::{RootFolder, RootFolderSetting, SystemService};
pub use templates::TemplateService;
pub use users::UserService;

use serde_json::Value;
use tracing::debug;

use crate::ServiceError;
use crate::models::{list_items, record};

/// Normalize every record of a list response, skipping unusable ones
pub(crate) fn parse_list<T>(
    value: &Value,
    envelope: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
    what: &str,
) -> Vec<T> {
    let items = list_items(value, envelope);
    let parsed: Vec<T> = items.iter().filter_map(&parse).collect();
    if parsed.len() != items.len() {
        debug!(
            "Skipped {} malformed {} records",
            items.len() - parsed.len(),
            what
        );
    }
    parsed
}

/// Normalize a single-record response
pub(crate) fn parse_one<T>(
    value: &Value,
    envelope: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
    what: &str,
) -> Result<T, ServiceError> {
    parse(record(value, envelope))
        .ok_or_else(|| ServiceError::Decode(format!("malformed {} record", what)))
}
