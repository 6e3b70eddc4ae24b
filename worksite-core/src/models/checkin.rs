use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_datetime, first_str};

/// Worker check-in at a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub site_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

impl CheckIn {
    pub fn from_json(value: &Value) -> Option<Self> {
        Some(Self {
            id: first_str(value, &["id", "_id", "checkin_id"])?,
            site_id: first_str(value, &["site_id", "siteId"])?,
            user_email: first_str(value, &["user_email", "email", "userEmail"])?,
            user_name: first_str(value, &["user_name", "name"]),
            checked_in_at: first_datetime(value, &["checked_in_at", "check_in_time", "timestamp"]),
            checked_out_at: first_datetime(value, &["checked_out_at", "check_out_time"]),
        })
    }

    /// Still on site
    pub fn is_open(&self) -> bool {
        self.checked_out_at.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInFilter {
    pub site_id: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CheckInFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(site_id) = &self.site_id {
            query.push(("site_id", site_id.clone()));
        }
        if let Some(date) = self.date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        query
    }
}
