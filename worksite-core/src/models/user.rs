use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SiteAssignment;
use super::normalize::{first_bool, first_str};
use crate::permissions::Role;

/// Portal user with their site assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    /// Platform-wide role (`admin`), if any
    pub role: Option<Role>,
    pub active: bool,
    pub assignments: Vec<SiteAssignment>,
}

impl User {
    /// Normalize a backend user record.
    ///
    /// Precedence: email `email`, `user_email`, `username`; name `name`,
    /// `display_name`, `full_name`; role `role`, `global_role`; active
    /// `active`, `is_active` (default true); assignments from `sites` or
    /// `assignments`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let email = first_str(value, &["email", "user_email", "username"])?;

        let assignments: Vec<SiteAssignment> = ["sites", "assignments"]
            .iter()
            .find_map(|key| value.get(key)?.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| SiteAssignment::from_json(item, Some(email.as_str())))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name: first_str(value, &["name", "display_name", "full_name"]),
            role: first_str(value, &["role", "global_role"]).and_then(|r| Role::parse(&r)),
            active: first_bool(value, &["active", "is_active"]).unwrap_or(true),
            assignments,
            email,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Role at `site_id`, if assigned there
    pub fn role_at(&self, site_id: &str) -> Option<Role> {
        self.assignments
            .iter()
            .find(|a| a.site_id == site_id)
            .map(|a| a.role)
    }
}

/// Create/update payload for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Filter for user listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub site_id: Option<String>,
    pub search: Option<String>,
}

impl UserFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(role) = self.role {
            query.push(("role", role.as_str().to_string()));
        }
        if let Some(site_id) = &self.site_id {
            query.push(("site_id", site_id.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query
    }
}
