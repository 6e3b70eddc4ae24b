//! Sites and site assignments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_datetime, first_str};
use crate::permissions::Role;

/// Where a site's documents live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderType {
    #[serde(rename = "google_drive")]
    GoogleDrive,
    #[serde(rename = "onedrive")]
    OneDrive,
    #[serde(rename = "dropbox")]
    Dropbox,
    #[serde(rename = "sharepoint")]
    SharePoint,
    #[serde(rename = "nas")]
    Nas,
    #[default]
    #[serde(rename = "other")]
    Other,
}

impl FolderType {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::GoogleDrive => "google_drive",
            FolderType::OneDrive => "onedrive",
            FolderType::Dropbox => "dropbox",
            FolderType::SharePoint => "sharepoint",
            FolderType::Nas => "nas",
            FolderType::Other => "other",
        }
    }

    /// Lenient parse: `Google Drive`, `google_drive`, `gdrive` all match
    pub fn parse(s: &str) -> Self {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "googledrive" | "google" | "gdrive" | "drive" => FolderType::GoogleDrive,
            "onedrive" => FolderType::OneDrive,
            "dropbox" => FolderType::Dropbox,
            "sharepoint" => FolderType::SharePoint,
            "nas" | "smb" | "networkshare" => FolderType::Nas,
            _ => FolderType::Other,
        }
    }

    /// Guess the storage provider from a folder link
    pub fn infer_from_link(link: &str) -> Self {
        let lower = link.to_ascii_lowercase();
        if lower.contains("drive.google.com") {
            FolderType::GoogleDrive
        } else if lower.contains("onedrive.live.com") || lower.contains("1drv.ms") {
            FolderType::OneDrive
        } else if lower.contains("dropbox.com") {
            FolderType::Dropbox
        } else if lower.contains("sharepoint.com") {
            FolderType::SharePoint
        } else if lower.starts_with("\\\\") || lower.starts_with("smb://") {
            FolderType::Nas
        } else {
            FolderType::Other
        }
    }
}

/// A construction site as the client sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub folder_link: Option<String>,
    pub folder_type: FolderType,
    /// Caller's role at this site, when the listing includes it
    pub user_role: Option<Role>,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            folder_link: None,
            folder_type: FolderType::Other,
            user_role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.user_role = Some(role);
        self
    }

    /// Normalize a backend site record.
    ///
    /// Precedence per field:
    /// - id: `site_id`, `siteId`, `id`, `_id`
    /// - name: `name`, `site_name`, `siteName` (falls back to the id)
    /// - location: `location`, `address`
    /// - folder link: `folder_link`, `folderLink`, `drive_folder_link`, `folder_url`
    /// - folder type: `folder_type`, `folderType`, else inferred from the link
    /// - role: `user_role`, `userRole`, `role`
    ///
    /// Records without any id are rejected.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = first_str(value, &["site_id", "siteId", "id", "_id"])?;
        let name = first_str(value, &["name", "site_name", "siteName"]).unwrap_or_else(|| id.clone());
        let folder_link = first_str(
            value,
            &["folder_link", "folderLink", "drive_folder_link", "folder_url"],
        );
        let folder_type = match first_str(value, &["folder_type", "folderType"]) {
            Some(t) => FolderType::parse(&t),
            None => folder_link
                .as_deref()
                .map(FolderType::infer_from_link)
                .unwrap_or_default(),
        };
        let user_role = first_str(value, &["user_role", "userRole", "role"])
            .and_then(|r| Role::parse(&r));

        Some(Self {
            id,
            name,
            location: first_str(value, &["location", "address"]),
            folder_link,
            folder_type,
            user_role,
        })
    }
}

/// Create/update payload for a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDraft {
    /// Blank means "derive from the name"
    #[serde(default)]
    pub site_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_link: Option<String>,
    #[serde(default)]
    pub folder_type: FolderType,
}

impl SiteDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            site_id: String::new(),
            name: name.into(),
            location: None,
            folder_link: None,
            folder_type: FolderType::Other,
        }
    }
}

/// Display slug for a site with no explicit id: `plant_7_<millis>`.
///
/// Lowercased, runs of non-alphanumerics become `_`. The server may replace it.
pub fn derive_site_id(name: &str, timestamp_millis: i64) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    let slug = if slug.is_empty() { "site" } else { slug };
    format!("{}_{}", slug, timestamp_millis)
}

/// Binding of a user to a site with a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAssignment {
    pub site_id: String,
    pub user_email: String,
    pub role: Role,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl SiteAssignment {
    /// Normalize an assignment record. `fallback_email` fills in when the
    /// record is nested under a user and omits the email.
    ///
    /// Precedence: site `site_id`, `siteId`, `site`; email `user_email`,
    /// `userEmail`, `email`; role `role`, `user_role`; time `assigned_at`,
    /// `assignedAt`, `created_at`.
    pub fn from_json(value: &Value, fallback_email: Option<&str>) -> Option<Self> {
        let site_id = first_str(value, &["site_id", "siteId", "site"])?;
        let user_email = first_str(value, &["user_email", "userEmail", "email"])
            .or_else(|| fallback_email.map(str::to_string))?;
        let role = first_str(value, &["role", "user_role"]).and_then(|r| Role::parse(&r))?;

        Some(Self {
            site_id,
            user_email,
            role,
            assigned_at: first_datetime(value, &["assigned_at", "assignedAt", "created_at"]),
        })
    }
}

/// Filter for site listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFilter {
    pub search: Option<String>,
    pub folder_type: Option<FolderType>,
}

impl SiteFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(folder_type) = self.folder_type {
            query.push(("folder_type", folder_type.as_str().to_string()));
        }
        query
    }
}
