use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_datetime, first_str, first_str_list, first_u64};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// File or folder descriptor returned by the drive endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub web_view_link: Option<String>,
    pub parents: Vec<String>,
    pub modified_time: Option<DateTime<Utc>>,
}

impl DriveFile {
    /// Precedence: id `id`, `fileId`, `file_id`; name `name`, `title`;
    /// mime `mimeType`, `mime_type`; link `webViewLink`, `web_view_link`,
    /// `link`; time `modifiedTime`, `modified_time`, `updated_at`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = first_str(value, &["id", "fileId", "file_id"])?;
        Some(Self {
            name: first_str(value, &["name", "title"]).unwrap_or_else(|| id.clone()),
            mime_type: first_str(value, &["mimeType", "mime_type"]),
            size: first_u64(value, &["size"]),
            web_view_link: first_str(value, &["webViewLink", "web_view_link", "link"]),
            parents: first_str_list(value, &["parents"]),
            modified_time: first_datetime(value, &["modifiedTime", "modified_time", "updated_at"]),
            id,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

/// Filter for file listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub folder_id: Option<String>,
    pub query: Option<String>,
}

impl FileFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(folder_id) = &self.folder_id {
            query.push(("folderId", folder_id.clone()));
        }
        if let Some(q) = &self.query {
            query.push(("q", q.clone()));
        }
        query
    }
}

/// Metadata changes for an existing file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Replacement text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Sharing grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub email: String,
    /// `reader`, `commenter` or `writer`
    pub role: String,
}
