use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_datetime, first_str};

/// Inspection/report template stored in a Drive folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub folder_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    /// Precedence: id `id`, `template_id`, `templateId`, `fileId`; name
    /// `name`, `title`; folder `folder_id`, `folderId`, `parent_id`; time
    /// `updated_at`, `modifiedTime`, `created_at`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = first_str(value, &["id", "template_id", "templateId", "fileId"])?;
        Some(Self {
            name: first_str(value, &["name", "title"]).unwrap_or_else(|| id.clone()),
            description: first_str(value, &["description", "summary"]),
            folder_id: first_str(value, &["folder_id", "folderId", "parent_id"]),
            updated_at: first_datetime(value, &["updated_at", "modifiedTime", "created_at"]),
            id,
        })
    }
}

/// Create/update payload for a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "folderId", default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Form definition, opaque to the client layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// Filter for template listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub folder_id: Option<String>,
}

impl TemplateFilter {
    pub fn in_folder(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: Some(folder_id.into()),
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        self.folder_id
            .iter()
            .map(|id| ("folderId", id.clone()))
            .collect()
    }
}
