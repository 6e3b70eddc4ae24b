use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_datetime, first_str};

/// Review state of a submitted document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Archived => "archived",
        }
    }

    /// `submitted` and `in_review` are treated as pending
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(DocumentStatus::Draft),
            "pending" | "submitted" | "in_review" => Some(DocumentStatus::Pending),
            "approved" => Some(DocumentStatus::Approved),
            "rejected" => Some(DocumentStatus::Rejected),
            "archived" => Some(DocumentStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document record (inspection report, permit, drawing, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub doc_type: Option<String>,
    pub status: DocumentStatus,
    pub site_id: Option<String>,
    pub file_id: Option<String>,
    pub submitted_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Precedence: id `id`, `document_id`, `_id`; name `name`, `title`,
    /// `file_name`; type `type`, `doc_type`, `document_type`; site
    /// `site_id`, `siteId`; file `file_id`, `fileId`, `drive_file_id`;
    /// submitter `submitted_by`, `created_by`, `user_email`. Unknown
    /// statuses read as pending.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = first_str(value, &["id", "document_id", "_id"])?;
        Some(Self {
            name: first_str(value, &["name", "title", "file_name"]).unwrap_or_else(|| id.clone()),
            doc_type: first_str(value, &["type", "doc_type", "document_type"]),
            status: first_str(value, &["status"])
                .and_then(|s| DocumentStatus::parse(&s))
                .unwrap_or_default(),
            site_id: first_str(value, &["site_id", "siteId"]),
            file_id: first_str(value, &["file_id", "fileId", "drive_file_id"]),
            submitted_by: first_str(value, &["submitted_by", "created_by", "user_email"]),
            created_at: first_datetime(value, &["created_at", "createdAt", "submitted_at"]),
            id,
        })
    }
}

/// Filter for document listings; `None` fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub doc_type: Option<String>,
    pub site_id: Option<String>,
}

impl DocumentFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(doc_type) = &self.doc_type {
            query.push(("type", doc_type.clone()));
        }
        if let Some(site_id) = &self.site_id {
            query.push(("site_id", site_id.clone()));
        }
        query
    }
}

/// Create payload for a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub site_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Form answers for inspection reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_document() {
        let value = json!({
            "document_id": "d1",
            "title": "Scaffold check",
            "type": "inspection",
            "status": "submitted",
            "siteId": "siteA"
        });
        let doc = Document::from_json(&value).unwrap();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.doc_type.as_deref(), Some("inspection"));
        assert_eq!(doc.site_id.as_deref(), Some("siteA"));
    }

    #[test]
    fn unknown_status_reads_as_pending() {
        let doc = Document::from_json(&json!({"id": "d1", "status": "lost"})).unwrap();
        assert_eq!(doc.status, DocumentStatus::Pending);
    }

    #[test]
    fn filter_sends_only_set_fields() {
        assert!(DocumentFilter::default().to_query().is_empty());

        let filter = DocumentFilter {
            status: Some(DocumentStatus::Approved),
            doc_type: None,
            site_id: Some("siteA".to_string()),
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("status", "approved".to_string()),
                ("site_id", "siteA".to_string())
            ]
        );
    }
}
