use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use super::{parse_list, parse_one};
use crate::ServiceError;
use crate::http::{ApiClient, segment};
use crate::models::{Document, DocumentDraft, DocumentFilter, DocumentStatus};

const DOCUMENTS_PATH: &str = "/adm/documents";

const ENVELOPE: &[&str] = &["documents"];
const RECORD: &[&str] = &["document"];

/// Submitted documents and their review state
pub struct DocumentService {
    client: Arc<ApiClient>,
}

impl DocumentService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Option<&DocumentFilter>) -> Result<Vec<Document>, ServiceError> {
        let query = filter.map(DocumentFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(DOCUMENTS_PATH, &query, "fetch documents")
            .await?;
        Ok(parse_list(&value, ENVELOPE, Document::from_json, "document"))
    }

    pub async fn create(&self, draft: &DocumentDraft) -> Result<Document, ServiceError> {
        let value: Value = self
            .client
            .post_json(DOCUMENTS_PATH, draft, "create document")
            .await?;
        parse_one(&value, RECORD, Document::from_json, "document")
    }

    /// Move a document through review; `comment` accompanies rejections
    pub async fn update_status(
        &self,
        id: &str,
        status: DocumentStatus,
        comment: Option<&str>,
    ) -> Result<Document, ServiceError> {
        let mut body = json!({"status": status.as_str()});
        if let Some(comment) = comment {
            body["comment"] = Value::String(comment.to_string());
        }

        let path = format!("{}/{}/status", DOCUMENTS_PATH, segment(id));
        let value: Value = self
            .client
            .put_json(&path, &body, "update document status")
            .await?;
        info!("Document {} is now {}", id, status);

        Ok(parse_one(&value, RECORD, Document::from_json, "document").unwrap_or_else(|_| {
            Document {
                id: id.to_string(),
                name: id.to_string(),
                doc_type: None,
                status,
                site_id: None,
                file_id: None,
                submitted_by: None,
                created_at: None,
            }
        }))
    }
}
