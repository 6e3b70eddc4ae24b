use std::sync::Arc;

use serde_json::Value;

use super::{parse_list, parse_one};
use crate::ServiceError;
use crate::http::{ApiClient, segment};
use crate::models::{Template, TemplateDraft, TemplateFilter};

const TEMPLATES_PATH: &str = "/adm/templates";

const ENVELOPE: &[&str] = &["templates", "files"];
const RECORD: &[&str] = &["template"];

pub struct TemplateService {
    client: Arc<ApiClient>,
}

impl TemplateService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Option<&TemplateFilter>) -> Result<Vec<Template>, ServiceError> {
        let query = filter.map(TemplateFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(TEMPLATES_PATH, &query, "fetch templates")
            .await?;
        Ok(parse_list(&value, ENVELOPE, Template::from_json, "template"))
    }

    pub async fn get(&self, id: &str) -> Result<Template, ServiceError> {
        let value: Value = self
            .client
            .get_json(&template_path(id), &[], "fetch template")
            .await?;
        parse_one(&value, RECORD, Template::from_json, "template")
    }

    pub async fn create(&self, draft: &TemplateDraft) -> Result<Template, ServiceError> {
        let value: Value = self
            .client
            .post_json(TEMPLATES_PATH, draft, "create template")
            .await?;
        parse_one(&value, RECORD, Template::from_json, "template")
    }

    pub async fn update(&self, id: &str, draft: &TemplateDraft) -> Result<Template, ServiceError> {
        let value: Value = self
            .client
            .put_json(&template_path(id), draft, "update template")
            .await?;
        parse_one(&value, RECORD, Template::from_json, "template")
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .delete(&template_path(id), "delete template")
            .await
    }
}

fn template_path(id: &str) -> String {
    format!("{}/{}", TEMPLATES_PATH, segment(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn list_scoped_to_folder() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            TEMPLATES_PATH,
            200,
            json!({"files": [{"id": "t1", "name": "Daily"}]}),
        );

        let templates = TemplateService::new(client)
            .list(Some(&TemplateFilter::in_folder("root-9")))
            .await
            .unwrap();
        assert_eq!(templates[0].name, "Daily");

        let call = mock.last_call_to(Method::GET, TEMPLATES_PATH).unwrap();
        assert_eq!(call.query_param("folderId").as_deref(), Some("root-9"));
    }

    #[tokio::test]
    async fn create_returns_normalized_record() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::POST,
            TEMPLATES_PATH,
            201,
            json!({"template": {"templateId": "t2", "title": "Weekly"}}),
        );

        let draft = TemplateDraft {
            name: "Weekly".to_string(),
            description: None,
            folder_id: None,
            content: Some(json!({"fields": []})),
        };
        let template = TemplateService::new(client).create(&draft).await.unwrap();
        assert_eq!(template.id, "t2");
    }

    #[tokio::test]
    async fn malformed_record_is_decode_error() {
        let (mock, client) = test_support::client();
        mock.respond(Method::GET, "/adm/templates/t9", 200, json!({"ok": true}));

        let err = TemplateService::new(client).get("t9").await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }
}
