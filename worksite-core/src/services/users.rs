use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;

use super::{parse_list, parse_one};
use crate::ServiceError;
use crate::http::{ApiClient, segment};
use crate::models::{SiteAssignment, User, UserDraft, UserFilter, record};
use crate::permissions::Role;

const USERS_PATH: &str = "/adm/users";

const ENVELOPE: &[&str] = &["users"];
const RECORD: &[&str] = &["user"];

/// User accounts and their site assignments
pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Option<&UserFilter>) -> Result<Vec<User>, ServiceError> {
        let query = filter.map(UserFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(USERS_PATH, &query, "fetch users")
            .await?;
        Ok(parse_list(&value, ENVELOPE, User::from_json, "user"))
    }

    pub async fn create(&self, draft: UserDraft) -> Result<User, ServiceError> {
        let value: Value = self
            .client
            .post_json(USERS_PATH, &draft, "create user")
            .await?;
        info!("Created user {}", draft.email);
        Ok(written_user(&value, &draft))
    }

    pub async fn update(&self, email: &str, draft: UserDraft) -> Result<User, ServiceError> {
        let value: Value = self
            .client
            .put_json(&user_path(email), &draft, "update user")
            .await?;
        Ok(written_user(&value, &draft))
    }

    pub async fn delete(&self, email: &str) -> Result<(), ServiceError> {
        self.client.delete(&user_path(email), "delete user").await?;
        info!("Deleted user {}", email);
        Ok(())
    }

    /// Give `email` a role at `site_id`
    pub async fn assign(
        &self,
        site_id: &str,
        email: &str,
        role: Role,
    ) -> Result<SiteAssignment, ServiceError> {
        let body = json!({"user_email": email, "role": role.as_str()});
        let value: Value = self
            .client
            .post_json(&assignments_path(site_id), &body, "assign user")
            .await?;

        let assignment = SiteAssignment::from_json(record(&value, &["assignment"]), Some(email))
            .filter(|a| a.site_id == site_id)
            .unwrap_or_else(|| SiteAssignment {
                site_id: site_id.to_string(),
                user_email: email.to_string(),
                role,
                assigned_at: Some(Utc::now()),
            });
        info!("Assigned {} as {} at {}", email, role, site_id);
        Ok(assignment)
    }

    pub async fn unassign(&self, site_id: &str, email: &str) -> Result<(), ServiceError> {
        let path = format!("{}/{}", assignments_path(site_id), segment(email));
        self.client.delete(&path, "remove assignment").await?;
        info!("Removed {} from {}", email, site_id);
        Ok(())
    }
}

fn user_path(email: &str) -> String {
    format!("{}/{}", USERS_PATH, segment(email))
}

fn assignments_path(site_id: &str) -> String {
    format!("/adm/sites/{}/assignments", segment(site_id))
}

fn written_user(value: &Value, draft: &UserDraft) -> User {
    parse_one(value, RECORD, User::from_json, "user").unwrap_or_else(|_| User {
        email: draft.email.clone(),
        name: draft.name.clone(),
        role: draft.role,
        active: true,
        assignments: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use http::Method;

    #[tokio::test]
    async fn list_filters_by_site() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            USERS_PATH,
            200,
            json!({"users": [{"email": "jo@example.com", "sites": [{"site_id": "a", "role": "viewer"}]}]}),
        );

        let filter = UserFilter {
            site_id: Some("a".to_string()),
            ..Default::default()
        };
        let users = UserService::new(client).list(Some(&filter)).await.unwrap();
        assert_eq!(users[0].role_at("a"), Some(Role::Viewer));

        let call = mock.last_call_to(Method::GET, USERS_PATH).unwrap();
        assert_eq!(call.query_param("site_id").as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn update_addresses_user_by_escaped_email() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::PUT,
            "/adm/users/jo%40example.com",
            200,
            json!({"success": true}),
        );

        let draft = UserDraft {
            email: "jo@example.com".to_string(),
            name: Some("Jo".to_string()),
            role: None,
        };
        let user = UserService::new(client)
            .update("jo@example.com", draft)
            .await
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Jo"));
    }

    #[tokio::test]
    async fn assign_posts_role_name() {
        let (mock, client) = test_support::client();
        mock.respond(Method::POST, "/adm/sites/a/assignments", 201, json!({}));

        let assignment = UserService::new(client)
            .assign("a", "jo@example.com", Role::SiteManager)
            .await
            .unwrap();
        assert_eq!(assignment.role, Role::SiteManager);

        let call = mock
            .last_call_to(Method::POST, "/adm/sites/a/assignments")
            .unwrap();
        assert_eq!(call.json_body().unwrap()["role"], "site_manager");
    }

    #[tokio::test]
    async fn unassign_deletes_assignment() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::DELETE,
            "/adm/sites/a/assignments/jo%40example.com",
            204,
            Value::Null,
        );

        UserService::new(client)
            .unassign("a", "jo@example.com")
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 1);
    }
}
