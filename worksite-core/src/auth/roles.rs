//! Platform identity: who the hosting platform says the user is

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::ServiceError;
use crate::http::{ApiRequest, Transport, decode};

/// Current-context endpoint on the hosting platform
pub const CURRENT_CONTEXT_PATH: &str = "/services/authentication/current-context";

/// User as reported by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl PlatformUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Case-insensitive role membership
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

/// Source of the current user's platform roles.
///
/// Swappable so permission logic can be tested without the platform.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    async fn current_user(&self) -> Result<PlatformUser, ServiceError>;

    async fn current_roles(&self) -> Result<BTreeSet<String>, ServiceError> {
        Ok(self.current_user().await?.roles)
    }
}

/// Fixed identity, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticRoleProvider {
    user: Option<PlatformUser>,
}

impl StaticRoleProvider {
    pub fn new(user: PlatformUser) -> Self {
        Self { user: Some(user) }
    }

    /// Provider whose context lookup always fails
    pub fn unavailable() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl RoleProvider for StaticRoleProvider {
    async fn current_user(&self) -> Result<PlatformUser, ServiceError> {
        self.user
            .clone()
            .ok_or_else(|| ServiceError::Decode("no platform user context".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ContextResponse {
    #[serde(default)]
    entry: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    content: ContextContent,
}

#[derive(Debug, Deserialize)]
struct ContextContent {
    username: String,
    #[serde(default)]
    roles: Vec<String>,
}

/// Reads the user from the platform's current-context REST endpoint
pub struct PlatformRoleProvider {
    base_url: Url,
    transport: Arc<dyn Transport>,
    session_token: Option<String>,
}

impl PlatformRoleProvider {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
            session_token: None,
        }
    }

    /// Authenticate with a platform session token instead of ambient cookies
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn context_url(&self) -> Result<Url, ServiceError> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            CURRENT_CONTEXT_PATH
        );
        let mut url =
            Url::parse(&joined).map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut().append_pair("output_mode", "json");
        Ok(url)
    }
}

#[async_trait]
impl RoleProvider for PlatformRoleProvider {
    async fn current_user(&self) -> Result<PlatformUser, ServiceError> {
        let mut request = ApiRequest::new(Method::GET, self.context_url()?);
        if let Some(token) = &self.session_token {
            request = request.with_header("Authorization", format!("Splunk {}", token));
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ServiceError::Api {
                status: response.status,
                message: "read platform user context failed".to_string(),
            });
        }

        let context: ContextResponse = decode(&response)?;
        let content = context
            .entry
            .into_iter()
            .next()
            .map(|e| e.content)
            .ok_or_else(|| ServiceError::Decode("empty current-context response".to_string()))?;

        debug!(
            "Platform user {} has roles {:?}",
            content.username, content.roles
        );

        Ok(PlatformUser {
            username: content.username,
            roles: content.roles.into_iter().collect(),
        })
    }
}
