//! Session/auth gate: platform role check plus the OAuth bearer token

use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{PlatformUser, Redirect, RoleProvider};
use crate::http::{ApiClient, ApiRequest, RequestBody, decode};
use crate::policy::FailurePolicy;
use crate::{ServiceError, StorageError};

pub const AUTH_STATUS_PATH: &str = "/adm/auth/status";
pub const LOGOUT_PATH: &str = "/adm/auth/logout";

/// Platform roles that may use the worksite app at all
pub const ACCESS_ROLES: [&str; 4] = ["admin", "inspector", "contractor", "subcontractor"];

/// Result of [`AuthGate::check_access`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub user: Option<PlatformUser>,
}

/// Body of the auth-status endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Decides whether the current user may proceed and manages the token
pub struct AuthGate {
    client: Arc<ApiClient>,
    roles: Arc<dyn RoleProvider>,
}

impl AuthGate {
    /// Policy for the platform role lookup
    pub const ACCESS_POLICY: FailurePolicy = FailurePolicy::FailClosed;
    /// Policy for the token status check
    pub const STATUS_POLICY: FailurePolicy = FailurePolicy::FailClosed;

    pub fn new(client: Arc<ApiClient>, roles: Arc<dyn RoleProvider>) -> Self {
        Self { client, roles }
    }

    /// Whether the platform user holds any role that grants app access.
    ///
    /// A failed or missing platform context is a denial, never an error.
    pub async fn check_access(&self) -> AccessDecision {
        let result = self.roles.current_user().await.map(|user| {
            let allowed = ACCESS_ROLES.iter().any(|role| user.has_role(role));
            debug!("Access for {}: {}", user.username, allowed);
            AccessDecision {
                allowed,
                user: Some(user),
            }
        });
        Self::ACCESS_POLICY.settle("platform access check", result)
    }

    /// True if a token is stored (says nothing about its validity)
    pub fn has_token(&self) -> bool {
        self.client.state().has_token()
    }

    /// Ask the server whether the stored token is still good.
    ///
    /// Without a stored token this returns `false` without a request. Any
    /// answer other than `authenticated: true` removes the token. A request
    /// that gets no answer returns `false` and keeps the token.
    pub async fn check_auth_status(&self) -> bool {
        if !self.has_token() {
            return false;
        }
        let result = self.fetch_status().await.map(|status| status.authenticated);
        Self::STATUS_POLICY.settle("auth status check", result)
    }

    async fn fetch_status(&self) -> Result<AuthStatus, ServiceError> {
        let response = self
            .client
            .send_unchecked(Method::GET, AUTH_STATUS_PATH, RequestBody::Empty)
            .await?;

        let status = if response.is_success() {
            decode::<AuthStatus>(&response).unwrap_or_default()
        } else {
            AuthStatus::default()
        };

        if !status.authenticated {
            info!(
                "Auth status {} reports unauthenticated, clearing token",
                response.status
            );
            self.client.state().clear_token();
        }

        Ok(status)
    }

    /// Remember `return_path` and navigate to the OAuth entry point
    pub fn redirect_to_auth(&self, return_path: Option<&str>) -> Redirect {
        self.client.redirect_to_auth(return_path)
    }

    /// Store the token handed back by the OAuth callback.
    ///
    /// Returns the path saved by the redirect that started the flow.
    pub fn complete_auth(&self, token: &str) -> Result<Option<String>, StorageError> {
        self.client.state().set_token(token)?;
        info!("Signed in");
        Ok(self.client.state().take_return_path())
    }

    /// Drop the local token and tell the server, ignoring any failure there
    pub async fn logout(&self) {
        let token = self.client.state().token();
        self.client.state().clear_token();

        let Some(token) = token else {
            return;
        };

        let notify = async {
            let url = self.client.url(LOGOUT_PATH, &[])?;
            let request = ApiRequest::new(Method::POST, url)
                .with_header("Authorization", format!("Bearer {}", token));
            self.client.send_request(request).await
        };

        match notify.await {
            Ok(response) => debug!("Logout endpoint returned {}", response.status),
            Err(e) => debug!("Logout notification failed (ignored): {}", e),
        }
        info!("Signed out");
    }
}
