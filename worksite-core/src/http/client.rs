//! Authenticated JSON client shared by every resource service

use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::{ApiRequest, ApiResponse, RequestBody, Transport};
use crate::auth::{Navigator, Redirect};
use crate::config::EndpointsConfig;
use crate::storage::PersistedState;
use crate::{ConfigError, ServiceError};

/// OAuth entry point, relative to the API base
pub const OAUTH_ENTRY_PATH: &str = "/adm/auth/google";

/// Query parameters as `(name, value)` pairs
pub type Query = Vec<(&'static str, String)>;

/// Percent-encode a value for use as one path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// HTTP client that attaches the stored bearer token and maps failures.
///
/// The token is read from the store on every request. A 401 on any call
/// clears the token and issues exactly one redirect to the OAuth entry.
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    state: PersistedState,
    navigator: Arc<dyn Navigator>,
    endpoints: EndpointsConfig,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        state: PersistedState,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            transport,
            state,
            navigator,
            endpoints: EndpointsConfig::default(),
        })
    }

    /// Override relocatable endpoint paths
    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &EndpointsConfig {
        &self.endpoints
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Absolute URL for `path` under the API base, with query parameters
    pub fn url(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url, ServiceError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        let mut url =
            Url::parse(&joined).map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }

    /// Save where to come back to, then navigate to the OAuth entry point.
    ///
    /// `return_path` defaults to the navigator's current path.
    pub fn redirect_to_auth(&self, return_path: Option<&str>) -> Redirect {
        let return_path = return_path
            .map(str::to_string)
            .unwrap_or_else(|| self.navigator.current_path());

        if let Err(e) = self.state.set_return_path(&return_path) {
            warn!("Failed to store OAuth return path: {}", e);
        }

        let location = self
            .url(OAUTH_ENTRY_PATH, &[])
            .unwrap_or_else(|_| self.base_url.clone());

        info!("Redirecting to sign-in, will return to {}", return_path);
        self.navigator.navigate(&location);
        Redirect { location }
    }

    /// Build a request with the bearer token attached when one is stored
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: RequestBody,
    ) -> Result<ApiRequest, ServiceError> {
        let mut request = ApiRequest::new(method, self.url(path, query)?)
            .with_header("Accept", "application/json")
            .with_body(body);

        if let Some(token) = self.state.token() {
            request = request.with_header("Authorization", format!("Bearer {}", token));
        }

        Ok(request)
    }

    /// Send a request without auth-failure handling.
    ///
    /// Used by the auth gate, which applies its own policy to the status.
    pub async fn send_unchecked(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<ApiResponse, ServiceError> {
        let request = self.request(method, path, &[], body)?;
        Ok(self.transport.send(request).await?)
    }

    /// Send a fully built request as-is
    pub async fn send_request(&self, request: ApiRequest) -> Result<ApiResponse, ServiceError> {
        Ok(self.transport.send(request).await?)
    }

    /// Send a request and translate the response status.
    ///
    /// `action` names the operation for the fallback error message
    /// (`"<action> failed"`).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: RequestBody,
        action: &str,
    ) -> Result<ApiResponse, ServiceError> {
        let request = self.request(method, path, query, body)?;
        let response = self.transport.send(request).await.map_err(|e| {
            warn!("{} failed: {}", action, e);
            ServiceError::from(e)
        })?;

        if response.status == 401 {
            self.handle_unauthorized();
            return Err(ServiceError::AuthRequired);
        }

        if !response.is_success() {
            let message = error_message(&response, action);
            debug!("{} returned {}: {}", path, response.status, message);
            return Err(ServiceError::Api {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }

    /// Only the call that removes the token redirects
    fn handle_unauthorized(&self) {
        if !self.state.clear_token() {
            debug!("Credentials already cleared, skipping redirect");
            return;
        }
        info!("Server rejected credentials, cleared stored token");
        let _redirect = self.redirect_to_auth(None);
    }

    /// GET and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        action: &str,
    ) -> Result<T, ServiceError> {
        let response = self
            .send(Method::GET, path, query, RequestBody::Empty, action)
            .await?;
        decode(&response)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T, ServiceError> {
        self.send_json(Method::POST, path, body, action).await
    }

    /// PUT a JSON body and decode the JSON response
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T, ServiceError> {
        self.send_json(Method::PUT, path, body, action).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T, ServiceError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ServiceError::InvalidRequest(format!("{}: {}", action, e)))?;
        let response = self
            .send(method, path, &[], RequestBody::Json(body), action)
            .await?;
        decode(&response)
    }

    /// DELETE, ignoring any response body
    pub async fn delete(&self, path: &str, action: &str) -> Result<(), ServiceError> {
        self.send(Method::DELETE, path, &[], RequestBody::Empty, action)
            .await?;
        Ok(())
    }
}

/// Decode a successful response body
pub(crate) fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ServiceError> {
    let value = response
        .json_value()
        .map_err(|e| ServiceError::Decode(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Message from the body's `error` field, else `"<action> failed"`
fn error_message(response: &ApiResponse, action: &str) -> String {
    let from_body = response.json_value().ok().and_then(|body| match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    });

    from_body.unwrap_or_else(|| format!("{} failed", action))
}
