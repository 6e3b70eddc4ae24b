//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{ApiRequest, ApiResponse, MultipartForm, RequestBody, Transport};
use crate::TransportError;

/// Transport over a shared `reqwest::Client`.
///
/// No timeout and no retry: every request is a single attempt.
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (proxies, custom roots)
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn build_form(url: &str, form: MultipartForm) -> Result<Form, TransportError> {
        let mut multipart = Form::new();
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        if let Some(file) = form.file {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|e| TransportError::Request {
                    url: url.to_string(),
                    message: format!("invalid content type: {}", e),
                })?;
            multipart = multipart.part(file.field, part);
        }
        Ok(multipart)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.to_string();
        debug!("{} {}", request.method, url);

        let mut req = self.http_client.request(request.method, request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        req = match request.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart(form) => req.multipart(Self::build_form(&url, form)?),
        };

        let response = req.send().await.map_err(|e| TransportError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!("{} -> {}", url, status);
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
