//! In-memory transport for tests
//!
//! Routes are matched on method and exact URL path. Every request is
//! recorded, including ones that hit no route.

use std::sync::Mutex;

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::TransportError;

#[derive(Debug, Clone)]
enum MockReply {
    Respond(ApiResponse),
    Fail(String),
}

#[derive(Debug, Clone)]
struct MockRoute {
    method: Method,
    path: String,
    reply: MockReply,
}

/// Transport that answers from a route table
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, method: Method, path: &str, reply: MockReply) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes.retain(|r| !(r.method == method && r.path == path));
        routes.push(MockRoute {
            method,
            path: path.to_string(),
            reply,
        });
    }

    /// Answer `method path` with a JSON body. Replaces any earlier route.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.register(method, path, MockReply::Respond(ApiResponse::json(status, &body)));
    }

    /// Answer `method path` with a raw body
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.register(method, path, MockReply::Respond(ApiResponse::new(status, body)));
    }

    /// Make `method path` fail as if the network were down
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.register(method, path, MockReply::Fail(message.to_string()));
    }

    /// Every request sent so far, in order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Requests sent to `method path`
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path() == path)
            .collect()
    }

    /// Most recent request sent to `method path`
    pub fn last_call_to(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.calls_to(method, path).pop()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = request.method.clone();
        let path = request.path().to_string();

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let reply = {
            let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            routes
                .iter()
                .find(|r| r.method == method && r.path == path)
                .map(|r| r.reply.clone())
        };

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(message)) => Err(TransportError::Request { url: path, message }),
            None => Err(TransportError::NoRoute {
                method: method.to_string(),
                path,
            }),
        }
    }
}
