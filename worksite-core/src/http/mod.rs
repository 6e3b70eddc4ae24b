//! HTTP plumbing: transport seam, reqwest and mock transports, API client

mod client;
mod mock;
mod reqwest_transport;
mod transport;

pub use client::{ApiClient, OAUTH_ENTRY_PATH, Query, segment};
pub(crate) use client::decode;
pub use mock::MockTransport;
pub use reqwest_transport::ReqwestTransport;
pub use transport::{ApiRequest, ApiResponse, FilePart, MultipartForm, RequestBody, Transport};
