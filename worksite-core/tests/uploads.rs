//! Upload path selection against the mock backend

mod common;

use http::Method;
use serde_json::json;
use worksite_core::http::RequestBody;
use worksite_core::{LocalFile, UploadState};

use common::harness;

#[tokio::test]
async fn small_json_uses_create_file() {
    let h = harness(&["contractor"]);
    h.mock.respond(
        Method::POST,
        "/api/files",
        201,
        json!({"id": "f1", "name": "report.json", "mimeType": "application/json"}),
    );

    let mut controller = h.worksite.upload_controller();
    controller.select_file(LocalFile::new("report.json", vec![b'a'; 2 * 1024]));
    controller.upload().await;

    assert!(matches!(controller.state(), UploadState::Success { .. }));
    assert!(h.mock.calls_to(Method::POST, "/api/files/upload").is_empty());

    let call = h.mock.last_call_to(Method::POST, "/api/files").unwrap();
    let body = call.json_body().unwrap();
    assert_eq!(body["mimeType"], "application/json");
    assert_eq!(body["encoding"], "base64");
}

#[tokio::test]
async fn large_png_uses_multipart_upload() {
    let h = harness(&["contractor"]);
    h.mock.respond(
        Method::POST,
        "/api/files/upload",
        200,
        json!({"file": {"id": "f2", "name": "site.png"}}),
    );

    let mut controller = h.worksite.upload_controller().into_folder("site-folder");
    controller.select_file(LocalFile::new("site.png", vec![0u8; 5 * 1024 * 1024]));
    controller.upload().await;

    assert!(matches!(controller.state(), UploadState::Success { file } if file.id == "f2"));
    assert!(h.mock.calls_to(Method::POST, "/api/files").is_empty());

    let call = h.mock.last_call_to(Method::POST, "/api/files/upload").unwrap();
    assert!(matches!(&call.body, RequestBody::Multipart(form) if form.field("parentId") == Some("site-folder")));
}

#[tokio::test]
async fn failed_upload_shows_server_message() {
    let h = harness(&["contractor"]);
    h.worksite.state().set_token("tok").unwrap();
    h.mock.respond(
        Method::POST,
        "/api/files/upload",
        507,
        json!({"error": "Drive quota exceeded"}),
    );

    let mut controller = h.worksite.upload_controller();
    controller.select_file(LocalFile::new("plan.pdf", vec![1u8; 128]));
    controller.upload().await;

    assert_eq!(controller.state().error_message(), Some("Drive quota exceeded"));
    assert!(h.worksite.state().has_token());
}
