use std::sync::Arc;

use base64ct::{Base64, Encoding};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{parse_list, parse_one};
use crate::ServiceError;
use crate::http::{ApiClient, FilePart, MultipartForm, RequestBody, decode, segment};
use crate::models::{DriveFile, FileFilter, FileUpdate, ShareRequest};
use crate::upload::{LocalFile, UploadStrategy};

const FILES_PATH: &str = "/api/files";
const UPLOAD_PATH: &str = "/api/files/upload";
const FOLDERS_PATH: &str = "/api/folders";
const SHARE_PATH: &str = "/api/share";

const ENVELOPE: &[&str] = &["files"];
const RECORD: &[&str] = &["file", "folder"];

/// Inline file creation with base64 content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64 of the file bytes
    pub content: String,
    pub encoding: String,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl NewFile {
    pub fn from_local(file: &LocalFile, parent_id: Option<&str>) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.content_type(),
            content: Base64::encode_string(&file.bytes),
            encoding: "base64".to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// File storage proxied by the backend
pub struct DriveService {
    client: Arc<ApiClient>,
}

impl DriveService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list_files(&self, filter: Option<&FileFilter>) -> Result<Vec<DriveFile>, ServiceError> {
        let query = filter.map(FileFilter::to_query).unwrap_or_default();
        let value: Value = self
            .client
            .get_json(FILES_PATH, &query, "fetch files")
            .await?;
        Ok(parse_list(&value, ENVELOPE, DriveFile::from_json, "file"))
    }

    pub async fn get_file(&self, id: &str) -> Result<DriveFile, ServiceError> {
        let value: Value = self
            .client
            .get_json(&file_path(id), &[], "fetch file")
            .await?;
        parse_one(&value, RECORD, DriveFile::from_json, "file")
    }

    pub async fn create_file(&self, file: &NewFile) -> Result<DriveFile, ServiceError> {
        let value: Value = self
            .client
            .post_json(FILES_PATH, file, "create file")
            .await?;
        parse_one(&value, RECORD, DriveFile::from_json, "file")
    }

    pub async fn update_file(&self, id: &str, update: &FileUpdate) -> Result<DriveFile, ServiceError> {
        let value: Value = self
            .client
            .put_json(&file_path(id), update, "update file")
            .await?;
        parse_one(&value, RECORD, DriveFile::from_json, "file")
    }

    pub async fn delete_file(&self, id: &str) -> Result<(), ServiceError> {
        self.client.delete(&file_path(id), "delete file").await
    }

    /// Raw file bytes
    pub async fn file_content(&self, id: &str) -> Result<Vec<u8>, ServiceError> {
        let path = format!("{}/content", file_path(id));
        let response = self
            .client
            .send(Method::GET, &path, &[], RequestBody::Empty, "download file")
            .await?;
        Ok(response.body)
    }

    /// Multipart upload of the raw bytes
    pub async fn upload_file(
        &self,
        file: &LocalFile,
        parent_id: Option<&str>,
    ) -> Result<DriveFile, ServiceError> {
        let content_type = file.content_type();
        content_type
            .parse::<mime_guess::mime::Mime>()
            .map_err(|e| {
                ServiceError::InvalidRequest(format!(
                    "Invalid content type {:?} for {}: {}",
                    content_type, file.name, e
                ))
            })?;

        let mut form = MultipartForm::new().file(FilePart {
            field: "file".to_string(),
            file_name: file.name.clone(),
            content_type,
            bytes: file.bytes.clone(),
        });
        if let Some(parent_id) = parent_id {
            form = form.text("parentId", parent_id);
        }

        let response = self
            .client
            .send(
                Method::POST,
                UPLOAD_PATH,
                &[],
                RequestBody::Multipart(form),
                "upload file",
            )
            .await?;
        let value: Value = decode(&response)?;
        parse_one(&value, RECORD, DriveFile::from_json, "file")
    }

    /// Upload through whichever path suits the file
    pub async fn upload(
        &self,
        file: &LocalFile,
        parent_id: Option<&str>,
    ) -> Result<DriveFile, ServiceError> {
        let strategy = UploadStrategy::choose(file);
        debug!(
            "Uploading {} ({} bytes) via {:?}",
            file.name,
            file.size(),
            strategy
        );

        let uploaded = match strategy {
            UploadStrategy::Inline => {
                self.create_file(&NewFile::from_local(file, parent_id))
                    .await?
            }
            UploadStrategy::Multipart => self.upload_file(file, parent_id).await?,
        };
        info!("Uploaded {} as {}", file.name, uploaded.id);
        Ok(uploaded)
    }

    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<DriveFile, ServiceError> {
        let mut body = json!({"name": name});
        if let Some(parent_id) = parent_id {
            body["parentId"] = Value::String(parent_id.to_string());
        }
        let value: Value = self
            .client
            .post_json(FOLDERS_PATH, &body, "create folder")
            .await?;
        parse_one(&value, RECORD, DriveFile::from_json, "folder")
    }

    pub async fn share(&self, request: &ShareRequest) -> Result<(), ServiceError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        self.client
            .send(Method::POST, SHARE_PATH, &[], RequestBody::Json(body), "share file")
            .await?;
        info!("Shared {} with {} as {}", request.file_id, request.email, request.role);
        Ok(())
    }
}

fn file_path(id: &str) -> String {
    format!("{}/{}", FILES_PATH, segment(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    #[test]
    fn new_file_encodes_base64() {
        let file = LocalFile::new("notes.txt", b"hello".to_vec());
        let new_file = NewFile::from_local(&file, Some("root-9"));
        assert_eq!(new_file.content, "aGVsbG8=");
        assert_eq!(new_file.mime_type, "text/plain");

        let json = serde_json::to_value(&new_file).unwrap();
        assert_eq!(json["parentId"], "root-9");
        assert_eq!(json["encoding"], "base64");
    }

    #[tokio::test]
    async fn small_json_goes_inline() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::POST,
            FILES_PATH,
            201,
            json!({"file": {"id": "f1", "name": "report.json"}}),
        );

        let file = LocalFile::new("report.json", vec![b' '; 2048]);
        let uploaded = DriveService::new(client)
            .upload(&file, None)
            .await
            .unwrap();
        assert_eq!(uploaded.id, "f1");
        assert!(mock.calls_to(Method::POST, UPLOAD_PATH).is_empty());
    }

    #[tokio::test]
    async fn binary_goes_multipart_with_parent() {
        let (mock, client) = test_support::client();
        mock.respond(Method::POST, UPLOAD_PATH, 200, json!({"id": "f2", "name": "site.png"}));

        let file = LocalFile::new("site.png", vec![0u8; 64]);
        DriveService::new(client)
            .upload(&file, Some("folder-1"))
            .await
            .unwrap();

        let call = mock.last_call_to(Method::POST, UPLOAD_PATH).unwrap();
        match &call.body {
            RequestBody::Multipart(form) => {
                assert_eq!(form.field("parentId"), Some("folder-1"));
                let part = form.file.as_ref().unwrap();
                assert_eq!(part.content_type, "image/png");
                assert_eq!(part.file_name, "site.png");
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_content_type_is_rejected_before_sending() {
        let (mock, client) = test_support::client();
        let file = LocalFile::new("photo.jpg", vec![0u8; 16]).with_content_type("not a mime");

        let err = DriveService::new(client)
            .upload(&file, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert!(err.user_message().contains("photo.jpg"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn content_returns_raw_bytes() {
        let (mock, client) = test_support::client();
        mock.respond_raw(Method::GET, "/api/files/f1/content", 200, vec![1u8, 2, 3]);

        let bytes = DriveService::new(client).file_content("f1").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn create_folder_under_parent() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::POST,
            FOLDERS_PATH,
            201,
            json!({"folder": {"id": "d1", "name": "Plant 7", "mimeType": "application/vnd.google-apps.folder"}}),
        );

        let folder = DriveService::new(client)
            .create_folder("Plant 7", Some("root-9"))
            .await
            .unwrap();
        assert!(folder.is_folder());

        let call = mock.last_call_to(Method::POST, FOLDERS_PATH).unwrap();
        assert_eq!(call.json_body().unwrap()["parentId"], "root-9");
    }
}
