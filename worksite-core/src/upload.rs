//! File upload: path selection and the upload state machine

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::DriveFile;
use crate::services::DriveService;

/// Text-like files at or above this size go through multipart upload
pub const INLINE_UPLOAD_LIMIT: u64 = 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &["txt", "json", "html", "htm", "css", "csv", "md"];

/// A file picked by the user, held in memory until uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    /// Declared type; guessed from the name when absent
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, naming it after the last path component
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared content type, else a guess from the extension
    pub fn content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// How a file reaches the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    /// JSON body with base64 content (`create_file`)
    Inline,
    /// `multipart/form-data` (`upload_file`)
    Multipart,
}

impl UploadStrategy {
    /// Inline for text-like files under [`INLINE_UPLOAD_LIMIT`], multipart otherwise
    pub fn for_file(name: &str, content_type: &str, size: u64) -> Self {
        if size < INLINE_UPLOAD_LIMIT && is_text_like(name, content_type) {
            UploadStrategy::Inline
        } else {
            UploadStrategy::Multipart
        }
    }

    pub fn choose(file: &LocalFile) -> Self {
        Self::for_file(&file.name, &file.content_type(), file.size())
    }
}

fn is_text_like(name: &str, content_type: &str) -> bool {
    let mime = content_type.to_ascii_lowercase();
    if mime.starts_with("text/") || mime == "application/json" {
        return true;
    }
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// Where an upload stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading {
        file_name: String,
    },
    Success {
        file: DriveFile,
    },
    /// Stays until dismissed or another file is selected
    Error {
        message: String,
    },
}

impl UploadState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UploadState::Error { message } => Some(message),
            _ => None,
        }
    }
}

type CompletionCallback = Box<dyn FnMut(&DriveFile) + Send>;

/// Drives one file input: select, upload, report
pub struct UploadController {
    drive: Arc<DriveService>,
    parent_id: Option<String>,
    selected: Option<LocalFile>,
    state: UploadState,
    on_complete: Option<CompletionCallback>,
}

impl UploadController {
    pub fn new(drive: Arc<DriveService>) -> Self {
        Self {
            drive,
            parent_id: None,
            selected: None,
            state: UploadState::Idle,
            on_complete: None,
        }
    }

    /// Upload into this folder instead of the backend's default
    pub fn into_folder(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Called with the server's record after each successful upload
    pub fn on_complete(mut self, callback: impl FnMut(&DriveFile) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected(&self) -> Option<&LocalFile> {
        self.selected.as_ref()
    }

    /// Replace the selected file, clearing any previous outcome
    pub fn select_file(&mut self, file: LocalFile) {
        self.selected = Some(file);
        self.state = UploadState::Idle;
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.state, UploadState::Error { .. }) {
            self.state = UploadState::Idle;
        }
    }

    /// Upload the selected file. On success the selection is cleared and
    /// the completion callback runs; on failure the selection is kept.
    pub async fn upload(&mut self) -> &UploadState {
        let Some(file) = self.selected.clone() else {
            self.state = UploadState::Error {
                message: "Choose a file to upload".to_string(),
            };
            return &self.state;
        };

        self.state = UploadState::Uploading {
            file_name: file.name.clone(),
        };

        match self.drive.upload(&file, self.parent_id.as_deref()).await {
            Ok(uploaded) => {
                info!("Upload of {} complete", file.name);
                self.selected = None;
                if let Some(callback) = self.on_complete.as_mut() {
                    callback(&uploaded);
                }
                self.state = UploadState::Success { file: uploaded };
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.state = UploadState::Error {
                    message: e.user_message(),
                };
            }
        }

        &self.state
    }
}
