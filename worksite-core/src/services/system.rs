use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ServiceError;
use crate::http::ApiClient;
use crate::models::{first_str, record};

/// The top-level Drive folder under which site folders live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub folder_id: String,
    pub name: Option<String>,
    pub link: Option<String>,
}

impl RootFolder {
    /// `None` when the server reports no folder configured.
    ///
    /// Accepts `{configured: false}`, a bare record, or one wrapped in
    /// `root_folder`. Id precedence: `folder_id`, `folderId`,
    /// `root_folder_id`, `id`.
    pub fn from_json(value: &Value) -> Option<Self> {
        if value.get("configured").and_then(Value::as_bool) == Some(false) {
            return None;
        }
        let body = record(value, &["root_folder", "rootFolder"]);
        Some(Self {
            folder_id: first_str(body, &["folder_id", "folderId", "root_folder_id", "id"])?,
            name: first_str(body, &["folder_name", "folderName", "name"]),
            link: first_str(body, &["folder_link", "folderLink", "link", "webViewLink"]),
        })
    }
}

/// Payload for choosing the root folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolderSetting {
    pub folder_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_link: Option<String>,
}

impl RootFolderSetting {
    pub fn new(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            folder_link: None,
        }
    }
}

/// System settings; the root-folder path comes from the endpoints config
pub struct SystemService {
    client: Arc<ApiClient>,
}

impl SystemService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn root_folder(&self) -> Result<Option<RootFolder>, ServiceError> {
        let path = self.client.endpoints().root_folder.clone();
        let value: Value = self
            .client
            .get_json(&path, &[], "fetch root folder")
            .await?;
        Ok(RootFolder::from_json(&value))
    }

    pub async fn is_root_folder_configured(&self) -> Result<bool, ServiceError> {
        Ok(self.root_folder().await?.is_some())
    }

    pub async fn set_root_folder(
        &self,
        setting: &RootFolderSetting,
    ) -> Result<RootFolder, ServiceError> {
        let path = self.client.endpoints().root_folder.clone();
        let value: Value = self
            .client
            .post_json(&path, setting, "save root folder")
            .await?;
        info!("Root folder set to {}", setting.folder_id);

        Ok(RootFolder::from_json(&value).unwrap_or_else(|| RootFolder {
            folder_id: setting.folder_id.clone(),
            name: None,
            link: setting.folder_link.clone(),
        }))
    }
}
