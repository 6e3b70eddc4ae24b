//! Wiring of client, gate and services from configuration

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::auth::{
    AuthGate, LogNavigator, Navigator, PlatformRoleProvider, RoleProvider, StaticRoleProvider,
};
use crate::config::WorksiteConfig;
use crate::http::{ApiClient, ReqwestTransport, Transport};
use crate::services::{
    AnalyticsService, CheckInService, DocumentService, DriveService, NotificationService,
    SiteService, SystemService, TemplateService, UserService,
};
use crate::site::SiteContext;
use crate::storage::{FileStore, KeyValueStore, PersistedState};
use crate::upload::UploadController;
use crate::{ConfigError, WorksiteError};

/// Everything a front end needs, sharing one [`ApiClient`]
pub struct Worksite {
    client: Arc<ApiClient>,
    roles: Arc<dyn RoleProvider>,
    pub auth: AuthGate,
    pub sites: SiteService,
    pub users: UserService,
    pub templates: TemplateService,
    pub documents: DocumentService,
    pub drive: Arc<DriveService>,
    pub notifications: NotificationService,
    pub system: SystemService,
    pub checkins: CheckInService,
    pub analytics: AnalyticsService,
}

impl Worksite {
    /// Production wiring: reqwest transport, file-backed store, logging
    /// navigator, and the platform role provider when one is configured.
    pub fn from_config(config: &WorksiteConfig) -> Result<Self, WorksiteError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());

        let store = match &config.storage.dir {
            Some(dir) => FileStore::load(dir)?,
            None => FileStore::load_default()?,
        };
        info!("Client state stored at {}", store.path().display());

        let roles = platform_roles(config, transport.clone())?;

        Self::with_parts(
            config,
            transport,
            Arc::new(store),
            Arc::new(LogNavigator::new("/")),
            roles,
        )
    }

    /// Wire from explicit parts; tests pass a mock transport and memory store
    pub fn with_parts(
        config: &WorksiteConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        roles: Arc<dyn RoleProvider>,
    ) -> Result<Self, WorksiteError> {
        let state = PersistedState::with_prefix(store, config.storage.key_prefix.clone());
        let client = Arc::new(
            ApiClient::new(&config.api.base_url, transport, state, navigator)?
                .with_endpoints(config.api.endpoints.clone()),
        );

        Ok(Self {
            auth: AuthGate::new(client.clone(), roles.clone()),
            sites: SiteService::new(client.clone()),
            users: UserService::new(client.clone()),
            templates: TemplateService::new(client.clone()),
            documents: DocumentService::new(client.clone()),
            drive: Arc::new(DriveService::new(client.clone())),
            notifications: NotificationService::new(client.clone()),
            system: SystemService::new(client.clone()),
            checkins: CheckInService::new(client.clone()),
            analytics: AnalyticsService::new(client.clone()),
            client,
            roles,
        })
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn state(&self) -> &PersistedState {
        self.client.state()
    }

    /// Load the caller's sites and restore their last selection
    pub async fn mount_site_context(&self) -> SiteContext {
        SiteContext::mount(self.client.clone(), self.roles.clone()).await
    }

    pub fn upload_controller(&self) -> UploadController {
        UploadController::new(self.drive.clone())
    }
}

/// Role provider for the configured platform, or one that denies everything
fn platform_roles(
    config: &WorksiteConfig,
    transport: Arc<dyn Transport>,
) -> Result<Arc<dyn RoleProvider>, ConfigError> {
    let Some(base_url) = &config.platform.base_url else {
        warn!("No platform configured, every access check will be denied");
        return Ok(Arc::new(StaticRoleProvider::unavailable()));
    };

    let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.clone(),
        message: e.to_string(),
    })?;
    let mut provider = PlatformRoleProvider::new(url, transport);
    if let Some(token) = &config.platform.session_token {
        provider = provider.with_session_token(token.clone());
    }
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use crate::storage::MemoryStore;

    #[test]
    fn file_store_lives_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WorksiteConfig::default();
        config.storage.dir = Some(dir.path().to_path_buf());

        let worksite = Worksite::from_config(&config).unwrap();
        worksite.state().set_token("abc").unwrap();
        assert!(dir.path().join("local_storage.json").exists());
    }

    #[test]
    fn bad_platform_url_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WorksiteConfig::default();
        config.storage.dir = Some(dir.path().to_path_buf());
        config.platform.base_url = Some("not a url".to_string());

        assert!(matches!(
            Worksite::from_config(&config),
            Err(WorksiteError::Config(ConfigError::InvalidBaseUrl { .. }))
        ));
    }

    #[tokio::test]
    async fn configured_session_token_reaches_platform() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            http::Method::GET,
            "/services/authentication/current-context",
            200,
            serde_json::json!({"entry": [{"content": {"username": "jo", "roles": ["admin"]}}]}),
        );
        let mut config = WorksiteConfig::default();
        config.platform.base_url = Some("https://splunk.example.com:8089".to_string());
        config.platform.session_token = Some("sess".to_string());

        let roles = platform_roles(&config, mock.clone()).unwrap();
        assert!(roles.current_user().await.unwrap().is_admin());

        let call = mock
            .last_call_to(http::Method::GET, "/services/authentication/current-context")
            .unwrap();
        assert_eq!(call.header("Authorization"), Some("Splunk sess"));
    }

    #[tokio::test]
    async fn missing_platform_denies() {
        let roles = platform_roles(&WorksiteConfig::default(), Arc::new(MockTransport::new()))
            .unwrap();
        assert!(roles.current_user().await.is_err());
    }

    #[test]
    fn key_prefix_comes_from_config() {
        let store = Arc::new(MemoryStore::new());
        let mut config = WorksiteConfig::default();
        config.storage.key_prefix = "site_portal_".to_string();

        let worksite = Worksite::with_parts(
            &config,
            Arc::new(MockTransport::new()),
            store.clone(),
            Arc::new(LogNavigator::new("/")),
            Arc::new(StaticRoleProvider::unavailable()),
        )
        .unwrap();
        worksite.state().set_token("abc").unwrap();

        assert_eq!(store.get("site_portal_token").as_deref(), Some("abc"));
    }
}
