use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use super::{SitePhase, SiteSnapshot};
use crate::auth::RoleProvider;
use crate::http::ApiClient;
use crate::models::Site;
use crate::policy::FailurePolicy;
use crate::services::{RootFolder, RootFolderSetting, SiteService, SystemService};
use crate::{ServiceError, StorageError};

/// Site state for the signed-in user.
///
/// Built by [`SiteContext::mount`]; every change goes through its methods and
/// is broadcast to subscribers as a fresh [`SiteSnapshot`].
pub struct SiteContext {
    client: Arc<ApiClient>,
    sites: SiteService,
    system: SystemService,
    state: RwLock<SiteSnapshot>,
    sender: broadcast::Sender<SiteSnapshot>,
}

impl SiteContext {
    /// Role lookup failure reads as "not admin"
    pub const ADMIN_POLICY: FailurePolicy = FailurePolicy::FailClosed;
    /// Site fetch failure reads as "no sites"
    pub const SITES_POLICY: FailurePolicy = FailurePolicy::FailEmpty;

    /// Load sites and restore the persisted selection.
    ///
    /// For admins the root-folder check runs alongside the site fetch; an
    /// admin without a root folder lands in [`SitePhase::SetupRequired`].
    pub async fn mount(client: Arc<ApiClient>, roles: Arc<dyn RoleProvider>) -> Self {
        let (sender, _) = broadcast::channel(16);
        let context = Self {
            sites: SiteService::new(client.clone()),
            system: SystemService::new(client.clone()),
            client,
            state: RwLock::new(SiteSnapshot::default()),
            sender,
        };

        let is_admin = Self::ADMIN_POLICY.settle(
            "read platform roles",
            roles.current_user().await.map(|user| user.is_admin()),
        );

        let (root_configured, fetched) = tokio::join!(
            context.root_folder_configured(is_admin),
            context.sites.my_sites()
        );
        let selected = context.restore_selection(fetched.as_deref().ok());
        let sites = Self::SITES_POLICY.settle("load assigned sites", fetched);

        let phase = if is_admin && !root_configured {
            info!("No root folder configured, setup required");
            SitePhase::SetupRequired
        } else {
            SitePhase::Ready
        };

        let role = selected.as_ref().and_then(|s| s.user_role);
        debug!(
            "Site context mounted: admin={}, {} sites, selected={:?}",
            is_admin,
            sites.len(),
            selected.as_ref().map(|s| &s.id)
        );

        context
            .publish(SiteSnapshot {
                phase,
                is_admin,
                sites,
                selected,
                role,
            })
            .await;
        context
    }

    /// Non-admins never need the root folder. A failed check does not block
    /// the admin; setup can still be reached explicitly.
    async fn root_folder_configured(&self, is_admin: bool) -> bool {
        if !is_admin {
            return true;
        }
        match self.system.is_root_folder_configured().await {
            Ok(configured) => configured,
            Err(e) => {
                warn!("Root folder check failed, continuing: {}", e);
                true
            }
        }
    }

    /// Persisted site if it is still assigned. A stale id is forgotten only
    /// when `sites` came from a successful fetch.
    fn restore_selection(&self, sites: Option<&[Site]>) -> Option<Site> {
        let state = self.client.state();
        let site_id = state.selected_site_id()?;
        let Some(sites) = sites else {
            debug!("Sites unavailable, keeping persisted site {}", site_id);
            return None;
        };

        match sites.iter().find(|s| s.id == site_id) {
            Some(site) => Some(site.clone()),
            None => {
                debug!("Persisted site {} is no longer assigned", site_id);
                state.clear_selected_site_id();
                None
            }
        }
    }

    async fn publish(&self, snapshot: SiteSnapshot) {
        *self.state.write().await = snapshot.clone();
        let _ = self.sender.send(snapshot);
    }

    /// Apply `change` to the current state and broadcast the result
    async fn update(&self, change: impl FnOnce(&mut SiteSnapshot)) -> SiteSnapshot {
        let snapshot = {
            let mut state = self.state.write().await;
            change(&mut *state);
            state.clone()
        };
        let _ = self.sender.send(snapshot.clone());
        snapshot
    }

    pub async fn snapshot(&self) -> SiteSnapshot {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SiteSnapshot> {
        self.sender.subscribe()
    }

    pub async fn phase(&self) -> SitePhase {
        self.state.read().await.phase
    }

    pub async fn selected_site(&self) -> Option<Site> {
        self.state.read().await.selected.clone()
    }

    /// Make `site` active, take its role, and persist its id
    pub async fn select_site(&self, site: &Site) -> Result<(), StorageError> {
        self.client.state().set_selected_site_id(&site.id)?;
        let selected = site.clone();
        self.update(move |state| {
            state.role = selected.user_role;
            state.selected = Some(selected);
        })
        .await;
        info!("Selected site {}", site.id);
        Ok(())
    }

    pub async fn clear_selection(&self) {
        self.client.state().clear_selected_site_id();
        self.update(|state| {
            state.selected = None;
            state.role = None;
        })
        .await;
    }

    /// Re-fetch assigned sites. The selection survives only if the site is
    /// still in the list, with its role refreshed. A failed fetch leaves the
    /// current state untouched.
    pub async fn refresh_sites(&self) -> Vec<Site> {
        let fresh = match self.sites.my_sites().await {
            Ok(sites) => sites,
            Err(e) => {
                return Self::SITES_POLICY.settle("reload assigned sites", Err(e));
            }
        };

        let sites = fresh.clone();
        let snapshot = self
            .update(move |state| {
                let selected = state
                    .selected
                    .as_ref()
                    .and_then(|current| fresh.iter().find(|s| s.id == current.id).cloned());
                state.role = selected.as_ref().and_then(|s| s.user_role);
                state.selected = selected;
                state.sites = fresh;
            })
            .await;

        if snapshot.selected.is_none() {
            self.client.state().clear_selected_site_id();
        }
        sites
    }

    /// See [`SiteSnapshot::has_permission`]
    pub async fn has_permission(&self, permission: &str) -> bool {
        self.state.read().await.has_permission(permission)
    }

    /// Save the root folder and leave [`SitePhase::SetupRequired`]
    pub async fn complete_root_folder_setup(
        &self,
        setting: &RootFolderSetting,
    ) -> Result<RootFolder, ServiceError> {
        let folder = self.system.set_root_folder(setting).await?;
        self.update(|state| state.phase = SitePhase::Ready).await;
        info!("Root folder setup complete");
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PlatformUser, StaticRoleProvider};
    use crate::permissions::Role;
    use crate::services::test_support;
    use http::Method;
    use serde_json::json;

    const ROOT: &str = "/adm/system/root-folder";
    const MINE: &str = "/adm/users/me/sites";

    fn admin() -> Arc<dyn RoleProvider> {
        Arc::new(StaticRoleProvider::new(
            PlatformUser::new("root").with_role("admin"),
        ))
    }

    fn worker() -> Arc<dyn RoleProvider> {
        Arc::new(StaticRoleProvider::new(
            PlatformUser::new("jo").with_role("contractor"),
        ))
    }

    #[tokio::test]
    async fn admin_without_root_folder_needs_setup() {
        let (mock, client) = test_support::client();
        mock.respond(Method::GET, ROOT, 200, json!({"configured": false}));
        mock.respond(Method::GET, MINE, 200, json!([]));

        let context = SiteContext::mount(client, admin()).await;
        assert_eq!(context.phase().await, SitePhase::SetupRequired);

        mock.respond(Method::POST, ROOT, 200, json!({"folder_id": "r1"}));
        context
            .complete_root_folder_setup(&RootFolderSetting::new("r1"))
            .await
            .unwrap();
        assert_eq!(context.phase().await, SitePhase::Ready);
    }

    #[tokio::test]
    async fn non_admin_skips_root_folder_check() {
        let (mock, client) = test_support::client();
        mock.respond(Method::GET, MINE, 200, json!([]));

        let context = SiteContext::mount(client, worker()).await;
        assert_eq!(context.phase().await, SitePhase::Ready);
        assert!(mock.calls_to(Method::GET, ROOT).is_empty());
    }

    #[tokio::test]
    async fn failed_root_check_does_not_block_admin() {
        let (mock, client) = test_support::client();
        mock.fail(Method::GET, ROOT, "timeout");
        mock.respond(Method::GET, MINE, 200, json!([]));

        let context = SiteContext::mount(client, admin()).await;
        assert_eq!(context.phase().await, SitePhase::Ready);
    }

    #[tokio::test]
    async fn unavailable_roles_mean_not_admin() {
        let (mock, client) = test_support::client();
        mock.respond(Method::GET, MINE, 200, json!([]));

        let context =
            SiteContext::mount(client, Arc::new(StaticRoleProvider::unavailable())).await;
        let snapshot = context.snapshot().await;
        assert!(!snapshot.is_admin);
        assert!(!context.has_permission("view_documents").await);
    }

    #[tokio::test]
    async fn select_site_derives_role_and_persists() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            MINE,
            200,
            json!([{"site_id": "siteA", "name": "A", "user_role": "contractor"}]),
        );

        let context = SiteContext::mount(client.clone(), worker()).await;
        let site = context.snapshot().await.sites[0].clone();
        let mut updates = context.subscribe();

        context.select_site(&site).await.unwrap();

        assert_eq!(client.state().selected_site_id().as_deref(), Some("siteA"));
        assert!(context.has_permission("view_checkins").await);
        assert!(!context.has_permission("manage_users").await);
        assert_eq!(updates.recv().await.unwrap().role, Some(Role::Contractor));

        context.clear_selection().await;
        assert!(client.state().selected_site_id().is_none());
        assert!(!context.has_permission("view_checkins").await);
    }

    #[tokio::test]
    async fn refresh_drops_unassigned_selection() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            MINE,
            200,
            json!([{"id": "siteA", "user_role": "viewer"}]),
        );

        let context = SiteContext::mount(client.clone(), worker()).await;
        let site = context.snapshot().await.sites[0].clone();
        context.select_site(&site).await.unwrap();

        mock.respond(Method::GET, MINE, 200, json!([{"id": "siteB"}]));
        let sites = context.refresh_sites().await;

        assert_eq!(sites.len(), 1);
        assert!(context.selected_site().await.is_none());
        assert!(client.state().selected_site_id().is_none());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_selection() {
        let (mock, client) = test_support::client();
        mock.respond(
            Method::GET,
            MINE,
            200,
            json!([{"id": "siteA", "user_role": "inspector"}]),
        );

        let context = SiteContext::mount(client.clone(), worker()).await;
        let site = context.snapshot().await.sites[0].clone();
        context.select_site(&site).await.unwrap();

        mock.fail(Method::GET, MINE, "offline");
        let sites = context.refresh_sites().await;

        assert!(sites.is_empty());
        let snapshot = context.snapshot().await;
        assert_eq!(snapshot.selected_site_id(), Some("siteA"));
        assert_eq!(snapshot.sites.len(), 1);
        assert_eq!(client.state().selected_site_id().as_deref(), Some("siteA"));
        assert!(context.has_permission("edit_inspections").await);
    }
}
