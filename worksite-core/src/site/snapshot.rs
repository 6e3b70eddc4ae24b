use serde::{Deserialize, Serialize};

use crate::models::Site;
use crate::permissions::{Permission, Role};

/// Lifecycle of the site context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SitePhase {
    #[default]
    Loading,
    Ready,
    /// Admin with no root folder configured; only setup can leave this phase
    SetupRequired,
}

/// Point-in-time copy of the site context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub phase: SitePhase,
    pub is_admin: bool,
    pub sites: Vec<Site>,
    pub selected: Option<Site>,
    /// Caller's role at the selected site
    pub role: Option<Role>,
}

impl SiteSnapshot {
    pub fn selected_site_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.id.as_str())
    }

    /// Admins hold every permission, with or without a site. Everyone else
    /// needs a selected site whose role grants `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin {
            return true;
        }
        match (self.role, Permission::parse(permission)) {
            (Some(role), Some(permission)) => role.grants(permission),
            _ => false,
        }
    }

    pub fn find_site(&self, site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == site_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_role(role: Option<Role>) -> SiteSnapshot {
        let site = Site::new("siteA", "Site A");
        SiteSnapshot {
            phase: SitePhase::Ready,
            is_admin: false,
            sites: vec![site.clone()],
            selected: Some(site),
            role,
        }
    }

    #[test]
    fn admin_without_site_has_everything() {
        let snapshot = SiteSnapshot {
            is_admin: true,
            ..Default::default()
        };
        assert!(snapshot.has_permission("manage_users"));
        assert!(snapshot.has_permission("view_reports"));
    }

    #[test]
    fn contractor_permissions() {
        let snapshot = with_role(Some(Role::Contractor));
        assert!(snapshot.has_permission("view_checkins"));
        assert!(!snapshot.has_permission("manage_users"));
        assert!(!snapshot.has_permission("no_such_permission"));
    }

    #[test]
    fn no_role_or_site_denies() {
        assert!(!with_role(None).has_permission("view_documents"));
        assert!(!SiteSnapshot::default().has_permission("view_documents"));
    }
}
