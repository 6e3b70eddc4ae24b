//! Role → permission table
//!
//! Permissions are derived, never stored. `admin` holds every permission;
//! every other role maps to a fixed set. Anything not in the table is denied.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SiteAssignment;

/// Worksite role, per site assignment (or platform-wide for `admin`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SiteManager,
    Contractor,
    Subcontractor,
    Inspector,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::SiteManager,
        Role::Contractor,
        Role::Subcontractor,
        Role::Inspector,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SiteManager => "site_manager",
            Role::Contractor => "contractor",
            Role::Subcontractor => "subcontractor",
            Role::Inspector => "inspector",
            Role::Viewer => "viewer",
        }
    }

    /// Case-insensitive; accepts `site manager` and `site-manager` too
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Role::ALL.into_iter().find(|r| r.as_str() == normalized)
    }

    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Admin => &Permission::ALL,
            Role::SiteManager => &[
                ViewDocuments,
                CreateDocuments,
                EditDocuments,
                ViewInspections,
                CreateInspections,
                EditInspections,
                ViewCheckins,
                ManageUsers,
                ViewReports,
            ],
            Role::Contractor | Role::Subcontractor => &[
                ViewDocuments,
                CreateDocuments,
                ViewInspections,
                CreateInspections,
                ViewCheckins,
            ],
            Role::Inspector => &[
                ViewDocuments,
                ViewInspections,
                CreateInspections,
                EditInspections,
                ViewCheckins,
            ],
            Role::Viewer => &[ViewDocuments, ViewInspections, ViewCheckins, ViewReports],
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDocuments,
    CreateDocuments,
    EditDocuments,
    ViewInspections,
    CreateInspections,
    EditInspections,
    ViewCheckins,
    ManageUsers,
    ViewReports,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::ViewDocuments,
        Permission::CreateDocuments,
        Permission::EditDocuments,
        Permission::ViewInspections,
        Permission::CreateInspections,
        Permission::EditInspections,
        Permission::ViewCheckins,
        Permission::ManageUsers,
        Permission::ViewReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDocuments => "view_documents",
            Permission::CreateDocuments => "create_documents",
            Permission::EditDocuments => "edit_documents",
            Permission::ViewInspections => "view_inspections",
            Permission::CreateInspections => "create_inspections",
            Permission::EditInspections => "edit_inspections",
            Permission::ViewCheckins => "view_checkins",
            Permission::ManageUsers => "manage_users",
            Permission::ViewReports => "view_reports",
        }
    }

    /// Exact match on the permission name
    pub fn parse(s: &str) -> Option<Self> {
        Permission::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table lookup over raw names. Unknown role or permission → false.
pub fn role_grants(role: &str, permission: &str) -> bool {
    match (Role::parse(role), Permission::parse(permission)) {
        (Some(role), Some(permission)) => role.grants(permission),
        _ => false,
    }
}

/// Permissions a user holds at `site_id`.
///
/// Admins get everything regardless of assignments. Otherwise this is the
/// union over the user's assignments at that site only.
pub fn effective_permissions(
    is_admin: bool,
    assignments: &[SiteAssignment],
    user_email: &str,
    site_id: &str,
) -> BTreeSet<Permission> {
    if is_admin {
        return Permission::ALL.into_iter().collect();
    }

    assignments
        .iter()
        .filter(|a| a.site_id == site_id && a.user_email.eq_ignore_ascii_case(user_email))
        .flat_map(|a| a.role.permissions().iter().copied())
        .collect()
}
