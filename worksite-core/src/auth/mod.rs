//! Session/auth gate: platform roles, bearer token, OAuth redirects

mod gate;
mod navigator;
mod roles;

pub use gate::{
    ACCESS_ROLES, AUTH_STATUS_PATH, AccessDecision, AuthGate, AuthStatus, AuthenticatedUser,
    LOGOUT_PATH,
};
pub use navigator::{LogNavigator, Navigator, Redirect};
pub use roles::{
    CURRENT_CONTEXT_PATH, PlatformRoleProvider, PlatformUser, RoleProvider, StaticRoleProvider,
};
