//! worksite-core: client layer for the Digital Worksite admin portal
//!
//! This crate sits between a front end and the worksite backend:
//!
//! - **Auth gate** - [`auth::AuthGate`] checks platform roles, the stored
//!   bearer token and drives the OAuth redirect
//! - **Permissions** - [`permissions::Role`] and [`permissions::Permission`],
//!   derived per site and never stored
//! - **Site context** - [`site::SiteContext`] holds the assigned sites and the
//!   active selection
//! - **Services** - one type per backend resource in [`services`], all sharing
//!   [`http::ApiClient`]
//! - **Uploads** - [`upload::UploadController`] picks inline or multipart
//!   upload and tracks progress
//! - **Persisted state** - [`storage::PersistedState`] over a
//!   [`storage::KeyValueStore`]
//!
//! # Quick Start
//!
//! ```no_run
//! use worksite_core::{ConfigLoader, Worksite};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load()?;
//!     worksite_core::logging::init(&config.logging)?;
//!
//!     let worksite = Worksite::from_config(&config)?;
//!     if !worksite.auth.check_auth_status().await {
//!         let _redirect = worksite.auth.redirect_to_auth(None);
//!         return Ok(());
//!     }
//!
//!     let context = worksite.mount_site_context().await;
//!     if context.has_permission("manage_users").await {
//!         let users = worksite.users.list(None).await?;
//!         println!("{} users", users.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod policy;
pub mod services;
pub mod site;
pub mod storage;
pub mod upload;
mod worksite;

pub use auth::{AccessDecision, AuthGate, Navigator, PlatformUser, Redirect, RoleProvider};
pub use config::{ConfigLoader, WorksiteConfig};
pub use error::{ConfigError, ServiceError, StorageError, TransportError, WorksiteError};
pub use self::http::{ApiClient, MockTransport, ReqwestTransport, Transport};
pub use permissions::{Permission, Role, effective_permissions, role_grants};
pub use policy::FailurePolicy;
pub use site::{SiteContext, SitePhase, SiteSnapshot};
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistedState};
pub use upload::{LocalFile, UploadController, UploadState, UploadStrategy};
pub use worksite::Worksite;
