//! Fixed-shape records returned by the resource services
//!
//! Backend JSON is normalized here; nothing past a service hands out raw
//! `serde_json::Value`s.

mod checkin;
mod document;
mod drive;
mod normalize;
mod notification;
mod site;
mod template;
mod user;

pub(crate) use normalize::{first_str, list_items, record};

pub use checkin::{CheckIn, CheckInFilter};
pub use document::{Document, DocumentDraft, DocumentFilter, DocumentStatus};
pub use drive::{DriveFile, FOLDER_MIME_TYPE, FileFilter, FileUpdate, ShareRequest};
pub use notification::{Notification, PushNotification};
pub use site::{FolderType, Site, SiteAssignment, SiteDraft, SiteFilter, derive_site_id};
pub use template::{Template, TemplateDraft, TemplateFilter};
pub use user::{User, UserDraft, UserFilter};
