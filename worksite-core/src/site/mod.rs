//! Active-site context: assigned sites, current selection, derived role
//!
//! The context is the only writer of site state. Readers take
//! [`SiteSnapshot`] copies or subscribe to changes.

mod context;
mod snapshot;

pub use context::SiteContext;
pub use snapshot::{SitePhase, SiteSnapshot};
