//! Client side of the changelog store service.
//!
//! The store persists published changelogs and serves them back newest
//! first. [`ChangelogStore`] is the seam the commands talk to;
//! [`HttpChangelogStore`] is the REST implementation.

pub mod http;
pub mod traits;
pub mod types;

pub use http::{DEFAULT_STORE_TIMEOUT, DEFAULT_STORE_URL, HttpChangelogStore};
pub use traits::ChangelogStore;
pub use types::{ChangelogRecord, ChangelogUpdate, ListQuery, NewChangelog};
