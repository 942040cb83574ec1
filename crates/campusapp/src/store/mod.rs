//! # Storage Layer
//!
//! Every collection the client manages sits behind the [`Repository`] trait:
//! list, create, update and delete. Who actually holds the records is a
//! backend choice, not something the command layer knows about.
//!
//! ## Implementations
//!
//! - [`rest::RestRepository`]: the site's HTTP API. Campaigns, gallery items,
//!   guidance sessions and the homepage feeds live here.
//! - [`local::LocalRepository`]: JSON documents on a [`backend::StorageBackend`].
//!   Administrators live here; the API only knows how to register them.
//! - [`singleton::SchoolInfoStore`]: the one-or-none school profile, which has
//!   no id and therefore no collection semantics.
//!
//! ## Server Is Truth
//!
//! [`resource::ResourceStore`] wraps a repository with the in-memory copy the
//! commands read from. It is only ever replaced wholesale by a successful
//! list call; mutations never patch it in place. After any create, update or
//! delete the caller reloads.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── admins.json     # LocalRepository<AdminRecord>
//! └── session.json    # Session token and user
//! ```

use crate::client::Payload;
use crate::error::Result;
use crate::model::Record;

pub mod backend;
pub mod fs_backend;
pub mod local;
pub mod mem_backend;
pub mod resource;
pub mod rest;
pub mod singleton;

/// CRUD over one collection of records.
pub trait Repository<T: Record> {
    fn list(&self) -> Result<Vec<T>>;

    /// Returns the created record when the backend echoes it back.
    fn create(&self, payload: Payload) -> Result<Option<T>>;

    fn update(&self, id: &str, payload: Payload) -> Result<Option<T>>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Where the records live, for logs (`GET /api/gallery`, `admins.json`).
    fn describe(&self) -> String;
}

impl<T: Record, R: Repository<T> + ?Sized> Repository<T> for &R {
    fn list(&self) -> Result<Vec<T>> {
        (**self).list()
    }

    fn create(&self, payload: Payload) -> Result<Option<T>> {
        (**self).create(payload)
    }

    fn update(&self, id: &str, payload: Payload) -> Result<Option<T>> {
        (**self).update(id, payload)
    }

    fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
