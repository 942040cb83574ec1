//! # Campus Architecture
//!
//! Campus is a **UI-agnostic client library** for a school website's content
//! API: admins, email campaigns, the media gallery, guidance sessions, the
//! school profile and the public homepage. The `campus` binary is one client
//! of it; nothing in here knows about a terminal.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (the `campus` crate)                             │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns client/session/stores    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Editor submit, store reconciliation, notifications       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Repository trait: REST, local JSON, the school singleton │
//! │  - ResourceStore: the loaded collection                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Pattern, Many Resources
//!
//! Every collection is handled the same way:
//!
//! 1. A [`store::resource::ResourceStore`] loads the whole collection from its
//!    repository, replacing what it held.
//! 2. [`listing`] derives the visible page from a search term, enum filters
//!    and a page cursor.
//! 3. An [`editor::Editor`] holds the draft being created or edited and
//!    guards against double submits.
//! 4. The command sends the draft, then reloads the store. The server is the
//!    source of truth; nothing is patched in place.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: one module per resource
//! - [`store`]: repositories and storage backends
//! - [`model`]: typed records
//! - [`client`]: HTTP transport and the response envelope
//! - [`listing`], [`editor`], [`wizard`], [`staging`]: the shared building blocks
//! - [`session`]: the signed-in admin and token
//! - [`recipients`]: campaign recipient resolution
//! - [`requests`]: discarding superseded responses
//! - [`config`], [`init`]: configuration and wiring
//! - [`error`]: error types

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod init;
pub mod listing;
pub mod model;
pub mod recipients;
pub mod requests;
pub mod session;
pub mod staging;
pub mod store;
pub mod wizard;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
