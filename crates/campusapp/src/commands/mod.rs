//! # Command Layer
//!
//! The business logic of every admin screen, one submodule per resource.
//! Commands are plain functions over a [`ResourceStore`] (or the client for
//! resources that have no collection), and they are UI-agnostic.
//!
//! ## What Commands Do
//!
//! Each mutating command follows the same shape:
//! 1. Load and check whatever must hold before anything is sent (the record
//!    exists, the admin is not deleting themselves, recipients resolve).
//! 2. Open an [`crate::editor::Editor`] on the draft and submit it, which
//!    validates required fields.
//! 3. Call the repository.
//! 4. Reload the store. The server is the source of truth; nothing is patched
//!    locally.
//! 5. Return a [`CmdResult`] with the data and notifications.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: messages are returned, never printed
//! - **Argument parsing**: the CLI builds drafts and filters
//! - **Retries**: a failed call fails once
//!
//! ## Testing Strategy
//!
//! Command tests use `LocalRepository` over `MemBackend` for admins and
//! `mockito` servers for the REST-backed modules.
//!
//! ## Command Modules
//!
//! - [`admins`]: admin list, register, edit, delete (never self)
//! - [`campaigns`]: email campaigns and sending
//! - [`gallery`]: media albums with staged file changes
//! - [`guidance`]: counselling sessions
//! - [`school_info`]: the school profile wizard
//! - [`homepage`]: public events, news and summary with sample fallback
//! - [`session`]: login, logout, whoami

use crate::model::Record;
use crate::store::resource::{LoadOutcome, ResourceStore};
use crate::store::Repository;
use serde::Serialize;

pub mod admins;
pub mod campaigns;
pub mod gallery;
pub mod guidance;
pub mod homepage;
pub mod school_info;
pub mod session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdResult<T = ()> {
    pub data: Option<T>,
    pub messages: Vec<CmdMessage>,
}

impl<T> Default for CmdResult<T> {
    fn default() -> Self {
        Self {
            data: None,
            messages: Vec::new(),
        }
    }
}

impl<T> CmdResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// The notification for a failed or degraded load, if one is due.
pub(crate) fn load_notice(outcome: &LoadOutcome, plural: &str) -> Option<CmdMessage> {
    match outcome {
        LoadOutcome::Loaded(_) | LoadOutcome::Superseded => None,
        LoadOutcome::Failed {
            error,
            fell_back: false,
        } => Some(CmdMessage::error(format!(
            "Failed to load {}: {}",
            plural,
            error.user_message()
        ))),
        LoadOutcome::Failed {
            error,
            fell_back: true,
        } => Some(CmdMessage::warning(format!(
            "Could not load {} ({}). Showing sample data.",
            plural,
            error.user_message()
        ))),
    }
}

/// Reload `store` after a mutation and note a failed refresh.
pub(crate) fn refresh<T: Record, R: Repository<T>, D>(
    store: &mut ResourceStore<T, R>,
    plural: &str,
    result: &mut CmdResult<D>,
) {
    let outcome = store.load();
    if let Some(notice) = load_notice(&outcome, plural) {
        result.add_message(notice);
    }
}
