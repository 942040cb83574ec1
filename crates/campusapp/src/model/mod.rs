//! # Domain Model
//!
//! Typed records for every resource the school site exposes. The backend is an
//! external service, so these shapes are validated at the API boundary: every
//! field the server may omit is an `Option` or carries a serde default, and the
//! rest of the crate works with total functions instead of defensive lookups.
//!
//! ## Wire Conventions
//!
//! - JSON keys are camelCase (`createdAt`, `recipientCount`).
//! - Ids are strings. Servers that hand out numeric ids or Mongo-style `_id`
//!   keys are accepted and normalized by [`id_from_any`].
//! - Derived values (gallery `fileType`, `fileCount`) are computed, never stored.
//!
//! ## Records
//!
//! - [`admin::AdminRecord`]: site administrators (kept in the local store)
//! - [`campaign::EmailCampaign`]: email campaigns, `draft` → `published`
//! - [`gallery::GalleryItem`]: media albums in one of 28 fixed categories
//! - [`guidance::GuidanceSession`]: counselling sessions
//! - [`school::SchoolInfo`]: the singleton school profile
//! - [`public`]: read-only homepage data

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub mod admin;
pub mod campaign;
pub mod gallery;
pub mod guidance;
pub mod public;
pub mod school;

pub use admin::{AdminFilter, AdminRecord, AdminStatus, Permissions, Role};
pub use campaign::{CampaignFilter, CampaignStatus, EmailCampaign};
pub use gallery::{FileType, GalleryCategory, GalleryFilter, GalleryItem};
pub use guidance::{GuidanceCategory, GuidanceFilter, GuidanceSession, Priority, SessionKind};
pub use public::{Event, NewsItem, SchoolSummary};
pub use school::{SchoolInfo, VideoType};

/// A record held in a resource collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Human-readable singular noun used in notifications ("gallery item").
    const NOUN: &'static str;

    fn id(&self) -> &str;

    /// Short label for notifications and confirmations.
    fn label(&self) -> &str;
}

/// Accepts string or integer ids and returns them as strings.
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Accepts `2024-05-01` as well as full timestamps like `2024-05-01T00:00:00.000Z`.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Case-insensitive lookup of a value in a fixed set of `(key, value)` pairs.
/// Keys are compared after stripping `-`, `_` and spaces, so `super-admin`,
/// `SUPER_ADMIN` and `Super Admin` all resolve the same way.
pub(crate) fn parse_choice<T: Copy>(input: &str, choices: &[(&str, T)]) -> Option<T> {
    let wanted = squash(input);
    choices
        .iter()
        .find(|(key, _)| squash(key) == wanted)
        .map(|(_, v)| *v)
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
