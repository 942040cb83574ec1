use crate::client::{ApiClient, Envelope, Payload, Verb};
use crate::error::{CampusError, Result};
use crate::model::SchoolInfo;
use serde_json::Value;
use tracing::debug;

pub const SCHOOL_INFO_PATH: &str = "/api/school-info";
const ITEM_KEYS: &[&str] = &["schoolInfo", "school", "data"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// The school profile: at most one exists, and it has no id.
pub struct SchoolInfoStore {
    client: ApiClient,
}

impl SchoolInfoStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn fetch(&self) -> Result<Option<SchoolInfo>> {
        let envelope = self.client.get(SCHOOL_INFO_PATH)?;
        Self::extract(&envelope)
    }

    fn extract(envelope: &Envelope) -> Result<Option<SchoolInfo>> {
        for key in ITEM_KEYS {
            match envelope.payload.get(*key) {
                Some(value @ Value::Object(_)) => {
                    return Ok(Some(serde_json::from_value(value.clone())?));
                }
                Some(Value::Array(items)) => {
                    return match items.first() {
                        Some(first) => Ok(Some(serde_json::from_value(first.clone())?)),
                        None => Ok(None),
                    };
                }
                _ => {}
            }
        }
        // Profile fields sent at the top level of the envelope.
        if envelope.payload.contains_key("name") {
            let value = Value::Object(envelope.payload.clone());
            return Ok(Some(serde_json::from_value(value)?));
        }
        Ok(None)
    }

    /// Refused when a profile already exists, so a second profile is never
    /// posted.
    pub fn create(&self, info: &SchoolInfo) -> Result<()> {
        if self.fetch()?.is_some() {
            return Err(CampusError::Refused(
                "School information already exists. Edit it instead.".to_string(),
            ));
        }
        self.send(Verb::Post, info)
    }

    /// Replace the existing profile.
    pub fn update(&self, info: &SchoolInfo) -> Result<()> {
        self.send(Verb::Put, info)
    }

    pub fn delete(&self) -> Result<()> {
        self.client
            .perform(Verb::Delete, SCHOOL_INFO_PATH, &[], None)
            .map(|_| ())
    }

    fn send(&self, verb: Verb, info: &SchoolInfo) -> Result<()> {
        debug!(verb = %verb, name = %info.name, "saving school information");
        let payload = Payload::Json(serde_json::to_value(info)?);
        self.client
            .perform(verb, SCHOOL_INFO_PATH, &[], Some(payload))
            .map(|_| ())
    }
}
