use super::backend::StorageBackend;
use super::Repository;
use crate::client::Payload;
use crate::error::{CampusError, Result};
use crate::model::{AdminRecord, Record};
use chrono::Utc;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

/// A record that can be kept in a local JSON document.
pub trait LocalRecord: Record {
    const STORAGE_KEY: &'static str;
}

impl LocalRecord for AdminRecord {
    const STORAGE_KEY: &'static str = "admins";
}

/// A collection persisted as one JSON array on a [`StorageBackend`].
///
/// Ids are assigned on create (UUID v4) and `createdAt`/`updatedAt` are
/// stamped here, playing the part a server would. File uploads are not
/// supported.
pub struct LocalRepository<T, B> {
    backend: B,
    _record: PhantomData<T>,
}

impl<T: LocalRecord, B: StorageBackend> LocalRepository<T, B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            _record: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn load_all(&self) -> Result<Vec<T>> {
        match self.backend.load(T::STORAGE_KEY)? {
            Some(content) if !content.trim().is_empty() => Ok(serde_json::from_str(&content)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save_all(&self, records: &[T]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        self.backend.save(T::STORAGE_KEY, &content)
    }

    /// Overwrite the whole collection.
    pub fn replace_all(&self, records: &[T]) -> Result<()> {
        self.save_all(records)
    }

    fn fields(payload: Payload) -> Result<Map<String, Value>> {
        match payload {
            Payload::Json(Value::Object(map)) => Ok(map),
            Payload::Json(other) => Err(CampusError::Validation(format!(
                "expected an object, got {}",
                other
            ))),
            Payload::Multipart(_) => Err(CampusError::Store(format!(
                "the local {} store does not accept file uploads",
                T::NOUN
            ))),
        }
    }
}

impl<T: LocalRecord, B: StorageBackend> Repository<T> for LocalRepository<T, B> {
    fn list(&self) -> Result<Vec<T>> {
        self.load_all()
    }

    fn create(&self, payload: Payload) -> Result<Option<T>> {
        let mut fields = Self::fields(payload)?;
        let has_id = fields
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            fields.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        let now = Value::String(Utc::now().to_rfc3339());
        fields.entry("createdAt").or_insert_with(|| now.clone());
        fields.insert("updatedAt".into(), now);

        let record: T = serde_json::from_value(Value::Object(fields))?;
        let mut records = self.load_all()?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(CampusError::Store(format!(
                "{} {} already exists",
                T::NOUN,
                record.id()
            )));
        }
        records.push(record.clone());
        self.save_all(&records)?;
        debug!(key = T::STORAGE_KEY, id = record.id(), "created local record");
        Ok(Some(record))
    }

    fn update(&self, id: &str, payload: Payload) -> Result<Option<T>> {
        let changes = Self::fields(payload)?;
        let mut records = self.load_all()?;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CampusError::NotFound(format!("{} {}", T::NOUN, id)))?;

        let mut merged = match serde_json::to_value(&records[index])? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in changes {
            if key != "id" && key != "createdAt" {
                merged.insert(key, value);
            }
        }
        merged.insert("updatedAt".into(), Value::String(Utc::now().to_rfc3339()));

        let record: T = serde_json::from_value(Value::Object(merged))?;
        records[index] = record.clone();
        self.save_all(&records)?;
        Ok(Some(record))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(CampusError::NotFound(format!("{} {}", T::NOUN, id)));
        }
        self.save_all(&records)
    }

    fn describe(&self) -> String {
        self.backend.location(T::STORAGE_KEY).display().to_string()
    }
}
