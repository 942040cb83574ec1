//! # Action Dispatcher
//!
//! Every remote call goes through [`ApiClient::perform`]: one verb, one path,
//! an optional payload, and a `{success, error?, ...}` envelope back.
//!
//! ## Error Taxonomy
//!
//! - **Transport**: the request never got a usable answer. Network failure,
//!   a non-2xx status without an envelope, or a body that is not JSON.
//!   Surfaced to users with a generic message; the detail is logged.
//! - **Application**: the server answered with `success: false`. Its `error`
//!   (or `message`) string is passed through verbatim, whatever the status.
//!
//! Nothing is retried. Requests are bounded by the configured timeout and
//! carry `Authorization: Bearer <token>` while a session is active.
//!
//! ## Payloads
//!
//! Drafts serialize to JSON unless they carry files, in which case they are
//! sent as `multipart/form-data` ([`MultipartBody`]). Array fields become
//! repeated form fields (`filesToRemove`, `filesToRemove`, ...).

use crate::error::{CampusError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn method(&self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, PathBuf)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a JSON object into text fields. Arrays become repeated fields,
    /// nulls are skipped, nested objects are sent as JSON text.
    pub fn from_fields(value: &Value) -> Self {
        let mut body = Self::new();
        if let Value::Object(map) = value {
            for (key, v) in map {
                body.push_value(key, v);
            }
        }
        body
    }

    fn push_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.fields.push((key.to_string(), s.clone())),
            Value::Array(items) => {
                for item in items {
                    self.push_value(key, item);
                }
            }
            other => self.fields.push((key.to_string(), other.to_string())),
        }
    }

    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn file(mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push((key.into(), path.into()));
        self
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn field_values(&self, key: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn into_form(self) -> Result<reqwest::blocking::multipart::Form> {
        let mut form = reqwest::blocking::multipart::Form::new();
        for (key, value) in self.fields {
            form = form.text(key, value);
        }
        for (key, path) in self.files {
            form = form.file(key, &path).map_err(|e| {
                CampusError::Validation(format!("cannot read {}: {}", path.display(), e))
            })?;
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartBody),
}

impl Payload {
    /// JSON when there is nothing to upload, multipart otherwise.
    pub fn from_draft(value: Value, files: Vec<(String, PathBuf)>) -> Self {
        if files.is_empty() {
            Payload::Json(value)
        } else {
            let mut body = MultipartBody::from_fields(&value);
            body.files = files;
            Payload::Multipart(body)
        }
    }

    fn describe(&self) -> String {
        match self {
            Payload::Json(_) => "json".to_string(),
            Payload::Multipart(body) => format!(
                "multipart ({} fields, {} files)",
                body.fields.len(),
                body.files.len()
            ),
        }
    }
}

/// The `{success, error?, message?, ...payload}` answer every endpoint returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
    pub payload: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    success: Option<bool>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Envelope {
    /// Parse a response body. A bare JSON array is accepted as a successful
    /// envelope with the array under `data`. An object without `success` is
    /// successful unless it carries an `error`.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| CampusError::transport(None, format!("response is not JSON: {}", e)))?;

        match value {
            Value::Array(items) => {
                let mut payload = Map::new();
                payload.insert("data".to_string(), Value::Array(items));
                Ok(Envelope {
                    success: true,
                    error: None,
                    message: None,
                    payload,
                })
            }
            Value::Object(_) => {
                let raw: RawEnvelope = serde_json::from_value(value).map_err(|e| {
                    CampusError::transport(None, format!("malformed envelope: {}", e))
                })?;
                let error = raw.error.and_then(|e| match e {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                });
                Ok(Envelope {
                    success: raw.success.unwrap_or(error.is_none()),
                    error,
                    message: raw.message,
                    payload: raw.payload,
                })
            }
            other => Err(CampusError::transport(
                None,
                format!("unexpected response body: {}", other),
            )),
        }
    }

    /// The message to show when `success` is false.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "The server rejected the request".to_string())
    }

    /// Deserialize a list from the first of `keys` holding an array, falling
    /// back to any array-valued field.
    pub fn list<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<Vec<T>> {
        let found = keys
            .iter()
            .filter_map(|k| self.payload.get(*k))
            .find(|v| v.is_array())
            .or_else(|| self.payload.values().find(|v| v.is_array()));

        match found {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Deserialize a single object from the first of `keys` holding one.
    pub fn item<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<Option<T>> {
        let found = keys
            .iter()
            .filter_map(|k| self.payload.get(*k))
            .find(|v| v.is_object());

        match found {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Blocking HTTP client bound to the site's base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CampusError::Config(format!("invalid api_url '{}': {}", base_url, e)))?;
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()
            .map_err(|e| CampusError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping any path prefix the base has.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| CampusError::Api(format!("invalid request path '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub fn perform(
        &self,
        verb: Verb,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<Payload>,
    ) -> Result<Envelope> {
        let url = self.url(path, query)?;
        debug!(
            verb = %verb,
            url = %url,
            payload = %payload.as_ref().map(Payload::describe).unwrap_or_default(),
            "dispatching request"
        );

        let mut request = self.http.request(verb.method(), url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request = match payload {
            Some(Payload::Json(value)) => request.json(&value),
            Some(Payload::Multipart(body)) => request.multipart(body.into_form()?),
            None => request,
        };

        let response = request.send().map_err(|e| {
            warn!(verb = %verb, url = %url, error = %e, "request failed");
            CampusError::from(e)
        })?;
        let status = response.status();
        let body = response.text().map_err(CampusError::from)?;

        if !status.is_success() {
            // A rejected request that still explains itself is an application error.
            if let Ok(envelope) = Envelope::parse(&body) {
                if !envelope.success && (envelope.error.is_some() || envelope.message.is_some()) {
                    warn!(verb = %verb, url = %url, status = %status, "request rejected");
                    return Err(CampusError::Application(envelope.failure_message()));
                }
            }
            warn!(verb = %verb, url = %url, status = %status, "unexpected status");
            return Err(CampusError::transport(
                Some(status.as_u16()),
                truncate(&body, 200),
            ));
        }

        let envelope = Envelope::parse(&body)?;
        if !envelope.success {
            warn!(verb = %verb, url = %url, "request rejected");
            return Err(CampusError::Application(envelope.failure_message()));
        }
        Ok(envelope)
    }

    pub fn get(&self, path: &str) -> Result<Envelope> {
        self.perform(Verb::Get, path, &[], None)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}…", cut)
    }
}
