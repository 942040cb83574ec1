//! # Session
//!
//! The signed-in admin and their bearer token. Tokens are issued by the
//! site's login endpoint; this module only keeps them.
//!
//! The session is persisted as one document (`session.json`) on a
//! [`StorageBackend`], so it survives between CLI invocations. On startup
//! [`Session::init_from_storage`] restores it, dropping it if it is
//! unreadable or its token has expired.
//!
//! Tokens are treated as opaque except for one thing: when a token looks like
//! a JWT, its `exp` claim is read (without verifying the signature) so an
//! expired token is never sent.

use crate::error::{CampusError, Result};
use crate::model::{AdminRecord, Permissions, Role};
use crate::store::backend::StorageBackend;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

pub const SESSION_KEY: &str = "session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(alias = "_id", deserialize_with = "crate::model::id_from_any")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
}

impl SessionUser {
    /// Whether `admin` is this user. Matched by id, or by email for records
    /// created before the server assigned an id.
    pub fn is(&self, admin: &AdminRecord) -> bool {
        admin.id == self.id || admin.email.eq_ignore_ascii_case(&self.email)
    }

    /// The admin-list entry for this user.
    pub fn to_admin(&self) -> AdminRecord {
        AdminRecord {
            id: self.id.clone(),
            name: if self.name.is_empty() {
                self.email.clone()
            } else {
                self.name.clone()
            },
            email: self.email.clone(),
            phone: String::new(),
            role: self.role,
            status: Default::default(),
            permissions: Permissions::for_role(self.role),
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

fn lenient_role<'de, D>(deserializer: D) -> std::result::Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()).unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    token: String,
    user: SessionUser,
    signed_in_at: DateTime<Utc>,
}

pub struct Session<B> {
    backend: B,
    current: Option<StoredSession>,
}

impl<B: StorageBackend> Session<B> {
    /// Restore the persisted session, if any and still valid.
    pub fn init_from_storage(backend: B) -> Result<Self> {
        let current = match backend.load(SESSION_KEY)? {
            None => None,
            Some(content) => match serde_json::from_str::<StoredSession>(&content) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable session");
                    backend.remove(SESSION_KEY)?;
                    None
                }
            },
        };
        let mut session = Self { backend, current };
        session.expire_if_stale(Utc::now())?;
        Ok(session)
    }

    pub fn sign_in(&mut self, token: String, user: SessionUser) -> Result<()> {
        if token.trim().is_empty() {
            return Err(CampusError::Api("login returned an empty token".to_string()));
        }
        let stored = StoredSession {
            token,
            user,
            signed_in_at: Utc::now(),
        };
        self.backend
            .save(SESSION_KEY, &serde_json::to_string_pretty(&stored)?)?;
        info!(email = %stored.user.email, "signed in");
        self.current = Some(stored);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.backend.remove(SESSION_KEY)?;
        if let Some(stored) = self.current.take() {
            info!(email = %stored.user.email, "signed out");
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn signed_in_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|s| s.signed_in_at)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token().and_then(token_expiry)
    }

    /// The signed-in user, or a refusal telling the caller to log in.
    pub fn require_user(&self) -> Result<&SessionUser> {
        self.user()
            .ok_or_else(|| CampusError::Refused("Not signed in. Log in first.".to_string()))
    }

    /// Whether `admin` is the signed-in user.
    pub fn is_self(&self, admin: &AdminRecord) -> bool {
        self.user().is_some_and(|user| user.is(admin))
    }

    /// Sign out if the token expired before `now`. Returns true if it did.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.expires_at() {
            Some(exp) if exp <= now => {
                warn!(expired_at = %exp, "session token expired");
                self.sign_out()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// The `exp` claim of a JWT, if `token` is one.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, claims, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    let bytes = URL_SAFE_NO_PAD.decode(claims.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
