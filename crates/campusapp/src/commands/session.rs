//! Login, logout and whoami.

use super::{CmdMessage, CmdResult};
use crate::client::{ApiClient, Payload, Verb};
use crate::error::{CampusError, Result};
use crate::session::{Session, SessionUser};
use crate::store::backend::StorageBackend;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

pub const LOGIN_PATH: &str = "/api/login";

#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(length(min = 1), email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user: SessionUser,
    pub signed_in_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Exchange credentials for a token and persist the session. The client
/// picks up the new token.
pub fn login<B: StorageBackend>(
    client: &mut ApiClient,
    session: &mut Session<B>,
    credentials: Credentials,
) -> Result<CmdResult<SessionUser>> {
    credentials.validate()?;
    let body = json!({
        "email": credentials.email.trim().to_lowercase(),
        "password": credentials.password,
    });
    let envelope = client.perform(Verb::Post, LOGIN_PATH, &[], Some(Payload::Json(body)))?;

    let token = envelope
        .string("token")
        .or_else(|| envelope.string("accessToken"))
        .map(str::to_string)
        .ok_or_else(|| CampusError::Api("login response carried no token".to_string()))?;
    let user: SessionUser = envelope
        .item(&["user", "admin", "data"])?
        .ok_or_else(|| CampusError::Api("login response carried no user".to_string()))?;

    session.sign_in(token, user.clone())?;
    client.set_token(session.token().map(str::to_string));
    Ok(CmdResult::new()
        .with_message(CmdMessage::success(format!(
            "Signed in as {} <{}>",
            user.name, user.email
        )))
        .with_data(user))
}

pub fn logout<B: StorageBackend>(
    client: &mut ApiClient,
    session: &mut Session<B>,
) -> Result<CmdResult> {
    let was_active = session.is_active();
    session.sign_out()?;
    client.set_token(None);
    Ok(CmdResult::new().with_message(if was_active {
        CmdMessage::success("Signed out")
    } else {
        CmdMessage::info("Not signed in")
    }))
}

pub fn whoami<B: StorageBackend>(session: &Session<B>) -> Result<CmdResult<WhoAmI>> {
    let user = session.require_user()?.clone();
    Ok(CmdResult::new().with_data(WhoAmI {
        user,
        signed_in_at: session.signed_in_at(),
        expires_at: session.expires_at(),
    }))
}
