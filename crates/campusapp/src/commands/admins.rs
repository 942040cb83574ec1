//! Administrators.
//!
//! The admin list lives in the local store; the server only knows how to
//! register a new account (`POST /api/register`). Edits and deletes are
//! local. The signed-in admin can never be deleted.

use super::{load_notice, refresh, CmdMessage, CmdResult};
use crate::client::{ApiClient, Payload, Verb};
use crate::editor::Editor;
use crate::error::{CampusError, Result};
use crate::listing::{ListState, Page};
use crate::model::{AdminFilter, AdminRecord, AdminStatus, Permissions, Role};
use crate::session::SessionUser;
use crate::store::resource::ResourceStore;
use crate::store::Repository;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

pub const PAGE_SIZE: usize = 8;
pub const REGISTER_PATH: &str = "/api/register";

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AdminDraft {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1), email)]
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub status: AdminStatus,
    /// `None` grants the role's default permissions.
    pub permissions: Option<Permissions>,
    /// Required on create. Blank on edit means "unchanged".
    pub password: String,
}

impl AdminDraft {
    pub fn from_record(admin: &AdminRecord) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
            phone: admin.phone.clone(),
            role: admin.role,
            status: admin.status,
            permissions: Some(admin.permissions),
            password: String::new(),
        }
    }

    fn fields(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "email": self.email.trim().to_lowercase(),
            "phone": self.phone.trim(),
            "role": self.role,
            "status": self.status,
            "permissions": self
                .permissions
                .unwrap_or_else(|| Permissions::for_role(self.role)),
        })
    }
}

/// One row of the admin table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRow {
    #[serde(flatten)]
    pub admin: AdminRecord,
    pub is_self: bool,
    pub can_delete: bool,
}

impl AdminRow {
    pub fn new(admin: AdminRecord, me: Option<&SessionUser>) -> Self {
        let is_self = me.is_some_and(|user| user.is(&admin));
        Self {
            admin,
            is_self,
            can_delete: !is_self,
        }
    }
}

/// Creates accounts on the server.
pub trait Registrar {
    /// Returns the server's record of the new admin, when it sends one back.
    fn register(&self, draft: &AdminDraft) -> Result<Option<AdminRecord>>;
}

impl Registrar for ApiClient {
    fn register(&self, draft: &AdminDraft) -> Result<Option<AdminRecord>> {
        let body = json!({
            "name": draft.name.trim(),
            "email": draft.email.trim().to_lowercase(),
            "password": draft.password,
            "phone": draft.phone.trim(),
            "role": draft.role,
        });
        let envelope = self.perform(Verb::Post, REGISTER_PATH, &[], Some(Payload::Json(body)))?;
        envelope.item(&["user", "admin", "data"])
    }
}

pub fn list<R: Repository<AdminRecord>>(
    store: &mut ResourceStore<AdminRecord, R>,
    state: &mut ListState<AdminFilter>,
    me: Option<&SessionUser>,
) -> Result<CmdResult<Page<AdminRow>>> {
    let mut result = CmdResult::new();
    let outcome = store.load();
    if let Some(notice) = load_notice(&outcome, "admins") {
        result.add_message(notice);
    }

    if outcome.is_loaded() && store.records().is_empty() {
        if let Some(user) = me {
            let seed = serde_json::to_value(user.to_admin())?;
            store.repository().create(Payload::Json(seed))?;
            info!(email = %user.email, "seeded admin list from session");
            refresh(store, "admins", &mut result);
        }
    }

    let page = store.view(state).map(|admin| AdminRow::new(admin, me));
    Ok(result.with_data(page))
}

pub fn create<R: Repository<AdminRecord>>(
    store: &mut ResourceStore<AdminRecord, R>,
    registrar: &impl Registrar,
    draft: AdminDraft,
) -> Result<CmdResult<AdminRecord>> {
    let mut result = CmdResult::new();
    if let Some(notice) = load_notice(&store.load(), "admins") {
        result.add_message(notice);
    }

    let mut editor = Editor::new();
    editor.open_create(draft);
    let created = editor.submit(|_, draft| {
        if draft.password.is_empty() {
            return Err(CampusError::Validation(
                "missing required fields: password".to_string(),
            ));
        }
        let email = draft.email.trim();
        if store
            .records()
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email))
        {
            return Err(CampusError::Refused(format!(
                "An admin with email {} already exists",
                email
            )));
        }

        let registered = registrar.register(draft)?;
        let mut fields = draft.fields();
        if let Some(server_id) = registered.map(|r| r.id).filter(|id| !id.is_empty()) {
            fields["id"] = Value::String(server_id);
        }
        store.repository().create(Payload::Json(fields))
    })?;

    refresh(store, "admins", &mut result);
    let created = created.ok_or_else(|| CampusError::Store("admin was not stored".to_string()))?;
    info!(email = %created.email, "admin created");
    result.add_message(CmdMessage::success(format!(
        "Admin created: {} <{}>",
        created.name, created.email
    )));
    Ok(result.with_data(created))
}

pub fn update<R: Repository<AdminRecord>>(
    store: &mut ResourceStore<AdminRecord, R>,
    id: &str,
    change: impl FnOnce(&mut AdminDraft),
) -> Result<CmdResult<AdminRecord>> {
    let mut result = CmdResult::new();
    store.load_fresh()?;
    let existing = store
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::NotFound(format!("admin {}", id)))?;

    let mut draft = AdminDraft::from_record(&existing);
    change(&mut draft);
    let mut editor = Editor::new();
    editor.open_edit(id, draft);
    let updated = editor.submit(|mode, draft| {
        let id = mode.id().unwrap_or(id);
        store.repository().update(id, Payload::Json(draft.fields()))
    })?;

    refresh(store, "admins", &mut result);
    result.add_message(CmdMessage::success(format!("Admin updated: {}", existing.name)));
    Ok(match updated {
        Some(admin) => result.with_data(admin),
        None => result,
    })
}

/// Delete an admin. Deleting the signed-in admin is refused before anything
/// is loaded or changed.
pub fn delete<R: Repository<AdminRecord>>(
    store: &mut ResourceStore<AdminRecord, R>,
    id: &str,
    me: Option<&SessionUser>,
) -> Result<CmdResult> {
    let refuse = || CampusError::Refused("You cannot delete your own account".to_string());
    if me.is_some_and(|user| user.id == id) {
        return Err(refuse());
    }

    let mut result = CmdResult::new();
    store.load_fresh()?;
    let target = store
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::NotFound(format!("admin {}", id)))?;
    if me.is_some_and(|user| user.is(&target)) {
        return Err(refuse());
    }

    store.repository().delete(id)?;
    info!(email = %target.email, "admin deleted");
    refresh(store, "admins", &mut result);
    result.add_message(CmdMessage::success(format!("Admin deleted: {}", target.name)));
    Ok(result)
}
