//! Guidance and counselling sessions. Sent as multipart forms so a session
//! image can ride along; leaving the image out keeps the current one.

use super::{load_notice, refresh, CmdMessage, CmdResult};
use crate::client::{MultipartBody, Payload};
use crate::editor::Editor;
use crate::error::{CampusError, Result};
use crate::listing::{ListState, Page};
use crate::model::{GuidanceCategory, GuidanceFilter, GuidanceSession, Priority, SessionKind};
use crate::store::resource::ResourceStore;
use crate::store::Repository;
use chrono::NaiveDate;
use std::path::PathBuf;
use validator::{Validate, ValidationError};

pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct GuidanceDraft {
    #[validate(length(min = 1))]
    pub counselor: String,
    #[validate(required)]
    pub category: Option<GuidanceCategory>,
    #[validate(length(min = 1))]
    pub description: String,
    pub notes: Option<String>,
    #[validate(required)]
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub time: String,
    #[validate(required)]
    pub kind: Option<SessionKind>,
    #[validate(required)]
    pub priority: Option<Priority>,
    /// New image to upload. `None` keeps the current one.
    #[validate(custom(function = "image_is_readable"))]
    pub image: Option<PathBuf>,
}

#[allow(clippy::ptr_arg)]
fn image_is_readable(path: &PathBuf) -> std::result::Result<(), ValidationError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ValidationError::new("image"))
    }
}

impl GuidanceDraft {
    pub fn from_record(session: &GuidanceSession) -> Self {
        Self {
            counselor: session.counselor.clone(),
            category: Some(session.category),
            description: session.description.clone(),
            notes: session.notes.clone(),
            date: Some(session.date),
            time: session.time.clone(),
            kind: Some(session.kind),
            priority: Some(session.priority),
            image: None,
        }
    }

    fn body(&self) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("counselor", self.counselor.trim())
            .text("description", self.description.trim())
            .text("time", self.time.trim());
        if let Some(category) = self.category {
            body = body.text("category", category.as_str());
        }
        if let Some(date) = self.date {
            body = body.text("date", date.format("%Y-%m-%d").to_string());
        }
        if let Some(kind) = self.kind {
            body = body.text("type", kind.as_str());
        }
        if let Some(priority) = self.priority {
            body = body.text("priority", priority.as_str());
        }
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            body = body.text("notes", notes.trim());
        }
        if let Some(image) = &self.image {
            body = body.file("image", image.clone());
        }
        body
    }
}

pub fn list<R: Repository<GuidanceSession>>(
    store: &mut ResourceStore<GuidanceSession, R>,
    state: &mut ListState<GuidanceFilter>,
) -> Result<CmdResult<Page<GuidanceSession>>> {
    let mut result = CmdResult::new();
    if let Some(notice) = load_notice(&store.load(), "guidance sessions") {
        result.add_message(notice);
    }
    Ok(result.with_data(store.view(state)))
}

pub fn create<R: Repository<GuidanceSession>>(
    store: &mut ResourceStore<GuidanceSession, R>,
    draft: GuidanceDraft,
) -> Result<CmdResult<GuidanceSession>> {
    let mut result = CmdResult::new();
    let mut editor = Editor::new();
    editor.open_create(draft);
    let (counselor, created) = editor.submit(|_, draft| {
        let created = store
            .repository()
            .create(Payload::Multipart(draft.body()))?;
        Ok((draft.counselor.clone(), created))
    })?;

    refresh(store, "guidance sessions", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Guidance session created with {}",
        counselor
    )));
    Ok(match created {
        Some(session) => result.with_data(session),
        None => result,
    })
}

pub fn update<R: Repository<GuidanceSession>>(
    store: &mut ResourceStore<GuidanceSession, R>,
    id: &str,
    change: impl FnOnce(&mut GuidanceDraft),
) -> Result<CmdResult<GuidanceSession>> {
    let mut result = CmdResult::new();
    store.load_fresh()?;
    let existing = store
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::NotFound(format!("guidance session {}", id)))?;

    let mut draft = GuidanceDraft::from_record(&existing);
    change(&mut draft);
    let mut editor = Editor::new();
    editor.open_edit(id, draft);
    let updated = editor.submit(|_, draft| {
        store
            .repository()
            .update(id, Payload::Multipart(draft.body()))
    })?;

    refresh(store, "guidance sessions", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Guidance session updated: {} on {}",
        existing.counselor, existing.date
    )));
    Ok(match updated {
        Some(session) => result.with_data(session),
        None => result,
    })
}

pub fn delete<R: Repository<GuidanceSession>>(
    store: &mut ResourceStore<GuidanceSession, R>,
    id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::new();
    store.repository().delete(id)?;
    refresh(store, "guidance sessions", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Guidance session deleted: {}",
        id
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Choice;
    use crate::store::rest::RestRepository;
    use crate::test_utils::test_client;
    use mockito::Matcher;

    const SESSIONS: &str = r#"{"success": true, "guidance": [
        {"_id": "s1", "counselor": "Mrs. Okafor", "category": "Academics", "description": "Exam prep",
         "date": "2024-03-12", "time": "10:00", "type": "Guidance", "priority": "High"},
        {"_id": "s2", "counselor": "Mr. Bello", "category": "Drugs", "description": "Awareness talk",
         "date": "2024-03-14", "time": "13:00", "type": "Group Session", "priority": "Low"}
    ]}"#;

    fn store(
        server: &mockito::ServerGuard,
    ) -> ResourceStore<GuidanceSession, RestRepository<GuidanceSession>> {
        ResourceStore::new(RestRepository::new(test_client(server)))
    }

    #[test]
    fn missing_fields_block_the_request() {
        let mut server = mockito::Server::new();
        let post = server.mock("POST", "/api/guidance").expect(0).create();
        let mut store = store(&server);
        let draft = GuidanceDraft {
            counselor: "Mrs. Okafor".into(),
            ..Default::default()
        };

        let err = create(&mut store, draft).unwrap_err();

        match err {
            CampusError::Validation(msg) => {
                assert!(msg.contains("category"));
                assert!(msg.contains("priority"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        post.assert();
    }

    #[test]
    fn unreadable_image_is_listed_with_the_other_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let post = server.mock("POST", "/api/guidance").expect(0).create();
        let mut store = store(&server);
        let draft = GuidanceDraft {
            counselor: "Mrs. Okafor".into(),
            image: Some(dir.path().join("missing.jpg")),
            ..Default::default()
        };

        let err = create(&mut store, draft).unwrap_err();

        match err {
            CampusError::Validation(msg) => {
                assert!(msg.contains("image"));
                assert!(msg.contains("category"));
                assert!(msg.contains("description"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        post.assert();
    }

    #[test]
    fn readable_image_is_uploaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let photo = dir.path().join("session.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/guidance").with_body(SESSIONS).create();
        let put = server
            .mock("PUT", "/api/guidance/s1")
            .match_body(Matcher::Regex("session.jpg".into()))
            .with_body(r#"{"success": true}"#)
            .create();
        let mut store = store(&server);

        update(&mut store, "s1", |d| d.image = Some(photo.clone())).unwrap();

        put.assert();
    }

    #[test]
    fn update_does_not_mistake_an_outage_for_a_missing_session() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/guidance").with_status(500).create();
        let put = server.mock("PUT", "/api/guidance/s1").expect(0).create();
        let mut store = store(&server);

        let err = update(&mut store, "s1", |d| d.time = "11:00".into()).unwrap_err();

        assert!(matches!(err, CampusError::Transport { .. }));
        put.assert();
    }

    #[test]
    fn update_sends_multipart_with_type_field() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/guidance").with_body(SESSIONS).create();
        let put = server
            .mock("PUT", "/api/guidance/s1")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("Counseling".into()),
                Matcher::Regex("2024-03-12".into()),
            ]))
            .with_body(r#"{"success": true}"#)
            .create();
        let mut store = store(&server);

        update(&mut store, "s1", |d| d.kind = Some(SessionKind::Counseling)).unwrap();

        put.assert();
    }

    #[test]
    fn filters_by_priority_and_searches_category() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/guidance").with_body(SESSIONS).create();
        let mut store = store(&server);
        let mut state = ListState::new(PAGE_SIZE);

        state.set_search("drugs");
        let page = list(&mut store, &mut state).unwrap().data.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "s2");

        state.set_search("");
        state.update_filter(|f| f.priority = Choice::Only(Priority::High));
        let page = list(&mut store, &mut state).unwrap().data.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "s1");
    }

    #[test]
    fn server_message_is_passed_through() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/guidance").with_body(SESSIONS).create();
        server
            .mock("DELETE", "/api/guidance/s1")
            .with_status(403)
            .with_body(r#"{"success": false, "message": "Only the counselor may delete this"}"#)
            .create();
        let mut store = store(&server);

        let err = delete(&mut store, "s1").unwrap_err();
        assert_eq!(err.user_message(), "Only the counselor may delete this");
    }
}
