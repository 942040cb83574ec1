//! Gallery albums.
//!
//! Albums are sent as multipart forms. Creating one requires at least one
//! file. Editing stages file changes in a [`ChangeSet`] and commits them with
//! the field edits in a single `PUT`: new uploads under `files`, removed
//! URLs as repeated `filesToRemove` fields.

use super::{load_notice, refresh, CmdMessage, CmdResult};
use crate::client::{MultipartBody, Payload};
use crate::editor::Editor;
use crate::error::{CampusError, Result};
use crate::listing::{ListState, Page};
use crate::model::{GalleryCategory, GalleryFilter, GalleryItem};
use crate::staging::{ChangeSet, CommitPlan, FileChange};
use crate::store::resource::ResourceStore;
use crate::store::Repository;
use std::path::PathBuf;
use tracing::info;
use validator::Validate;

pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct GalleryDraft {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    #[validate(required)]
    pub category: Option<GalleryCategory>,
}

impl GalleryDraft {
    pub fn from_record(item: &GalleryItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            category: Some(item.category),
        }
    }

    fn body(&self, plan: &CommitPlan) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("title", self.title.trim())
            .text("description", self.description.trim());
        if let Some(category) = self.category {
            body = body.text("category", category.as_str());
        }
        for url in &plan.removals {
            body = body.text("filesToRemove", url.as_str());
        }
        for path in &plan.uploads {
            body = body.file("files", path.clone());
        }
        body
    }
}

pub fn list<R: Repository<GalleryItem>>(
    store: &mut ResourceStore<GalleryItem, R>,
    state: &mut ListState<GalleryFilter>,
) -> Result<CmdResult<Page<GalleryItem>>> {
    let mut result = CmdResult::new();
    if let Some(notice) = load_notice(&store.load(), "gallery items") {
        result.add_message(notice);
    }
    Ok(result.with_data(store.view(state)))
}

pub fn create<R: Repository<GalleryItem>>(
    store: &mut ResourceStore<GalleryItem, R>,
    draft: GalleryDraft,
    files: Vec<PathBuf>,
) -> Result<CmdResult<GalleryItem>> {
    let mut result = CmdResult::new();
    let mut changes = ChangeSet::new(Vec::new()).requiring_files();
    for path in files {
        changes.stage(FileChange::Add(path))?;
    }

    let mut editor = Editor::new();
    editor.open_create(draft);
    let (title, created) = editor.submit(|_, draft| {
        let created = changes.commit(|plan| {
            store
                .repository()
                .create(Payload::Multipart(draft.body(plan)))
        })?;
        Ok((draft.title.clone(), created))
    })?;

    info!(title = %title, "gallery item created");
    refresh(store, "gallery items", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Gallery item created: {}",
        title
    )));
    let created = created.or_else(|| store.records().iter().find(|i| i.title == title).cloned());
    Ok(match created {
        Some(item) => result.with_data(item),
        None => result,
    })
}

/// Apply field edits and staged file changes in one request.
pub fn update<R: Repository<GalleryItem>>(
    store: &mut ResourceStore<GalleryItem, R>,
    id: &str,
    change: impl FnOnce(&mut GalleryDraft),
    file_changes: Vec<FileChange>,
) -> Result<CmdResult<GalleryItem>> {
    let mut result = CmdResult::new();
    store.load_fresh()?;
    let existing = store
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::NotFound(format!("gallery item {}", id)))?;

    let mut changes = ChangeSet::new(existing.files.clone()).requiring_files();
    for file_change in file_changes {
        changes.stage(file_change)?;
    }

    let mut draft = GalleryDraft::from_record(&existing);
    change(&mut draft);
    let mut editor = Editor::new();
    editor.open_edit(id, draft);
    let updated = editor.submit(|_, draft| {
        changes.commit(|plan| {
            store
                .repository()
                .update(id, Payload::Multipart(draft.body(plan)))
        })
    })?;

    refresh(store, "gallery items", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Gallery item updated: {}",
        existing.title
    )));
    let updated = updated.or_else(|| store.find(id).cloned());
    Ok(match updated {
        Some(item) => result.with_data(item),
        None => result,
    })
}

pub fn delete<R: Repository<GalleryItem>>(
    store: &mut ResourceStore<GalleryItem, R>,
    id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::new();
    store.repository().delete(id)?;
    refresh(store, "gallery items", &mut result);
    result.add_message(CmdMessage::success(format!("Gallery item deleted: {}", id)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileType;
    use crate::store::rest::RestRepository;
    use crate::test_utils::test_client;
    use mockito::Matcher;
    use std::fs;
    use tempfile::TempDir;

    fn store(
        server: &mockito::ServerGuard,
    ) -> ResourceStore<GalleryItem, RestRepository<GalleryItem>> {
        ResourceStore::new(RestRepository::new(test_client(server)))
    }

    fn sports_day() -> GalleryDraft {
        GalleryDraft {
            title: "Sports Day".into(),
            description: String::new(),
            category: Some(GalleryCategory::SportsDay),
        }
    }

    #[test]
    fn create_sports_day_with_one_image() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("relay.jpg");
        fs::write(&photo, b"jpeg bytes").unwrap();

        let mut server = mockito::Server::new();
        let post = server
            .mock("POST", "/api/gallery")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("SPORTS_DAY".into()),
                Matcher::Regex("relay.jpg".into()),
            ]))
            .with_body(r#"{"success": true}"#)
            .create();
        server
            .mock("GET", "/api/gallery")
            .with_body(
                r#"{"success": true, "gallery": [{"_id": "g1", "title": "Sports Day",
                    "category": "SPORTS_DAY", "files": ["/uploads/relay.jpg"]}]}"#,
            )
            .create();
        let mut store = store(&server);

        let created = create(&mut store, sports_day(), vec![photo])
            .unwrap()
            .data
            .unwrap();

        post.assert();
        assert_eq!(store.records().len(), 1);
        assert_eq!(created.file_type(), FileType::Image);
        assert_eq!(created.file_count(), 1);
    }

    #[test]
    fn create_without_files_never_posts() {
        let mut server = mockito::Server::new();
        let post = server.mock("POST", "/api/gallery").expect(0).create();
        let mut store = store(&server);

        let err = create(&mut store, sports_day(), vec![]).unwrap_err();

        assert!(matches!(err, CampusError::Validation(_)));
        post.assert();
    }

    #[test]
    fn create_without_category_never_posts() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("a.png");
        fs::write(&photo, b"png").unwrap();
        let mut server = mockito::Server::new();
        let post = server.mock("POST", "/api/gallery").expect(0).create();
        let mut store = store(&server);
        let mut draft = sports_day();
        draft.category = None;

        assert!(create(&mut store, draft, vec![photo]).is_err());
        post.assert();
    }

    #[test]
    fn update_sends_removals_and_uploads_together() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("final.mp4");
        fs::write(&clip, b"mp4").unwrap();

        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/gallery")
            .with_body(
                r#"{"success": true, "gallery": [{"_id": "g1", "title": "Finals",
                    "category": "FOOTBALL", "files": ["/uploads/a.jpg", "/uploads/b.jpg"]}]}"#,
            )
            .create();
        let put = server
            .mock("PUT", "/api/gallery/g1")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("filesToRemove".into()),
                Matcher::Regex("/uploads/a.jpg".into()),
                Matcher::Regex("final.mp4".into()),
                Matcher::Regex("Cup Final".into()),
            ]))
            .with_body(r#"{"success": true}"#)
            .expect(1)
            .create();
        let mut store = store(&server);

        update(
            &mut store,
            "g1",
            |d| d.title = "Cup Final".into(),
            vec![
                FileChange::Remove("/uploads/a.jpg".into()),
                FileChange::Add(clip),
            ],
        )
        .unwrap();

        put.assert();
    }

    #[test]
    fn removing_every_file_is_rejected_client_side() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/gallery")
            .with_body(
                r#"{"success": true, "gallery": [{"_id": "g1", "title": "Finals",
                    "category": "FOOTBALL", "files": ["/uploads/a.jpg"]}]}"#,
            )
            .create();
        let put = server.mock("PUT", "/api/gallery/g1").expect(0).create();
        let mut store = store(&server);

        let err = update(
            &mut store,
            "g1",
            |_| {},
            vec![FileChange::Remove("/uploads/a.jpg".into())],
        )
        .unwrap_err();

        assert!(matches!(err, CampusError::Validation(_)));
        put.assert();
    }

    #[test]
    fn update_reports_a_failed_lookup_as_transport_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/gallery").with_status(500).create();
        let put = server.mock("PUT", "/api/gallery/g1").expect(0).create();
        let mut store = store(&server);

        let err = update(&mut store, "g1", |d| d.title = "Cup Final".into(), vec![]).unwrap_err();

        assert!(matches!(err, CampusError::Transport { .. }));
        assert_eq!(err.user_message(), "Could not reach the server. Please try again.");
        put.assert();
    }

    #[test]
    fn category_and_type_filters() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/gallery")
            .with_body(
                r#"[{"id": 1, "title": "Relay", "category": "SPORTS_DAY", "files": ["r.mp4"]},
                    {"id": 2, "title": "Gowns", "category": "GRADUATION", "files": ["g.jpg"]},
                    {"id": 3, "title": "Long jump", "category": "SPORTS_DAY", "files": ["l.png"]}]"#,
            )
            .create();
        let mut store = store(&server);
        let mut state = ListState::new(PAGE_SIZE);
        state.set_filter(GalleryFilter {
            category: crate::listing::Choice::Only(GalleryCategory::SportsDay),
            file_type: crate::listing::Choice::Only(FileType::Image),
        });

        let page = list(&mut store, &mut state).unwrap().data.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Long jump");
    }
}
