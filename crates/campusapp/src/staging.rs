//! Two-phase file changes for records that own uploaded files.
//!
//! Edits to a record's files are staged locally first: new files are added
//! by path, existing files (by URL) are marked for removal. Nothing reaches
//! the server until [`ChangeSet::commit`], which hands one [`CommitPlan`] to
//! the caller so the whole intent list goes out as a single request.
//! [`ChangeSet::discard`] drops every intent.
//!
//! Rules enforced while staging and at commit:
//! - a file marked for removal cannot be uploaded again in the same commit;
//! - when files are required, the net file count after commit must be > 0.

use crate::error::{CampusError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Add(PathBuf),
    Remove(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// What a commit sends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPlan {
    pub uploads: Vec<PathBuf>,
    pub removals: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    existing: Vec<String>,
    adds: Vec<StagedFile>,
    removals: Vec<String>,
    require_files: bool,
}

impl ChangeSet {
    /// Start from the files the record currently has.
    pub fn new(existing: Vec<String>) -> Self {
        Self {
            existing,
            ..Self::default()
        }
    }

    /// Reject commits that would leave the record with no files.
    pub fn requiring_files(mut self) -> Self {
        self.require_files = true;
        self
    }

    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    pub fn staged_adds(&self) -> &[StagedFile] {
        &self.adds
    }

    pub fn staged_removals(&self) -> &[String] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removals.is_empty()
    }

    /// Files the record will have once the commit lands.
    pub fn net_file_count(&self) -> usize {
        self.existing.len() - self.removals.len() + self.adds.len()
    }

    pub fn stage(&mut self, change: FileChange) -> Result<()> {
        match change {
            FileChange::Add(path) => self.stage_add(path),
            FileChange::Remove(url) => self.stage_removal(url),
        }
    }

    fn stage_add(&mut self, path: PathBuf) -> Result<()> {
        let meta = fs::metadata(&path).map_err(|e| {
            CampusError::Validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        if !meta.is_file() {
            return Err(CampusError::Validation(format!(
                "{} is not a file",
                path.display()
            )));
        }
        let name = file_name(&path.to_string_lossy());
        if self.removals.iter().any(|url| file_name(url) == name) {
            return Err(CampusError::Refused(format!(
                "{} is marked for removal and cannot be uploaded again in the same save",
                name
            )));
        }
        if self.adds.iter().any(|f| f.path == path) {
            return Ok(());
        }
        debug!(file = %path.display(), size = meta.len(), "staged upload");
        self.adds.push(StagedFile {
            path,
            name,
            size: meta.len(),
        });
        Ok(())
    }

    fn stage_removal(&mut self, url: String) -> Result<()> {
        if !self.existing.contains(&url) {
            return Err(CampusError::NotFound(format!("file {}", url)));
        }
        let name = file_name(&url);
        if self.adds.iter().any(|f| f.name == name) {
            return Err(CampusError::Refused(format!(
                "{} is staged for upload; unstage it before removing the original",
                name
            )));
        }
        if !self.removals.contains(&url) {
            debug!(file = %url, "staged removal");
            self.removals.push(url);
        }
        Ok(())
    }

    /// Drop a staged upload.
    pub fn unstage(&mut self, path: &Path) {
        self.adds.retain(|f| f.path != path);
    }

    /// Keep a file previously marked for removal.
    pub fn restore(&mut self, url: &str) {
        self.removals.retain(|u| u != url);
    }

    pub fn discard(&mut self) {
        self.adds.clear();
        self.removals.clear();
    }

    pub fn validate(&self) -> Result<()> {
        if self.require_files && self.net_file_count() == 0 {
            return Err(CampusError::Validation(
                "at least one file is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn plan(&self) -> CommitPlan {
        CommitPlan {
            uploads: self.adds.iter().map(|f| f.path.clone()).collect(),
            removals: self.removals.clone(),
        }
    }

    /// Send every staged intent through `send` in one go. On success the
    /// intents are cleared; on failure they are kept for a retry.
    pub fn commit<R>(&mut self, send: impl FnOnce(&CommitPlan) -> Result<R>) -> Result<R> {
        self.validate()?;
        let plan = self.plan();
        let result = send(&plan)?;
        self.existing.retain(|url| !plan.removals.contains(url));
        self.discard();
        Ok(result)
    }
}

/// Last path segment of a path or URL, without query or fragment.
fn file_name(path_or_url: &str) -> String {
    let trimmed = path_or_url.split(['?', '#']).next().unwrap_or(path_or_url);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"bytes").unwrap();
        path
    }

    #[test]
    fn removed_file_cannot_be_re_added() {
        let dir = TempDir::new().unwrap();
        let photo = temp_file(&dir, "team.jpg");
        let mut changes = ChangeSet::new(vec!["/uploads/team.jpg".into()]);

        changes
            .stage(FileChange::Remove("/uploads/team.jpg".into()))
            .unwrap();
        let err = changes.stage(FileChange::Add(photo)).unwrap_err();

        assert!(matches!(err, CampusError::Refused(_)));
        assert!(changes.plan().uploads.is_empty());
    }

    #[test]
    fn zero_net_files_is_rejected_before_sending() {
        let mut changes = ChangeSet::new(vec!["/uploads/a.jpg".into()]).requiring_files();
        changes
            .stage(FileChange::Remove("/uploads/a.jpg".into()))
            .unwrap();
        let mut sent = false;

        let result = changes.commit(|_| {
            sent = true;
            Ok(())
        });

        assert!(matches!(result, Err(CampusError::Validation(_))));
        assert!(!sent);
        assert_eq!(changes.staged_removals().len(), 1);
    }

    #[test]
    fn commit_sends_everything_once_and_clears() {
        let dir = TempDir::new().unwrap();
        let clip = temp_file(&dir, "relay.mp4");
        let mut changes =
            ChangeSet::new(vec!["/u/a.jpg".into(), "/u/b.jpg".into()]).requiring_files();
        changes.stage(FileChange::Add(clip.clone())).unwrap();
        changes.stage(FileChange::Remove("/u/a.jpg".into())).unwrap();
        assert_eq!(changes.net_file_count(), 2);

        let plan = changes.commit(|plan| Ok(plan.clone())).unwrap();

        assert_eq!(plan.uploads, vec![clip]);
        assert_eq!(plan.removals, vec!["/u/a.jpg".to_string()]);
        assert!(changes.is_empty());
        assert_eq!(changes.existing(), &["/u/b.jpg".to_string()]);
    }

    #[test]
    fn failed_commit_keeps_intents() {
        let mut changes = ChangeSet::new(vec!["/u/a.jpg".into(), "/u/b.jpg".into()]);
        changes.stage(FileChange::Remove("/u/a.jpg".into())).unwrap();

        let result: Result<()> =
            changes.commit(|_| Err(CampusError::transport(Some(502), "bad gateway")));

        assert!(result.is_err());
        assert_eq!(changes.staged_removals(), &["/u/a.jpg".to_string()]);
    }

    #[test]
    fn discard_and_restore() {
        let dir = TempDir::new().unwrap();
        let mut changes = ChangeSet::new(vec!["/u/a.jpg".into()]);
        changes.stage(FileChange::Remove("/u/a.jpg".into())).unwrap();
        changes.restore("/u/a.jpg");
        assert!(changes.staged_removals().is_empty());

        changes
            .stage(FileChange::Add(temp_file(&dir, "new.png")))
            .unwrap();
        changes.discard();
        assert!(changes.is_empty());
    }

    #[test]
    fn unknown_removal_is_not_found() {
        let mut changes = ChangeSet::new(vec![]);
        assert!(matches!(
            changes.stage(FileChange::Remove("/u/ghost.jpg".into())),
            Err(CampusError::NotFound(_))
        ));
    }

    #[test]
    fn file_names_ignore_query_strings() {
        assert_eq!(file_name("https://cdn.test/u/a.jpg?v=2"), "a.jpg");
        assert_eq!(file_name("C:\\photos\\b.png"), "b.png");
    }
}
