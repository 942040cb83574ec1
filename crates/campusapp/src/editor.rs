//! # Form/Modal Editor
//!
//! One editor per collection. It is either closed, or open on a draft in
//! create mode (seeded from a blank template) or edit mode (seeded from an
//! existing record, with password and file fields left blank meaning "no
//! change").
//!
//! [`Editor::submit`] validates required fields, then hands the draft to a
//! send closure. `submit` borrows the editor mutably for the whole send, so a
//! second submit on the same editor cannot start until the first returns.
//! On success it closes and drops the draft; on failure it stays open with
//! the draft intact so the user can fix and retry.

use crate::error::{CampusError, Result};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit(String),
}

impl EditMode {
    pub fn id(&self) -> Option<&str> {
        match self {
            EditMode::Create => None,
            EditMode::Edit(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor<D> {
    open: Option<(EditMode, D)>,
}

impl<D> Default for Editor<D> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<D: Validate> Editor<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self, template: D) {
        self.open = Some((EditMode::Create, template));
    }

    pub fn open_edit(&mut self, id: impl Into<String>, draft: D) {
        self.open = Some((EditMode::Edit(id.into()), draft));
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn mode(&self) -> Option<&EditMode> {
        self.open.as_ref().map(|(mode, _)| mode)
    }

    pub fn draft(&self) -> Option<&D> {
        self.open.as_ref().map(|(_, draft)| draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        self.open.as_mut().map(|(_, draft)| draft)
    }

    /// Cancel: close and drop the draft.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn submit<R>(&mut self, send: impl FnOnce(&EditMode, &D) -> Result<R>) -> Result<R> {
        let (mode, draft) = self
            .open
            .as_ref()
            .ok_or_else(|| CampusError::Api("Nothing to save: the editor is closed".to_string()))?;
        draft.validate()?;

        let result = send(mode, draft);

        if result.is_ok() {
            self.open = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Validate)]
    struct NoteDraft {
        #[validate(length(min = 1))]
        title: String,
    }

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
        }
    }

    #[test]
    fn missing_required_field_blocks_send() {
        let mut editor = Editor::new();
        editor.open_create(draft(""));
        let mut sent = false;

        let err = editor
            .submit(|_, _| {
                sent = true;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, CampusError::Validation(_)));
        assert!(!sent);
        assert!(editor.is_open());
    }

    #[test]
    fn success_closes_and_clears() {
        let mut editor = Editor::new();
        editor.open_edit("n1", draft("Minutes"));

        let seen = editor
            .submit(|mode, d| Ok((mode.id().map(String::from), d.title.clone())))
            .unwrap();

        assert_eq!(seen, (Some("n1".to_string()), "Minutes".to_string()));
        assert!(!editor.is_open());
        assert!(editor.draft().is_none());
    }

    #[test]
    fn failure_keeps_draft_for_retry() {
        let mut editor = Editor::new();
        editor.open_create(draft("Minutes"));

        let err = editor
            .submit::<()>(|_, _| Err(CampusError::Application("Title taken".into())))
            .unwrap_err();

        assert_eq!(err.user_message(), "Title taken");
        assert!(editor.is_open());
        assert_eq!(editor.draft().unwrap().title, "Minutes");
    }

    #[test]
    fn retry_after_failure_sends_the_fixed_draft() {
        let mut editor = Editor::new();
        editor.open_create(draft("Minutes"));
        assert!(editor
            .submit::<()>(|_, _| Err(CampusError::Application("Title taken".into())))
            .is_err());

        editor.draft_mut().unwrap().title = "Minutes (March)".into();
        let sent = editor.submit(|_, d| Ok(d.title.clone())).unwrap();

        assert_eq!(sent, "Minutes (March)");
        assert!(!editor.is_open());
    }

    #[test]
    fn closed_editor_has_nothing_to_submit() {
        let mut editor: Editor<NoteDraft> = Editor::new();
        assert!(editor.submit(|_, _| Ok(())).is_err());
    }
}
