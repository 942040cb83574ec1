//! The school profile, edited through a three-step wizard: basic details,
//! academics, admissions.

use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{SchoolInfo, VideoType};
use crate::store::singleton::{SaveKind, SchoolInfoStore};
use crate::wizard::{StepForm, Wizard};
use tracing::info;
use url::Url;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Validate)]
#[validate(schema(function = "video_tour_matches_type", skip_on_field_errors = false))]
pub struct SchoolInfoDraft {
    // basic
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub motto: String,
    pub vision: String,
    pub mission: String,

    // academic
    pub student_count: u32,
    pub staff_count: u32,
    #[validate(length(min = 1))]
    pub open_date: String,
    #[validate(length(min = 1))]
    pub close_date: String,
    #[validate(length(min = 1))]
    pub subjects: Vec<String>,
    pub departments: Vec<String>,
    /// A YouTube URL, or the server path of an uploaded file.
    pub video_tour: Option<String>,
    pub video_type: VideoType,

    // admission
    #[validate(length(min = 1))]
    pub admission_open_date: String,
    #[validate(length(min = 1))]
    pub admission_close_date: String,
    #[validate(length(min = 1))]
    pub admission_requirements: String,
    pub admission_fee: Option<String>,
    pub admission_capacity: Option<u32>,
    #[validate(length(min = 1), email)]
    pub admission_contact_email: String,
    pub admission_contact_phone: Option<String>,
}

/// YouTube tours must be absolute URLs; uploaded files are server paths
/// such as `/uploads/tour.mp4`.
fn video_tour_matches_type(draft: &SchoolInfoDraft) -> std::result::Result<(), ValidationError> {
    let Some(tour) = draft.video_tour.as_deref().map(str::trim) else {
        return Ok(());
    };
    if draft.video_type == VideoType::Youtube && !tour.is_empty() && Url::parse(tour).is_err() {
        return Err(ValidationError::new("video_tour"));
    }
    Ok(())
}

impl StepForm for SchoolInfoDraft {
    const STEPS: &'static [&'static str] = &["basic", "academic", "admission"];

    fn step_fields(step: usize) -> &'static [&'static str] {
        match step {
            0 => &["name", "description"],
            1 => &["open_date", "close_date", "subjects", "video_tour"],
            _ => &[
                "admission_open_date",
                "admission_close_date",
                "admission_requirements",
                "admission_contact_email",
            ],
        }
    }
}

impl From<SchoolInfo> for SchoolInfoDraft {
    fn from(info: SchoolInfo) -> Self {
        Self {
            name: info.name,
            description: info.description,
            motto: info.motto,
            vision: info.vision,
            mission: info.mission,
            student_count: info.student_count,
            staff_count: info.staff_count,
            open_date: info.open_date,
            close_date: info.close_date,
            subjects: info.subjects,
            departments: info.departments,
            video_tour: info.video_tour.filter(|v| !v.trim().is_empty()),
            video_type: info.video_type,
            admission_open_date: info.admission_open_date,
            admission_close_date: info.admission_close_date,
            admission_requirements: info.admission_requirements,
            admission_fee: info.admission_fee,
            admission_capacity: info.admission_capacity,
            admission_contact_email: info.admission_contact_email,
            admission_contact_phone: info.admission_contact_phone,
        }
    }
}

impl From<SchoolInfoDraft> for SchoolInfo {
    fn from(draft: SchoolInfoDraft) -> Self {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            name: draft.name.trim().to_string(),
            description: draft.description,
            motto: draft.motto,
            vision: draft.vision,
            mission: draft.mission,
            student_count: draft.student_count,
            staff_count: draft.staff_count,
            open_date: draft.open_date,
            close_date: draft.close_date,
            subjects: clean(draft.subjects),
            departments: clean(draft.departments),
            video_tour: draft.video_tour,
            video_type: draft.video_type,
            admission_open_date: draft.admission_open_date,
            admission_close_date: draft.admission_close_date,
            admission_requirements: draft.admission_requirements,
            admission_fee: draft.admission_fee,
            admission_capacity: draft.admission_capacity,
            admission_contact_email: draft.admission_contact_email,
            admission_contact_phone: draft.admission_contact_phone,
        }
    }
}

pub fn show(store: &SchoolInfoStore) -> Result<CmdResult<SchoolInfo>> {
    Ok(match store.fetch()? {
        Some(info) => CmdResult::new().with_data(info),
        None => CmdResult::new().with_message(CmdMessage::info(
            "No school information has been saved yet",
        )),
    })
}

/// Edit the profile (or start one) and walk the wizard to the end. Creates
/// when no profile exists, updates otherwise.
pub fn save(
    store: &SchoolInfoStore,
    change: impl FnOnce(&mut SchoolInfoDraft),
) -> Result<CmdResult<SchoolInfo>> {
    let existing = store.fetch()?;
    let kind = match existing {
        Some(_) => SaveKind::Updated,
        None => SaveKind::Created,
    };
    let mut draft: SchoolInfoDraft = existing.unwrap_or_default().into();
    change(&mut draft);

    let mut wizard = Wizard::new(draft);
    wizard.advance_to_end()?;
    let saved = wizard.submit(|draft| {
        let info: SchoolInfo = draft.clone().into();
        match kind {
            SaveKind::Created => store.create(&info)?,
            SaveKind::Updated => store.update(&info)?,
        }
        Ok(info)
    })?;

    info!(name = %saved.name, ?kind, "school information saved");
    let verb = match kind {
        SaveKind::Created => "created",
        SaveKind::Updated => "updated",
    };
    Ok(CmdResult::new()
        .with_message(CmdMessage::success(format!(
            "School information {}: {}",
            verb, saved.name
        )))
        .with_data(saved))
}

pub fn remove(store: &SchoolInfoStore) -> Result<CmdResult> {
    store.delete()?;
    Ok(CmdResult::new().with_message(CmdMessage::success("School information deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampusError;
    use crate::store::singleton::SCHOOL_INFO_PATH;
    use crate::test_utils::{complete_school_info, test_client};
    use mockito::Matcher;

    #[test]
    fn creates_when_absent() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", SCHOOL_INFO_PATH)
            .with_body(r#"{"success": true, "schoolInfo": null}"#)
            .create();
        let post = server
            .mock("POST", SCHOOL_INFO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "Hillcrest High",
                "subjects": ["Maths", "Biology"]
            })))
            .with_body(r#"{"success": true}"#)
            .create();
        let store = SchoolInfoStore::new(test_client(&server));

        let result = save(&store, |d| {
            *d = complete_school_info().into();
            d.subjects = vec!["Maths".into(), " ".into(), "Biology".into()];
        })
        .unwrap();

        post.assert();
        assert!(result.messages[0].content.contains("created"));
    }

    #[test]
    fn updates_when_present() {
        let mut server = mockito::Server::new();
        let existing = serde_json::to_string(&complete_school_info()).unwrap();
        server
            .mock("GET", SCHOOL_INFO_PATH)
            .with_body(format!(r#"{{"success": true, "schoolInfo": {}}}"#, existing))
            .expect_at_least(1)
            .create();
        let put = server
            .mock("PUT", SCHOOL_INFO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({"motto": "Rise and shine"})))
            .with_body(r#"{"success": true}"#)
            .create();
        let post = server.mock("POST", SCHOOL_INFO_PATH).expect(0).create();
        let store = SchoolInfoStore::new(test_client(&server));

        save(&store, |d| d.motto = "Rise and shine".into()).unwrap();

        put.assert();
        post.assert();
    }

    #[test]
    fn incomplete_step_blocks_submission() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", SCHOOL_INFO_PATH)
            .with_body(r#"{"success": true}"#)
            .create();
        let post = server.mock("POST", SCHOOL_INFO_PATH).expect(0).create();
        let store = SchoolInfoStore::new(test_client(&server));

        let err = save(&store, |d| {
            d.name = "Hillcrest High".into();
            d.description = "A day school".into();
        })
        .unwrap_err();

        match err {
            CampusError::Validation(msg) => assert!(msg.contains("open_date")),
            other => panic!("expected validation error, got {:?}", other),
        }
        post.assert();
    }

    #[test]
    fn wizard_steps_follow_the_form() {
        let mut wizard = Wizard::new(SchoolInfoDraft::default());
        assert_eq!(wizard.step_name(), "basic");
        assert_eq!(
            wizard.missing_on(0),
            vec!["description".to_string(), "name".to_string()]
        );
        wizard.draft_mut().name = "Hillcrest".into();
        wizard.draft_mut().description = "Day school".into();
        assert_eq!(wizard.next().unwrap(), 1);
        assert_eq!(wizard.step_name(), "academic");
        assert_eq!(wizard.back(), 0);
    }

    #[test]
    fn uploaded_video_path_passes_the_academic_step() {
        let draft = SchoolInfoDraft {
            open_date: "2025-01-06".into(),
            close_date: "2025-07-18".into(),
            subjects: vec!["Maths".into()],
            video_tour: Some("/uploads/tour.mp4".into()),
            video_type: VideoType::File,
            ..Default::default()
        };

        assert!(Wizard::new(draft).missing_on(1).is_empty());
    }

    #[test]
    fn youtube_tour_must_be_a_url() {
        let mut draft: SchoolInfoDraft = complete_school_info().into();
        draft.video_type = VideoType::Youtube;
        draft.video_tour = Some("/uploads/tour.mp4".into());
        assert_eq!(
            Wizard::new(draft.clone()).missing_on(1),
            vec!["video_tour".to_string()]
        );

        draft.video_tour = Some("https://www.youtube.com/watch?v=abc123".into());
        assert!(Wizard::new(draft).missing_on(1).is_empty());
    }

    #[test]
    fn saved_profile_with_uploaded_video_can_be_edited() {
        let mut server = mockito::Server::new();
        let mut existing = complete_school_info();
        existing.video_tour = Some("/uploads/tour.mp4".into());
        existing.video_type = VideoType::File;
        server
            .mock("GET", SCHOOL_INFO_PATH)
            .with_body(format!(
                r#"{{"success": true, "schoolInfo": {}}}"#,
                serde_json::to_string(&existing).unwrap()
            ))
            .expect_at_least(1)
            .create();
        let put = server
            .mock("PUT", SCHOOL_INFO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "videoTour": "/uploads/tour.mp4",
                "videoType": "file",
                "motto": "Aim high"
            })))
            .with_body(r#"{"success": true}"#)
            .create();
        let store = SchoolInfoStore::new(test_client(&server));

        save(&store, |d| d.motto = "Aim high".into()).unwrap();

        put.assert();
    }

    #[test]
    fn show_reports_absence() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", SCHOOL_INFO_PATH)
            .with_body(r#"{"success": true, "data": []}"#)
            .create();
        let store = SchoolInfoStore::new(test_client(&server));

        let result = show(&store).unwrap();
        assert!(result.data.is_none());
        assert_eq!(result.messages.len(), 1);
    }
}
