//! Email campaigns.
//!
//! A campaign is drafted, then sent. Sending flips it to `published` and
//! stamps `sentAt`; there is no way back, so sending twice or editing a sent
//! campaign is refused. Recipients are resolved and counted when the draft
//! is saved.

use super::{load_notice, refresh, CmdMessage, CmdResult};
use crate::client::Payload;
use crate::editor::Editor;
use crate::error::{CampusError, Result};
use crate::listing::{ListState, Page};
use crate::model::{CampaignFilter, CampaignStatus, EmailCampaign};
use crate::recipients::{resolve, Directory, RecipientGroup};
use crate::store::resource::ResourceStore;
use crate::store::Repository;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CampaignDraft {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub content: String,
    /// A group keyword (`all`, `students`, `staff`) or comma-separated addresses.
    #[validate(length(min = 1))]
    pub recipients: String,
}

impl CampaignDraft {
    pub fn from_record(campaign: &EmailCampaign) -> Self {
        let recipients = match campaign.recipient_type.as_str() {
            "all" | "students" | "staff" => campaign.recipient_type.clone(),
            _ => campaign.recipients.clone(),
        };
        Self {
            title: campaign.title.clone(),
            subject: campaign.subject.clone(),
            content: campaign.content.clone(),
            recipients,
        }
    }

    /// Resolve recipients and build the request body. Refuses when the
    /// recipients resolve to nobody.
    fn fields(&self, directory: &impl Directory) -> Result<Value> {
        let group = RecipientGroup::parse(&self.recipients);
        let resolved = resolve(&group, directory)?;
        if resolved.is_empty() {
            return Err(CampusError::Refused("No recipients found".to_string()));
        }
        Ok(json!({
            "title": self.title.trim(),
            "subject": self.subject.trim(),
            "content": self.content,
            "recipients": resolved.join(","),
            "recipientType": group.recipient_type(),
            "recipientCount": resolved.len(),
            "status": CampaignStatus::Draft,
        }))
    }
}

pub fn list<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    state: &mut ListState<CampaignFilter>,
) -> Result<CmdResult<Page<EmailCampaign>>> {
    let mut result = CmdResult::new();
    if let Some(notice) = load_notice(&store.load(), "campaigns") {
        result.add_message(notice);
    }
    Ok(result.with_data(store.view(state)))
}

pub fn create<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    directory: &impl Directory,
    draft: CampaignDraft,
) -> Result<CmdResult<EmailCampaign>> {
    let mut result = CmdResult::new();
    let mut editor = Editor::new();
    editor.open_create(draft);
    let (title, count, created) = editor.submit(|_, draft| {
        let fields = draft.fields(directory)?;
        let count = fields["recipientCount"].as_u64().unwrap_or_default();
        let created = store.repository().create(Payload::Json(fields))?;
        Ok((draft.title.clone(), count, created))
    })?;

    info!(title = %title, recipients = count, "campaign created");
    refresh(store, "campaigns", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Campaign created: {} ({} recipients)",
        title, count
    )));
    Ok(match created {
        Some(campaign) => result.with_data(campaign),
        None => result,
    })
}

fn find_draft_campaign<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    id: &str,
    action: &str,
) -> Result<EmailCampaign> {
    store.load_fresh()?;
    let campaign = store
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::NotFound(format!("campaign {}", id)))?;
    if campaign.is_published() {
        return Err(CampusError::Refused(format!(
            "Campaign '{}' has already been sent and cannot be {}",
            campaign.title, action
        )));
    }
    Ok(campaign)
}

pub fn update<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    directory: &impl Directory,
    id: &str,
    change: impl FnOnce(&mut CampaignDraft),
) -> Result<CmdResult<EmailCampaign>> {
    let mut result = CmdResult::new();
    let existing = find_draft_campaign(store, id, "edited")?;

    let mut draft = CampaignDraft::from_record(&existing);
    change(&mut draft);
    let mut editor = Editor::new();
    editor.open_edit(id, draft);
    let updated = editor.submit(|_, draft| {
        let fields = draft.fields(directory)?;
        store.repository().update(id, Payload::Json(fields))
    })?;

    refresh(store, "campaigns", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Campaign updated: {}",
        existing.title
    )));
    Ok(match updated {
        Some(campaign) => result.with_data(campaign),
        None => result,
    })
}

/// Publish a draft campaign. Irreversible.
pub fn send<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::new();
    let campaign = find_draft_campaign(store, id, "sent again")?;

    let body = json!({
        "status": CampaignStatus::Published,
        "sentAt": Utc::now().to_rfc3339(),
    });
    store.repository().update(id, Payload::Json(body))?;
    info!(title = %campaign.title, recipients = campaign.recipient_count, "campaign sent");

    refresh(store, "campaigns", &mut result);
    result.add_message(CmdMessage::success(format!(
        "Campaign sent: {} ({} recipients)",
        campaign.title, campaign.recipient_count
    )));
    Ok(result)
}

pub fn delete<R: Repository<EmailCampaign>>(
    store: &mut ResourceStore<EmailCampaign, R>,
    id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::new();
    store.repository().delete(id)?;
    refresh(store, "campaigns", &mut result);
    result.add_message(CmdMessage::success(format!("Campaign deleted: {}", id)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::rest::RestRepository;
    use crate::test_utils::{test_client, FixedDirectory};
    use mockito::Matcher;

    fn draft(recipients: &str) -> CampaignDraft {
        CampaignDraft {
            title: "Term dates".into(),
            subject: "Second term".into(),
            content: "School resumes on Monday.".into(),
            recipients: recipients.into(),
        }
    }

    fn directory() -> FixedDirectory {
        FixedDirectory {
            students: vec!["Kid@x.org".into(), "kid@x.org".into(), "pupil@x.org".into()],
            staff: vec![],
        }
    }

    #[test]
    fn empty_staff_group_blocks_creation_without_posting() {
        let mut server = mockito::Server::new();
        let post = server.mock("POST", "/api/emails").expect(0).create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));

        let err = create(&mut store, &directory(), draft("staff")).unwrap_err();

        assert_eq!(err.user_message(), "No recipients found");
        post.assert();
    }

    #[test]
    fn count_reflects_deduplicated_addresses() {
        let mut server = mockito::Server::new();
        let post = server
            .mock("POST", "/api/emails")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "recipients": "kid@x.org,pupil@x.org",
                "recipientType": "students",
                "recipientCount": 2,
                "status": "draft"
            })))
            .with_body(r#"{"success": true}"#)
            .create();
        server
            .mock("GET", "/api/emails")
            .with_body(r#"{"success": true, "emails": []}"#)
            .create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));

        let result = create(&mut store, &directory(), draft("students")).unwrap();

        post.assert();
        assert!(result.messages[0].content.contains("2 recipients"));
    }

    #[test]
    fn sending_published_campaign_is_refused() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/emails")
            .with_body(
                r#"{"success": true, "emails": [{"_id": "c1", "title": "Gala", "subject": "s",
                    "status": "published", "recipientCount": 3}]}"#,
            )
            .create();
        let put = server
            .mock("PUT", "/api/emails")
            .match_query(Matcher::Any)
            .expect(0)
            .create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));

        assert!(matches!(send(&mut store, "c1"), Err(CampusError::Refused(_))));
        put.assert();
    }

    #[test]
    fn send_publishes_by_query_id() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/emails")
            .with_body(
                r#"{"success": true, "emails": [{"_id": "c1", "title": "Gala", "subject": "s",
                    "status": "draft", "recipientCount": 3}]}"#,
            )
            .create();
        let put = server
            .mock("PUT", "/api/emails")
            .match_query(Matcher::UrlEncoded("id".into(), "c1".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({"status": "published"})))
            .with_body(r#"{"success": true}"#)
            .create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));

        let result = send(&mut store, "c1").unwrap();

        put.assert();
        assert!(result.messages.last().unwrap().content.contains("Gala"));
    }

    #[test]
    fn send_keeps_the_server_refusal_of_the_lookup() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/emails")
            .with_body(r#"{"success": false, "error": "Session expired"}"#)
            .create();
        let put = server
            .mock("PUT", "/api/emails")
            .match_query(Matcher::Any)
            .expect(0)
            .create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));

        let err = send(&mut store, "c1").unwrap_err();

        assert!(matches!(err, CampusError::Application(_)));
        assert_eq!(err.user_message(), "Session expired");
        put.assert();
    }

    #[test]
    fn failed_load_clears_and_reports() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/emails").with_status(503).create();
        let mut store = ResourceStore::new(RestRepository::<EmailCampaign>::new(test_client(&server)));
        let mut state = ListState::new(PAGE_SIZE);

        let result = list(&mut store, &mut state).unwrap();

        assert!(result.has_errors());
        assert!(result.data.unwrap().is_empty());
    }
}
