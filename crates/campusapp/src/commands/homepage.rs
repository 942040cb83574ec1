//! The public homepage. Every section is fetched independently and falls
//! back to built-in sample data when its endpoint fails.

use super::{load_notice, CmdMessage, CmdResult};
use crate::client::ApiClient;
use crate::error::Result;
use crate::model::public::{sample_events, sample_news, sample_school};
use crate::model::{Event, NewsItem, SchoolSummary};
use crate::store::resource::ResourceStore;
use crate::store::rest::RestRepository;
use serde::Serialize;
use tracing::warn;

pub const SCHOOL_PATH: &str = "/api/school";

#[derive(Debug, Clone, Serialize)]
pub struct Homepage {
    pub school: SchoolSummary,
    /// Soonest first.
    pub events: Vec<Event>,
    pub news: Vec<NewsItem>,
}

pub fn load(client: &ApiClient) -> Result<CmdResult<Homepage>> {
    let mut result = CmdResult::new();

    let mut events =
        ResourceStore::new(RestRepository::<Event>::new(client.clone())).with_fallback(sample_events());
    if let Some(notice) = load_notice(&events.load(), "events") {
        result.add_message(notice);
    }
    let mut news =
        ResourceStore::new(RestRepository::<NewsItem>::new(client.clone())).with_fallback(sample_news());
    if let Some(notice) = load_notice(&news.load(), "news") {
        result.add_message(notice);
    }

    let school = match client
        .get(SCHOOL_PATH)
        .and_then(|envelope| envelope.item::<SchoolSummary>(&["school", "schoolInfo", "data"]))
    {
        Ok(Some(school)) => school,
        Ok(None) => {
            result.add_message(CmdMessage::warning(
                "No school summary published. Showing sample data.",
            ));
            sample_school()
        }
        Err(e) => {
            warn!(error = %e, "failed to load school summary");
            result.add_message(CmdMessage::warning(format!(
                "Could not load the school summary ({}). Showing sample data.",
                e.user_message()
            )));
            sample_school()
        }
    };

    let mut events = events.records().to_vec();
    events.sort_by_key(|e| e.date);
    Ok(result.with_data(Homepage {
        school,
        events,
        news: news.records().to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::test_utils::test_client;

    #[test]
    fn live_data_is_used_when_available() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/events")
            .with_body(
                r#"{"events": [
                    {"id": "e2", "title": "Prize giving", "date": "2025-07-01"},
                    {"id": "e1", "title": "Open day", "date": "2025-02-01T09:00:00.000Z"}
                ]}"#,
            )
            .create();
        server
            .mock("GET", "/api/news")
            .with_body(r#"{"news": [{"id": 1, "title": "New library wing"}]}"#)
            .create();
        server
            .mock("GET", "/api/school")
            .with_body(r#"{"success": true, "school": {"name": "Hillcrest High"}}"#)
            .create();

        let result = load(&test_client(&server)).unwrap();
        let home = result.data.unwrap();

        assert!(result.messages.is_empty());
        assert_eq!(home.school.name, "Hillcrest High");
        assert_eq!(home.events[0].id, "e1");
        assert_eq!(home.news[0].id, "1");
    }

    #[test]
    fn every_failing_section_falls_back_with_a_warning() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/events").with_status(500).create();
        server
            .mock("GET", "/api/news")
            .with_body(r#"{"success": false, "error": "News is disabled"}"#)
            .create();
        server.mock("GET", "/api/school").with_status(404).create();

        let result = load(&test_client(&server)).unwrap();
        let home = result.data.unwrap();

        assert_eq!(result.messages.len(), 3);
        assert!(result
            .messages
            .iter()
            .all(|m| m.level == MessageLevel::Warning));
        assert!(result.messages[1].content.contains("News is disabled"));
        assert_eq!(home.events, sample_events());
        assert_eq!(home.news, sample_news());
        assert_eq!(home.school, sample_school());
    }
}
