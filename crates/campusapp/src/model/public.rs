//! Read-only homepage data. The homepage is best-effort: when a section cannot
//! be fetched it is filled from [`sample_events`], [`sample_news`] and
//! [`sample_school`] instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{id_from_any, lenient_date, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Event {
    const NOUN: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Record for NewsItem {
    const NOUN: &'static str = "news item";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolSummary {
    pub name: String,
    pub motto: Option<String>,
    pub description: Option<String>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn sample_events() -> Vec<Event> {
    vec![
        Event {
            id: "sample-event-1".into(),
            title: "Inter-house Sports Day".into(),
            date: date(2025, 3, 14),
            location: Some("Main field".into()),
            description: Some("Track and field events for all houses.".into()),
        },
        Event {
            id: "sample-event-2".into(),
            title: "Science Fair".into(),
            date: date(2025, 5, 22),
            location: Some("Assembly hall".into()),
            description: None,
        },
    ]
}

pub fn sample_news() -> Vec<NewsItem> {
    vec![NewsItem {
        id: "sample-news-1".into(),
        title: "Admissions for the new session are open".into(),
        summary: Some("Visit the admissions office or apply online.".into()),
        published_at: None,
    }]
}

pub fn sample_school() -> SchoolSummary {
    SchoolSummary {
        name: "Our School".into(),
        motto: Some("Knowledge and character".into()),
        description: None,
    }
}
