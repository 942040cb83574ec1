use chrono::{DateTime, Utc};
use crate::listing::{Choice, RecordFilter, Searchable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{id_from_any, parse_choice, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Published,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Published => "published",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            s,
            &[
                ("draft", CampaignStatus::Draft),
                ("published", CampaignStatus::Published),
                ("sent", CampaignStatus::Published),
            ],
        )
        .ok_or_else(|| format!("Unknown campaign status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCampaign {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub content: String,
    /// Either a group keyword (`all`, `students`, `staff`) or comma-separated addresses.
    #[serde(default)]
    pub recipients: String,
    #[serde(default)]
    pub recipient_type: String,
    #[serde(default)]
    pub recipient_count: usize,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl EmailCampaign {
    pub fn is_published(&self) -> bool {
        self.status == CampaignStatus::Published
    }
}

impl Record for EmailCampaign {
    const NOUN: &'static str = "campaign";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Searchable for EmailCampaign {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.subject.as_str(), self.recipient_type.as_str()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignFilter {
    pub status: Choice<CampaignStatus>,
}

impl RecordFilter<EmailCampaign> for CampaignFilter {
    fn admits(&self, record: &EmailCampaign) -> bool {
        self.status.admits(&record.status)
    }
}
