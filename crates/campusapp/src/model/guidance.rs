use chrono::{DateTime, NaiveDate, Utc};
use crate::listing::{Choice, RecordFilter, Searchable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{id_from_any, lenient_date, parse_choice, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidanceCategory {
    Academics,
    Drugs,
    Relationships,
    Worship,
    Discipline,
}

impl GuidanceCategory {
    pub const ALL: [GuidanceCategory; 5] = [
        GuidanceCategory::Academics,
        GuidanceCategory::Drugs,
        GuidanceCategory::Relationships,
        GuidanceCategory::Worship,
        GuidanceCategory::Discipline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceCategory::Academics => "Academics",
            GuidanceCategory::Drugs => "Drugs",
            GuidanceCategory::Relationships => "Relationships",
            GuidanceCategory::Worship => "Worship",
            GuidanceCategory::Discipline => "Discipline",
        }
    }
}

impl fmt::Display for GuidanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidanceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choices: Vec<(&str, GuidanceCategory)> = GuidanceCategory::ALL
            .iter()
            .map(|c| (c.as_str(), *c))
            .collect();
        parse_choice(s, &choices).ok_or_else(|| format!("Unknown guidance category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Guidance,
    Counseling,
    #[serde(rename = "Group Session")]
    GroupSession,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Guidance => "Guidance",
            SessionKind::Counseling => "Counseling",
            SessionKind::GroupSession => "Group Session",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            s,
            &[
                ("Guidance", SessionKind::Guidance),
                ("Counseling", SessionKind::Counseling),
                ("Counselling", SessionKind::Counseling),
                ("Group Session", SessionKind::GroupSession),
                ("group", SessionKind::GroupSession),
            ],
        )
        .ok_or_else(|| format!("Unknown session type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            s,
            &[
                ("Low", Priority::Low),
                ("Medium", Priority::Medium),
                ("High", Priority::High),
            ],
        )
        .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceSession {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub counselor: String,
    pub category: GuidanceCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    /// Wall-clock time as entered, e.g. `14:30`.
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub priority: Priority,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for GuidanceSession {
    const NOUN: &'static str = "guidance session";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.counselor
    }
}

impl Searchable for GuidanceSession {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.counselor.as_str(), self.description.as_str(), self.category.as_str()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidanceFilter {
    pub category: Choice<GuidanceCategory>,
    pub priority: Choice<Priority>,
    pub kind: Choice<SessionKind>,
}

impl RecordFilter<GuidanceSession> for GuidanceFilter {
    fn admits(&self, record: &GuidanceSession) -> bool {
        self.category.admits(&record.category)
            && self.priority.admits(&record.priority)
            && self.kind.admits(&record.kind)
    }
}
