use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::parse_choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    #[default]
    Youtube,
    File,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Youtube => "youtube",
            VideoType::File => "file",
        }
    }
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, &[("youtube", VideoType::Youtube), ("file", VideoType::File)])
            .ok_or_else(|| format!("Unknown video type: {}", s))
    }
}

/// The school's public profile. Exactly zero or one of these exists on the
/// server; it is addressed without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolInfo {
    pub name: String,
    pub description: String,
    pub motto: String,
    pub vision: String,
    pub mission: String,
    pub student_count: u32,
    pub staff_count: u32,
    pub open_date: String,
    pub close_date: String,
    pub subjects: Vec<String>,
    pub departments: Vec<String>,
    pub video_tour: Option<String>,
    pub video_type: VideoType,
    pub admission_open_date: String,
    pub admission_close_date: String,
    pub admission_requirements: String,
    pub admission_fee: Option<String>,
    pub admission_capacity: Option<u32>,
    pub admission_contact_email: String,
    pub admission_contact_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_fills_defaults() {
        let info: SchoolInfo = serde_json::from_str(
            r#"{"name": "Hillcrest High", "studentCount": 820, "subjects": ["Maths"]}"#,
        )
        .unwrap();
        assert_eq!(info.name, "Hillcrest High");
        assert_eq!(info.student_count, 820);
        assert_eq!(info.subjects, vec!["Maths"]);
        assert_eq!(info.video_type, VideoType::Youtube);
        assert!(info.video_tour.is_none());
    }
}
