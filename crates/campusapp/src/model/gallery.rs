use chrono::{DateTime, Utc};
use crate::listing::{Choice, RecordFilter, Searchable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{id_from_any, parse_choice, Record};

macro_rules! gallery_categories {
    ($($variant:ident => $wire:literal, $label:literal;)+) => {
        /// Closed set of gallery categories accepted by the server.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum GalleryCategory {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl GalleryCategory {
            pub const ALL: &'static [GalleryCategory] = &[$(GalleryCategory::$variant,)+];

            /// Wire value, e.g. `SPORTS_DAY`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(GalleryCategory::$variant => $wire,)+
                }
            }

            /// Display label, e.g. `Sports Day`.
            pub fn label(&self) -> &'static str {
                match self {
                    $(GalleryCategory::$variant => $label,)+
                }
            }
        }
    };
}

gallery_categories! {
    General => "GENERAL", "General";
    SportsDay => "SPORTS_DAY", "Sports Day";
    Graduation => "GRADUATION", "Graduation";
    Academics => "ACADEMICS", "Academics";
    CulturalDay => "CULTURAL_DAY", "Cultural Day";
    MusicFestival => "MUSIC_FESTIVAL", "Music Festival";
    Drama => "DRAMA", "Drama";
    ScienceFair => "SCIENCE_FAIR", "Science Fair";
    PrizeGiving => "PRIZE_GIVING", "Prize Giving";
    OpenDay => "OPEN_DAY", "Open Day";
    ParentsDay => "PARENTS_DAY", "Parents Day";
    FieldTrip => "FIELD_TRIP", "Field Trip";
    Clubs => "CLUBS", "Clubs";
    Chapel => "CHAPEL", "Chapel";
    Athletics => "ATHLETICS", "Athletics";
    Football => "FOOTBALL", "Football";
    Rugby => "RUGBY", "Rugby";
    Netball => "NETBALL", "Netball";
    Swimming => "SWIMMING", "Swimming";
    Debate => "DEBATE", "Debate";
    ComputerLab => "COMPUTER_LAB", "Computer Lab";
    Library => "LIBRARY", "Library";
    Laboratory => "LABORATORY", "Laboratory";
    Classrooms => "CLASSROOMS", "Classrooms";
    Dormitories => "DORMITORIES", "Dormitories";
    DiningHall => "DINING_HALL", "Dining Hall";
    CampusGrounds => "CAMPUS_GROUNDS", "Campus Grounds";
    Alumni => "ALUMNI", "Alumni";
}

impl fmt::Display for GalleryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GalleryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choices: Vec<(&str, GalleryCategory)> = GalleryCategory::ALL
            .iter()
            .map(|c| (c.as_str(), *c))
            .collect();
        parse_choice(s, &choices).ok_or_else(|| format!("Unknown gallery category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv", "m4v", "ogv"];

impl FileType {
    /// Classify a file name or URL by extension. Anything that is not a known
    /// video extension is treated as an image.
    pub fn from_name(name: &str) -> Self {
        let path = name.split(['?', '#']).next().unwrap_or(name);
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Video
        } else {
            FileType::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, &[("image", FileType::Image), ("video", FileType::Video)])
            .ok_or_else(|| format!("Unknown file type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: GalleryCategory,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GalleryItem {
    /// Derived from the first file; an item without files counts as an image album.
    pub fn file_type(&self) -> FileType {
        self.files
            .first()
            .map(|f| FileType::from_name(f))
            .unwrap_or(FileType::Image)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Record for GalleryItem {
    const NOUN: &'static str = "gallery item";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Searchable for GalleryItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.category.label()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryFilter {
    pub category: Choice<GalleryCategory>,
    pub file_type: Choice<FileType>,
}

impl RecordFilter<GalleryItem> for GalleryFilter {
    fn admits(&self, record: &GalleryItem) -> bool {
        self.category.admits(&record.category) && self.file_type.admits(&record.file_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn there_are_28_categories_with_unique_wire_values() {
        assert_eq!(GalleryCategory::ALL.len(), 28);
        let mut wires: Vec<&str> = GalleryCategory::ALL.iter().map(|c| c.as_str()).collect();
        wires.sort();
        wires.dedup();
        assert_eq!(wires.len(), 28);
    }

    #[test]
    fn category_round_trips_through_wire_value() {
        let parsed: GalleryCategory = serde_json::from_str(r#""SPORTS_DAY""#).unwrap();
        assert_eq!(parsed, GalleryCategory::SportsDay);
        assert_eq!("sports day".parse::<GalleryCategory>().unwrap(), parsed);
        assert!(serde_json::from_str::<GalleryCategory>(r#""BAKE_SALE""#).is_err());
    }

    #[test]
    fn file_type_follows_first_file() {
        let mut item = GalleryItem {
            id: "g1".into(),
            title: "Gala".into(),
            description: String::new(),
            category: GalleryCategory::Swimming,
            files: vec![
                "https://cdn.test/gala/clip.MP4?sig=1".into(),
                "https://cdn.test/gala/photo.jpg".into(),
            ],
            created_at: None,
            updated_at: None,
        };
        assert_eq!(item.file_type(), FileType::Video);
        assert_eq!(item.file_count(), 2);

        item.files.reverse();
        assert_eq!(item.file_type(), FileType::Image);
    }
}
