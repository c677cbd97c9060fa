use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DivisionId;
use crate::store::TimelineRecord;

pub type HoleId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "tag_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub temperature: i64,
}

/// Restricts a hole listing to one category.
///
/// The server decides what matches; the client only forwards the tag name.
#[derive(Debug, Clone, PartialEq)]
pub enum TagFilter {
    Name(String),
    Tag(Tag),
}

impl TagFilter {
    pub fn query_value(&self) -> &str {
        match self {
            TagFilter::Name(name) => name,
            TagFilter::Tag(tag) => &tag.name,
        }
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query_value())
    }
}

impl From<&str> for TagFilter {
    fn from(name: &str) -> Self {
        TagFilter::Name(name.to_string())
    }
}

impl From<Tag> for TagFilter {
    fn from(tag: Tag) -> Self {
        TagFilter::Tag(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    #[serde(rename = "hole_id", alias = "id")]
    pub id: HoleId,
    pub division_id: DivisionId,
    pub time_updated: DateTime<Utc>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub view: i64,
    #[serde(default)]
    pub reply: i64,
    /// Remaining payload (floors, flags, ...) kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hole {
    pub fn new(id: HoleId, division_id: DivisionId, time_updated: DateTime<Utc>) -> Self {
        Self {
            id,
            division_id,
            time_updated,
            time_created: None,
            tags: Vec::new(),
            view: 0,
            reply: 0,
            extra: Map::new(),
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn tag_names(&self) -> String {
        if self.tags.is_empty() {
            return "-".to_string();
        }
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text of the first floor, when the payload carries one.
    pub fn preview(&self) -> Option<&str> {
        self.extra
            .get("floors")?
            .get("first_floor")?
            .get("content")?
            .as_str()
    }

    pub fn formatted_updated(&self) -> String {
        self.time_updated.format("%b %d, %Y %H:%M").to_string()
    }
}

impl TimelineRecord for Hole {
    type Id = HoleId;

    fn record_id(&self) -> HoleId {
        self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.time_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hole_keeps_unknown_fields() {
        let json = r#"{
            "hole_id": 42,
            "division_id": 1,
            "time_updated": "2024-03-01T12:00:00Z",
            "time_created": "2024-02-28T08:30:00Z",
            "tags": [{"tag_id": 3, "name": "Study", "temperature": 12}],
            "view": 100,
            "reply": 5,
            "floors": {"first_floor": {"content": "hello"}},
            "hidden": false
        }"#;

        let hole: Hole = serde_json::from_str(json).expect("hole json");
        assert_eq!(hole.id, 42);
        assert_eq!(hole.division_id, 1);
        assert!(hole.has_tag("Study"));
        assert_eq!(hole.tag_names(), "Study");
        assert_eq!(hole.extra.get("hidden"), Some(&Value::Bool(false)));
        assert!(hole.extra.contains_key("floors"));
        assert_eq!(hole.preview(), Some("hello"));

        let round = serde_json::to_value(&hole).expect("serialize");
        assert_eq!(round["floors"]["first_floor"]["content"], "hello");
    }

    #[test]
    fn test_parse_hole_keyed_by_id() {
        let json = r#"{"id": 8, "division_id": 2, "time_updated": "2024-03-01T12:00:00Z"}"#;
        let hole: Hole = serde_json::from_str(json).expect("hole json");
        assert_eq!(hole.id, 8);
        assert_eq!(hole.division_id, 2);
        assert!(!hole.extra.contains_key("id"));
    }

    #[test]
    fn test_tag_filter_query_value() {
        let by_name = TagFilter::from("Life");
        assert_eq!(by_name.query_value(), "Life");

        let by_tag = TagFilter::from(Tag {
            id: 9,
            name: "Games".to_string(),
            temperature: 0,
        });
        assert_eq!(by_tag.query_value(), "Games");
        assert_eq!(by_tag.to_string(), "Games");
    }

    #[test]
    fn test_tag_names_empty() {
        let hole = Hole::new(1, 1, Utc::now());
        assert_eq!(hole.tag_names(), "-");
        assert_eq!(hole.preview(), None);
    }
}
