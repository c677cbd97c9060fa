use serde::{Deserialize, Serialize};

use super::Hole;

pub type DivisionId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    #[serde(rename = "division_id", alias = "id")]
    pub id: DivisionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Holes pinned to the top of the division by moderators.
    #[serde(default)]
    pub pinned: Vec<Hole>,
}

impl Division {
    pub fn new(id: DivisionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            pinned: Vec::new(),
        }
    }

    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "No description",
        }
    }
}
