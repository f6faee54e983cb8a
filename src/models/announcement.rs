use serde::{Deserialize, Serialize};

use crate::models::required;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    /// `YYYY-MM-DD`, set when the announcement is created.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
}

impl Announcement {
    pub fn is_important(&self) -> bool {
        self.important.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncementRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub important: Option<bool>,
}

impl NewAnnouncementRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        required(&[("title", &self.title), ("content", &self.content)])
    }
}
