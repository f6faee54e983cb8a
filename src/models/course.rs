use serde::{Deserialize, Serialize};

use crate::models::{Announcement, Deadline, required};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub professor: String,
    pub schedule: String,
    pub location: String,
}

impl CourseDetails {
    /// Names of fields left blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        required(&[
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("description", &self.description),
            ("professor", &self.professor),
            ("schedule", &self.schedule),
            ("location", &self.location),
        ])
    }
}

/// Everything the site shows, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    pub course_details: CourseDetails,
    pub announcements: Vec<Announcement>,
    pub deadlines: Vec<Deadline>,
}
