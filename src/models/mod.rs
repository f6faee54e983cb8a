pub mod announcement;
pub mod course;
pub mod deadline;

pub use announcement::{Announcement, NewAnnouncementRequest};
pub use course::{CourseData, CourseDetails};
pub use deadline::{Deadline, DeadlineStatus, NewDeadlineRequest, sort_by_due_date};

/// Names of the fields that are blank.
pub(crate) fn required(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}
