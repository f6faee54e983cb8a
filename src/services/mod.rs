pub mod course_store;
pub mod id;
pub mod seed;

pub use course_store::{CourseStore, Snapshot, Subscription};
pub use id::generate_id;
pub use seed::default_course_data;
