use crate::models::{Announcement, CourseData, CourseDetails, Deadline};

/// Content shown before anything has been saved.
pub fn default_course_data() -> CourseData {
    CourseData {
        course_details: CourseDetails {
            title: "Building AI Products".to_string(),
            subtitle: "ITAM - Fall 2023".to_string(),
            description: "Learn how to design, develop, and deploy artificial intelligence \
                products from concept to market. This course covers the entire lifecycle of AI \
                product development, including ethical considerations, technical implementation, \
                and business strategy."
                .to_string(),
            professor: "Dr. Maya Rodriguez".to_string(),
            schedule: "Mondays and Wednesdays, 10:00 AM - 12:00 PM".to_string(),
            location: "Building A, Room 302".to_string(),
        },
        announcements: vec![
            announcement(
                "1",
                "Welcome to the Course",
                "Welcome to Building AI Products! Please review the syllabus and come prepared \
                 for our first class session.",
                "2023-08-15",
                Some(true),
            ),
            announcement(
                "2",
                "First Assignment Posted",
                "The first assignment on AI Ethics has been posted. Due date is September 5th.",
                "2023-08-18",
                None,
            ),
            announcement(
                "3",
                "Guest Lecture Announcement",
                "We will have a guest lecture by Dr. James Chen from OpenAI on September 10th.",
                "2023-08-25",
                Some(true),
            ),
        ],
        deadlines: vec![
            deadline(
                "1",
                "AI Ethics Assignment",
                "Write a 3-page paper on ethical considerations in AI product development.",
                "2023-09-05",
            ),
            deadline(
                "2",
                "Project Proposal",
                "Submit a 2-page proposal for your final project, including problem statement, \
                 proposed solution, and technical approach.",
                "2023-09-15",
            ),
            deadline(
                "3",
                "Midterm Exam",
                "In-class exam covering topics from weeks 1-6.",
                "2023-10-10",
            ),
            deadline(
                "4",
                "Final Project Presentation",
                "Present your final AI product project to the class.",
                "2023-11-30",
            ),
        ],
    }
}

fn announcement(id: &str, title: &str, content: &str, date: &str, important: Option<bool>) -> Announcement {
    Announcement {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        date: date.to_string(),
        important,
    }
}

fn deadline(id: &str, title: &str, description: &str, due_date: &str) -> Deadline {
    Deadline {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        due_date: due_date.to_string(),
        completed: None,
    }
}
