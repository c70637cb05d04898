pub mod assignment;
pub mod course;

pub use assignment::{Assignment, AssignmentDraft, AssignmentRequest, Priority};
pub use course::{Course, CourseDraft, CourseLabel, CourseRequest, Semester};
