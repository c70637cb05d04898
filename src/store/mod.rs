pub mod dto;
pub mod memory;
pub mod remote;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentDraft, Course, CourseDraft};

pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// CRUD contract of the record store backing courses and assignments.
///
/// `get_*`, `update_*` and `toggle_assignment_complete` fail with
/// [`AppError::NotFound`] for an unknown id; `delete_*` report it as `Ok(false)`.
/// A failed call leaves the store unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn get_course(&self, id: i64) -> Result<Course, AppError>;
    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, AppError>;
    async fn update_course(&self, id: i64, draft: &CourseDraft) -> Result<Course, AppError>;
    /// Never touches assignments that reference the course.
    async fn delete_course(&self, id: i64) -> Result<bool, AppError>;

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError>;
    async fn get_assignment(&self, id: i64) -> Result<Assignment, AppError>;
    async fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment, AppError>;
    async fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment, AppError>;
    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError>;
    /// Flip `completed`; clears `grade` whenever the result is incomplete.
    async fn toggle_assignment_complete(&self, id: i64) -> Result<Assignment, AppError>;

    async fn list_assignments_for_course(&self, course_id: i64) -> Result<Vec<Assignment>, AppError> {
        Ok(self
            .list_assignments()
            .await?
            .into_iter()
            .filter(|a| a.course_id == course_id)
            .collect())
    }
}
