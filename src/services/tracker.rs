use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Assignment, AssignmentRequest, Course, CourseRequest};
use crate::store::RecordStore;

/// Courses and assignments loaded together for one view.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
}

/// Validates input, then forwards mutations to the record store.
/// Invalid input never reaches the store.
#[derive(Clone)]
pub struct TrackerService {
    store: Arc<dyn RecordStore>,
}

impl TrackerService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn load(&self) -> Result<Snapshot, AppError> {
        let (courses, assignments) =
            tokio::try_join!(self.store.list_courses(), self.store.list_assignments())?;
        Ok(Snapshot { courses, assignments })
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.store.list_courses().await
    }

    pub async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        self.store.get_course(id).await
    }

    pub async fn create_course(&self, req: CourseRequest) -> Result<Course, AppError> {
        let draft = req.validate()?;
        let course = self.store.create_course(&draft).await?;
        info!("created course {} ({})", course.id, course.name);
        Ok(course)
    }

    pub async fn update_course(&self, id: i64, req: CourseRequest) -> Result<Course, AppError> {
        let draft = req.validate()?;
        let course = self.store.update_course(id, &draft).await?;
        info!("updated course {}", id);
        Ok(course)
    }

    /// Assignments of the deleted course are left in place.
    pub async fn delete_course(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_course(id).await? {
            return Err(AppError::NotFound);
        }
        match self.store.list_assignments_for_course(id).await {
            Ok(orphaned) if !orphaned.is_empty() => {
                warn!("deleted course {} still referenced by {} assignments", id, orphaned.len());
            }
            Ok(_) => info!("deleted course {}", id),
            Err(e) => warn!("deleted course {} but could not count its assignments: {}", id, e),
        }
        Ok(())
    }

    pub async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        self.store.list_assignments().await
    }

    pub async fn get_assignment(&self, id: i64) -> Result<Assignment, AppError> {
        self.store.get_assignment(id).await
    }

    pub async fn create_assignment(&self, req: AssignmentRequest) -> Result<Assignment, AppError> {
        let draft = req.validate()?;
        self.ensure_course_exists(draft.course_id).await?;
        let assignment = self.store.create_assignment(&draft).await?;
        info!("created assignment {} for course {}", assignment.id, assignment.course_id);
        Ok(assignment)
    }

    pub async fn update_assignment(&self, id: i64, req: AssignmentRequest) -> Result<Assignment, AppError> {
        let draft = req.validate()?;
        self.ensure_course_exists(draft.course_id).await?;
        let assignment = self.store.update_assignment(id, &draft).await?;
        info!("updated assignment {}", id);
        Ok(assignment)
    }

    pub async fn delete_assignment(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_assignment(id).await? {
            return Err(AppError::NotFound);
        }
        info!("deleted assignment {}", id);
        Ok(())
    }

    pub async fn toggle_assignment(&self, id: i64) -> Result<Assignment, AppError> {
        let assignment = self.store.toggle_assignment_complete(id).await?;
        if assignment.completed {
            info!("assignment {} marked as complete", id);
        } else {
            info!("assignment {} marked as incomplete", id);
        }
        Ok(assignment)
    }

    async fn ensure_course_exists(&self, course_id: i64) -> Result<(), AppError> {
        match self.store.get_course(course_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound) => Err(AppError::field("courseId", "Please select a course")),
            Err(e) => Err(e),
        }
    }
}
