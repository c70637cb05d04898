use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentDraft, Course, CourseDraft};
use crate::store::RecordStore;

#[derive(Debug, Default)]
struct Tables {
    courses: Vec<Course>,
    assignments: Vec<Assignment>,
}

/// Process-local store. Ids are `max(id) + 1`, starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(courses: Vec<Course>, assignments: Vec<Assignment>) -> Self {
        Self {
            tables: RwLock::new(Tables { courses, assignments }),
        }
    }

    /// Drop every record.
    pub async fn reset(&self) {
        let mut tables = self.tables.write().await;
        tables.courses.clear();
        tables.assignments.clear();
        debug!("memory store reset");
    }
}

fn next_id<I: Iterator<Item = i64>>(ids: I) -> i64 {
    ids.max().unwrap_or(0) + 1
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.tables.read().await.courses.clone())
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        self.tables
            .read()
            .await
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(tables.courses.iter().map(|c| c.id));
        let course = draft.clone().into_course(id);
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: i64, draft: &CourseDraft) -> Result<Course, AppError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        *slot = draft.clone().into_course(id);
        Ok(slot.clone())
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != id);
        Ok(tables.courses.len() < before)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        Ok(self.tables.read().await.assignments.clone())
    }

    async fn get_assignment(&self, id: i64) -> Result<Assignment, AppError> {
        self.tables
            .read()
            .await
            .assignments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(tables.assignments.iter().map(|a| a.id));
        let assignment = draft.clone().into_assignment(id);
        tables.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)?;
        *slot = draft.clone().into_assignment(id);
        Ok(slot.clone())
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.assignments.len();
        tables.assignments.retain(|a| a.id != id);
        Ok(tables.assignments.len() < before)
    }

    async fn toggle_assignment_complete(&self, id: i64) -> Result<Assignment, AppError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)?;
        slot.toggle_complete();
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentRequest, CourseRequest, assignment::parse_due_date};

    fn course_draft(name: &str) -> CourseDraft {
        CourseRequest {
            name: name.to_string(),
            instructor: "Staff".to_string(),
            credits: Some(3.0),
            year: Some(2024),
            ..Default::default()
        }
        .validate()
        .expect("valid course")
    }

    fn assignment_draft(course_id: i64) -> AssignmentDraft {
        AssignmentRequest {
            course_id: Some(course_id),
            title: "Essay".to_string(),
            due_date: parse_due_date("2024-02-01"),
            total_points: Some(100.0),
            completed: true,
            grade: Some(85.0),
            ..Default::default()
        }
        .validate()
        .expect("valid assignment")
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.create_course(&course_draft("A")).await.unwrap();
        let b = store.create_course(&course_draft("B")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        store.delete_course(b.id).await.unwrap();
        let c = store.create_course(&course_draft("C")).await.unwrap();
        assert_eq!(c.id, 2);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = MemoryStore::new();
        assert!(matches!(store.get_course(5).await, Err(AppError::NotFound)));
        assert!(matches!(
            store.update_course(5, &course_draft("X")).await,
            Err(AppError::NotFound)
        ));
        assert!(!store.delete_assignment(5).await.unwrap());
        assert!(matches!(
            store.toggle_assignment_complete(5).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_toggle_off_clears_grade() {
        let store = MemoryStore::new();
        let course = store.create_course(&course_draft("Bio")).await.unwrap();
        let created = store.create_assignment(&assignment_draft(course.id)).await.unwrap();
        assert_eq!(created.grade, Some(85.0));

        let toggled = store.toggle_assignment_complete(created.id).await.unwrap();
        assert!(!toggled.completed);
        assert_eq!(toggled.grade, None);

        let stored = store.get_assignment(created.id).await.unwrap();
        assert_eq!(stored, toggled);
    }

    #[tokio::test]
    async fn test_course_delete_keeps_assignments() {
        let store = MemoryStore::new();
        let course = store.create_course(&course_draft("Chem")).await.unwrap();
        store.create_assignment(&assignment_draft(course.id)).await.unwrap();

        assert!(store.delete_course(course.id).await.unwrap());
        let left = store.list_assignments_for_course(course.id).await.unwrap();
        assert_eq!(left.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_empties_store() {
        let store = MemoryStore::new();
        let course = store.create_course(&course_draft("Art")).await.unwrap();
        store.create_assignment(&assignment_draft(course.id)).await.unwrap();

        store.reset().await;
        assert!(store.list_courses().await.unwrap().is_empty());
        assert!(store.list_assignments().await.unwrap().is_empty());
    }
}
