use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentDraft, Course, CourseDraft, Priority, Semester};
use crate::store::RecordStore;

#[derive(Debug, FromRow)]
struct CourseRow {
    id: i64,
    name: String,
    instructor: String,
    credits: f64,
    color: String,
    semester: String,
    year: i64,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        let semester = row.semester.parse::<Semester>().unwrap_or_else(|_| {
            warn!("course {} has unknown semester {:?}", row.id, row.semester);
            Semester::default()
        });
        Course {
            id: row.id,
            name: row.name,
            instructor: row.instructor,
            credits: row.credits,
            color: row.color,
            semester,
            year: row.year as i32,
        }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: i64,
    course_id: i64,
    title: String,
    description: Option<String>,
    due_date: DateTime<Utc>,
    priority: String,
    total_points: f64,
    completed: bool,
    grade: Option<f64>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Assignment {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            priority: row.priority.parse::<Priority>().unwrap_or_default(),
            total_points: row.total_points,
            completed: row.completed,
            grade: if row.completed { row.grade } else { None },
        }
    }
}

/// Local SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| AppError::Database(e.into()))
    }

    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>, sqlx::Error> {
        let row = sqlx::query_as::<_, CourseRow>(
            "SELECT id, name, instructor, credits, color, semester, year FROM courses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Course::from))
    }

    async fn find_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>, sqlx::Error> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, course_id, title, description, due_date, priority, total_points, completed, grade
            FROM assignments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Assignment::from))
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            "SELECT id, name, instructor, credits, color, semester, year FROM courses ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        self.find_course_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, AppError> {
        let id = sqlx::query(
            "INSERT INTO courses (name, instructor, credits, color, semester, year) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.instructor)
        .bind(draft.credits)
        .bind(&draft.color)
        .bind(draft.semester.as_str())
        .bind(draft.year)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        Ok(draft.clone().into_course(id))
    }

    async fn update_course(&self, id: i64, draft: &CourseDraft) -> Result<Course, AppError> {
        let affected = sqlx::query(
            "UPDATE courses SET name = ?, instructor = ?, credits = ?, color = ?, semester = ?, year = ? WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(&draft.instructor)
        .bind(draft.credits)
        .bind(&draft.color)
        .bind(draft.semester.as_str())
        .bind(draft.year)
        .bind(id)
        .execute(&self.db)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(draft.clone().into_course(id))
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        let affected = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, course_id, title, description, due_date, priority, total_points, completed, grade
            FROM assignments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn list_assignments_for_course(&self, course_id: i64) -> Result<Vec<Assignment>, AppError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, course_id, title, description, due_date, priority, total_points, completed, grade
            FROM assignments
            WHERE course_id = ?
            ORDER BY id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn get_assignment(&self, id: i64) -> Result<Assignment, AppError> {
        self.find_assignment_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        let grade = if draft.completed { draft.grade } else { None };
        let id = sqlx::query(
            r#"
            INSERT INTO assignments
                (course_id, title, description, due_date, priority, total_points, completed, grade)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.course_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.due_date)
        .bind(draft.priority.as_str())
        .bind(draft.total_points)
        .bind(draft.completed)
        .bind(grade)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        let mut assignment = draft.clone().into_assignment(id);
        assignment.grade = grade;
        Ok(assignment)
    }

    async fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        let grade = if draft.completed { draft.grade } else { None };
        let affected = sqlx::query(
            r#"
            UPDATE assignments
            SET course_id = ?,
                title = ?,
                description = ?,
                due_date = ?,
                priority = ?,
                total_points = ?,
                completed = ?,
                grade = ?
            WHERE id = ?
            "#,
        )
        .bind(draft.course_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.due_date)
        .bind(draft.priority.as_str())
        .bind(draft.total_points)
        .bind(draft.completed)
        .bind(grade)
        .bind(id)
        .execute(&self.db)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        let mut assignment = draft.clone().into_assignment(id);
        assignment.grade = grade;
        Ok(assignment)
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError> {
        let affected = sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn toggle_assignment_complete(&self, id: i64) -> Result<Assignment, AppError> {
        // SET expressions read the pre-update row
        let affected = sqlx::query(
            r#"
            UPDATE assignments
            SET completed = NOT completed,
                grade = CASE WHEN completed = 1 THEN NULL ELSE grade END
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        self.get_assignment(id).await
    }
}
