use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::assignment::parse_due_date;
use crate::models::course::DEFAULT_COURSE_COLOR;
use crate::models::{Assignment, AssignmentDraft, Course, CourseDraft, Priority, Semester};

pub const COURSE_TABLE: &str = "course_c";
pub const ASSIGNMENT_TABLE: &str = "assignment_c";

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct GetResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct MutationResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<RecordResult<T>>,
}

#[derive(Debug, Deserialize)]
pub struct RecordResult<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<RecordFieldError>,
}

#[derive(Debug, Deserialize)]
pub struct RecordFieldError {
    #[serde(rename = "fieldLabel", default)]
    pub field_label: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WriteRequest<T> {
    pub records: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

/// A course as the record service stores it; every field but `Id` may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(default)]
    pub name_c: Option<String>,
    #[serde(default)]
    pub instructor_c: Option<String>,
    #[serde(default)]
    pub credits_c: Option<f64>,
    #[serde(default)]
    pub color_c: Option<String>,
    #[serde(default)]
    pub semester_c: Option<String>,
    #[serde(default)]
    pub year_c: Option<i32>,
}

impl From<CourseRecord> for Course {
    fn from(record: CourseRecord) -> Self {
        Course {
            id: record.id,
            name: record.name_c.unwrap_or_default(),
            instructor: record.instructor_c.unwrap_or_default(),
            credits: record.credits_c.unwrap_or(0.0),
            color: record
                .color_c
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COURSE_COLOR.to_string()),
            semester: record
                .semester_c
                .and_then(|s| s.parse::<Semester>().ok())
                .unwrap_or_default(),
            year: record.year_c.unwrap_or_else(|| Utc::now().year()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseFields {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name_c: String,
    pub instructor_c: String,
    pub credits_c: f64,
    pub color_c: String,
    pub semester_c: String,
    pub year_c: i32,
}

impl CourseFields {
    pub fn from_draft(id: Option<i64>, draft: &CourseDraft) -> Self {
        Self {
            id,
            name_c: draft.name.clone(),
            instructor_c: draft.instructor.clone(),
            credits_c: draft.credits,
            color_c: draft.color.clone(),
            semester_c: draft.semester.as_str().to_string(),
            year_c: draft.year,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(default)]
    pub course_id_c: Option<i64>,
    #[serde(default)]
    pub title_c: Option<String>,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub due_date_c: Option<String>,
    #[serde(default)]
    pub priority_c: Option<String>,
    #[serde(default)]
    pub total_points_c: Option<f64>,
    #[serde(default)]
    pub completed_c: Option<bool>,
    #[serde(default)]
    pub grade_c: Option<f64>,
}

impl TryFrom<AssignmentRecord> for Assignment {
    type Error = AppError;

    fn try_from(record: AssignmentRecord) -> Result<Self, Self::Error> {
        let course_id = record
            .course_id_c
            .ok_or_else(|| AppError::OperationFailed(format!("assignment {} has no course", record.id)))?;
        let due_date = record
            .due_date_c
            .as_deref()
            .and_then(parse_due_date)
            .ok_or_else(|| AppError::OperationFailed(format!("assignment {} has no valid due date", record.id)))?;
        let completed = record.completed_c.unwrap_or(false);

        Ok(Assignment {
            id: record.id,
            course_id,
            title: record.title_c.unwrap_or_default(),
            description: record.description_c.filter(|d| !d.is_empty()),
            due_date,
            priority: record
                .priority_c
                .and_then(|p| p.parse::<Priority>().ok())
                .unwrap_or_default(),
            total_points: record.total_points_c.unwrap_or(0.0),
            completed,
            grade: if completed { record.grade_c } else { None },
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentFields {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub course_id_c: i64,
    pub title_c: String,
    pub description_c: Option<String>,
    pub due_date_c: String,
    pub priority_c: String,
    pub total_points_c: f64,
    pub completed_c: bool,
    pub grade_c: Option<f64>,
}

impl AssignmentFields {
    pub fn from_draft(id: Option<i64>, draft: &AssignmentDraft) -> Self {
        Self {
            id,
            course_id_c: draft.course_id,
            title_c: draft.title.clone(),
            description_c: draft.description.clone(),
            due_date_c: draft.due_date.to_rfc3339(),
            priority_c: draft.priority.as_str().to_string(),
            total_points_c: draft.total_points,
            completed_c: draft.completed,
            grade_c: if draft.completed { draft.grade } else { None },
        }
    }

    pub fn from_assignment(assignment: &Assignment) -> Self {
        Self {
            id: Some(assignment.id),
            course_id_c: assignment.course_id,
            title_c: assignment.title.clone(),
            description_c: assignment.description.clone(),
            due_date_c: assignment.due_date.to_rfc3339(),
            priority_c: assignment.priority.as_str().to_string(),
            total_points_c: assignment.total_points,
            completed_c: assignment.completed,
            grade_c: assignment.grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_course_record_gets_defaults() {
        let record: CourseRecord = serde_json::from_str(r#"{"Id": 12, "name_c": "Physics"}"#).unwrap();
        let course = Course::from(record);
        assert_eq!(course.id, 12);
        assert_eq!(course.name, "Physics");
        assert_eq!(course.instructor, "");
        assert_eq!(course.credits, 0.0);
        assert_eq!(course.color, DEFAULT_COURSE_COLOR);
        assert_eq!(course.semester, Semester::Fall);
        assert_eq!(course.year, Utc::now().year());
    }

    #[test]
    fn test_assignment_record_enforces_grade_invariant() {
        let record: AssignmentRecord = serde_json::from_str(
            r#"{"Id": 3, "course_id_c": 1, "title_c": "Quiz", "due_date_c": "2024-01-12",
                "priority_c": "HIGH", "total_points_c": 10, "completed_c": false, "grade_c": 8}"#,
        )
        .unwrap();
        let assignment = Assignment::try_from(record).unwrap();
        assert_eq!(assignment.priority, Priority::High);
        assert_eq!(assignment.grade, None);
    }

    #[test]
    fn test_assignment_record_without_due_date_is_rejected() {
        let record = AssignmentRecord {
            id: 4,
            course_id_c: Some(1),
            ..Default::default()
        };
        assert!(matches!(Assignment::try_from(record), Err(AppError::OperationFailed(_))));
    }

    #[test]
    fn test_write_payload_shape() {
        let record = AssignmentRecord {
            id: 9,
            course_id_c: Some(2),
            title_c: Some("Lab".to_string()),
            due_date_c: Some("2024-05-01T00:00:00Z".to_string()),
            total_points_c: Some(20.0),
            completed_c: Some(true),
            grade_c: Some(18.0),
            ..Default::default()
        };
        let assignment = Assignment::try_from(record).unwrap();
        let body = serde_json::to_value(WriteRequest {
            records: vec![AssignmentFields::from_assignment(&assignment)],
        })
        .unwrap();
        assert_eq!(body["records"][0]["Id"], 9);
        assert_eq!(body["records"][0]["grade_c"], 18.0);
        assert_eq!(body["records"][0]["priority_c"], "medium");

        let delete = serde_json::to_value(DeleteRequest { record_ids: vec![9] }).unwrap();
        assert_eq!(delete, serde_json::json!({ "RecordIds": [9] }));
    }

    #[test]
    fn test_envelopes_without_data_deserialize() {
        let get: GetResponse<CourseRecord> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(get.success);
        assert!(get.data.is_none());

        let deleted: MutationResponse<serde_json::Value> = serde_json::from_str(
            r#"{"success": true, "results": [{"success": true}]}"#,
        )
        .unwrap();
        assert_eq!(deleted.results.len(), 1);
        assert!(deleted.results[0].data.is_none());
        assert!(deleted.results[0].errors.is_empty());

        let failed: MutationResponse<CourseRecord> = serde_json::from_str(
            r#"{"success": true, "results": [{"success": false, "message": "bad",
                "errors": [{"fieldLabel": "name_c", "message": "required"}]}]}"#,
        )
        .unwrap();
        assert!(!failed.results[0].success);
        assert_eq!(failed.results[0].errors[0].field_label, "name_c");
    }
}
