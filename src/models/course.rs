use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldErrors};

pub const DEFAULT_COURSE_COLOR: &str = "#3b82f6";
pub const UNKNOWN_COURSE_NAME: &str = "Unknown Course";
pub const UNKNOWN_COURSE_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Semester {
    #[default]
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Fall => "Fall",
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
            Semester::Winter => "Winter",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Fall" => Ok(Semester::Fall),
            "Spring" => Ok(Semester::Spring),
            "Summer" => Ok(Semester::Summer),
            "Winter" => Ok(Semester::Winter),
            other => Err(AppError::field("semester", format!("Unknown semester: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub instructor: String,
    pub credits: f64,
    pub color: String,
    pub semester: Semester,
    pub year: i32,
}

/// Raw course form as submitted by a client. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    pub credits: Option<f64>,
    pub color: Option<String>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
}

/// A course that passed validation; the only shape a store accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub instructor: String,
    pub credits: f64,
    pub color: String,
    pub semester: Semester,
    pub year: i32,
}

impl CourseRequest {
    pub fn validate(self) -> Result<CourseDraft, AppError> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", "Course name is required");
        }

        let instructor = self.instructor.trim().to_string();
        if instructor.is_empty() {
            errors.add("instructor", "Instructor name is required");
        }

        let credits = match self.credits {
            Some(c) if c.is_finite() && c > 0.0 && c <= 10.0 => c,
            _ => {
                errors.add("credits", "Credits must be a number between 1 and 10");
                0.0
            }
        };

        let color = self.color.unwrap_or_else(|| DEFAULT_COURSE_COLOR.to_string());
        if !is_hex_color(&color) {
            errors.add("color", "Color must be a hex color");
        }

        errors.into_result()?;

        Ok(CourseDraft {
            name,
            instructor,
            credits,
            color,
            semester: self.semester.unwrap_or_default(),
            year: self.year.unwrap_or_else(|| Utc::now().year()),
        })
    }
}

impl CourseDraft {
    pub fn into_course(self, id: i64) -> Course {
        Course {
            id,
            name: self.name,
            instructor: self.instructor,
            credits: self.credits,
            color: self.color,
            semester: self.semester,
            year: self.year,
        }
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Display name and color for a course reference that may dangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLabel {
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
}

impl CourseLabel {
    pub fn unknown() -> Self {
        Self {
            id: None,
            name: UNKNOWN_COURSE_NAME.to_string(),
            color: UNKNOWN_COURSE_COLOR.to_string(),
        }
    }

    pub fn resolve(courses: &[Course], course_id: i64) -> Self {
        courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| Self {
                id: Some(c.id),
                name: c.name.clone(),
                color: c.color.clone(),
            })
            .unwrap_or_else(Self::unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CourseRequest {
        CourseRequest {
            name: "Linear Algebra".to_string(),
            instructor: "Dr. Noether".to_string(),
            credits: Some(4.0),
            color: Some("#10b981".to_string()),
            semester: Some(Semester::Spring),
            year: Some(2024),
        }
    }

    #[test]
    fn test_valid_request_produces_draft() {
        let draft = request().validate().expect("valid course");
        assert_eq!(draft.name, "Linear Algebra");
        assert_eq!(draft.semester, Semester::Spring);
        assert_eq!(draft.credits, 4.0);
    }

    #[test]
    fn test_defaults_fill_missing_optional_fields() {
        let mut req = request();
        req.color = None;
        req.semester = None;
        req.year = None;
        let draft = req.validate().expect("valid course");
        assert_eq!(draft.color, DEFAULT_COURSE_COLOR);
        assert_eq!(draft.semester, Semester::Fall);
        assert_eq!(draft.year, Utc::now().year());
    }

    #[test]
    fn test_every_bad_field_is_reported() {
        let req = CourseRequest {
            name: "   ".to_string(),
            instructor: String::new(),
            credits: Some(11.0),
            color: Some("blue".to_string()),
            semester: None,
            year: None,
        };
        match req.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 4);
                assert_eq!(errors.get("name"), Some("Course name is required"));
                assert_eq!(errors.get("instructor"), Some("Instructor name is required"));
                assert!(errors.contains("credits"));
                assert!(errors.contains("color"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_and_missing_credits_rejected() {
        let mut req = request();
        req.credits = Some(0.0);
        assert!(req.validate().is_err());

        let mut req = request();
        req.credits = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_label_falls_back_for_missing_course() {
        let course = request().validate().unwrap().into_course(7);
        let courses = vec![course];

        let found = CourseLabel::resolve(&courses, 7);
        assert_eq!(found.name, "Linear Algebra");

        let missing = CourseLabel::resolve(&courses, 99);
        assert_eq!(missing.name, UNKNOWN_COURSE_NAME);
        assert_eq!(missing.color, UNKNOWN_COURSE_COLOR);
        assert_eq!(missing.id, None);
    }

    #[test]
    fn test_semester_parses_store_strings() {
        assert_eq!("Winter".parse::<Semester>().unwrap(), Semester::Winter);
        assert!("Autumn".parse::<Semester>().is_err());
    }
}
