use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort weight, higher first.
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(AppError::field("priority", format!("Unknown priority: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "due_date")]
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    pub total_points: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub grade: Option<f64>,
}

impl Assignment {
    /// Earned points, only for completed assignments that carry a grade.
    pub fn earned_points(&self) -> Option<f64> {
        if self.completed { self.grade } else { None }
    }

    pub fn percentage(&self) -> Option<f64> {
        self.earned_points()
            .filter(|_| self.total_points > 0.0)
            .map(|grade| grade / self.total_points * 100.0)
    }

    /// Flip completion; un-completing always drops the grade.
    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
        if !self.completed {
            self.grade = None;
        }
    }
}

/// Raw assignment form as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub course_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default, with = "due_date::option")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub total_points: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    pub grade: Option<f64>,
}

/// A validated assignment, with `grade` already cleared when not completed.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentDraft {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub total_points: f64,
    pub completed: bool,
    pub grade: Option<f64>,
}

impl AssignmentRequest {
    pub fn validate(self) -> Result<AssignmentDraft, AppError> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "Assignment title is required");
        }

        if self.course_id.is_none() {
            errors.add("courseId", "Please select a course");
        }

        if self.due_date.is_none() {
            errors.add("dueDate", "Due date is required");
        }

        let total_points = match self.total_points {
            Some(p) if p.is_finite() && p > 0.0 => Some(p),
            _ => {
                errors.add("totalPoints", "Total points must be a positive number");
                None
            }
        };

        let grade = if self.completed { self.grade } else { None };
        if let (Some(g), Some(total)) = (grade, total_points) {
            if !g.is_finite() || g < 0.0 || g > total {
                errors.add("grade", format!("Grade must be between 0 and {}", total));
            }
        }

        errors.into_result()?;

        let (Some(course_id), Some(due_date), Some(total_points)) =
            (self.course_id, self.due_date, total_points)
        else {
            return Err(AppError::Validation(FieldErrors::new()));
        };

        Ok(AssignmentDraft {
            course_id,
            title,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            due_date,
            priority: self.priority.unwrap_or_default(),
            total_points,
            completed: self.completed,
            grade,
        })
    }
}

impl AssignmentDraft {
    pub fn into_assignment(self, id: i64) -> Assignment {
        Assignment {
            id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            total_points: self.total_points,
            completed: self.completed,
            grade: self.grade,
        }
    }
}

/// Parse a due date as either `YYYY-MM-DD` (midnight UTC), a naive
/// `YYYY-MM-DDTHH:MM:SS`, or a full RFC 3339 timestamp.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub mod due_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_due_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid due date: {}", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::super::parse_due_date(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid due date: {}", raw))),
            }
        }
    }
}
