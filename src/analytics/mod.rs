//! Pure derived-metrics computations over loaded courses and assignments.
//! Nothing here touches a store; every function takes its inputs and "now" explicitly.

pub mod aggregate;
pub mod calendar;
pub mod filter;
pub mod grading;
pub mod status;

pub use aggregate::{course_grade, overall_gpa, points_gpa};
pub use filter::{AssignmentFilter, FilterQuery, StatusFilter, filter_and_sort};
pub use grading::{BreakdownTier, ColorTier, to_breakdown_tier, to_color_tier, to_gpa_point, to_letter_grade};
pub use status::{AssignmentStatus, classify};
