//! Percentage to GPA point, letter grade, and color tier.
//!
//! Every ladder is evaluated top-down with `p >= threshold`, first match wins.

use serde::Serialize;

const GPA_LADDER: [(f64, f64); 10] = [
    (97.0, 4.0),
    (93.0, 3.7),
    (90.0, 3.3),
    (87.0, 3.0),
    (83.0, 2.7),
    (80.0, 2.3),
    (77.0, 2.0),
    (73.0, 1.7),
    (70.0, 1.3),
    (67.0, 1.0),
];

const LETTER_LADDER: [(f64, &str); 11] = [
    (97.0, "A+"),
    (93.0, "A"),
    (90.0, "A-"),
    (87.0, "B+"),
    (83.0, "B"),
    (80.0, "B-"),
    (77.0, "C+"),
    (73.0, "C"),
    (70.0, "C-"),
    (67.0, "D+"),
    (60.0, "D"),
];

pub fn to_gpa_point(percentage: f64) -> f64 {
    GPA_LADDER
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, point)| *point)
        .unwrap_or(0.0)
}

pub fn to_letter_grade(percentage: f64) -> &'static str {
    LETTER_LADDER
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

/// Three-band tier used for assignment percentages and progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Success,
    Warning,
    Error,
}

pub fn to_color_tier(percentage: f64) -> ColorTier {
    if percentage >= 90.0 {
        ColorTier::Success
    } else if percentage >= 80.0 {
        ColorTier::Warning
    } else {
        ColorTier::Error
    }
}

/// Four-band tier used for the course badge in the grades breakdown.
/// Kept separate from [`ColorTier`]: the 70-80 band renders neutral here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownTier {
    Success,
    Warning,
    Default,
    Error,
}

pub fn to_breakdown_tier(percentage: f64) -> BreakdownTier {
    if percentage >= 90.0 {
        BreakdownTier::Success
    } else if percentage >= 80.0 {
        BreakdownTier::Warning
    } else if percentage >= 70.0 {
        BreakdownTier::Default
    } else {
        BreakdownTier::Error
    }
}
