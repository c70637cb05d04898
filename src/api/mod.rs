use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::patch;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::analytics::filter::{AssignmentFilter, FilterQuery};
use crate::error::AppError;
use crate::models::*;
use crate::services::views::{self, AssignmentList, CalendarView, CourseCard, Dashboard, GradesReport};
use crate::state::AppState;

#[derive(Deserialize)]
struct GradesQueryParams {
    course: Option<String>,
}

#[derive(Deserialize)]
struct CalendarQueryParams {
    year: Option<i32>,
    month: Option<u32>,
    selected: Option<NaiveDate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/cards", get(course_cards))
        .route("/courses/{id}", get(get_course).put(update_course).delete(delete_course))
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route(
            "/assignments/{id}",
            get(get_assignment).put(update_assignment).delete(delete_assignment),
        )
        .route("/assignments/{id}/toggle", patch(toggle_assignment))
        .route("/dashboard", get(dashboard))
        .route("/grades", get(grades))
        .route("/calendar", get(calendar))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.tracker.store().ping().await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.tracker.list_courses().await?;
    Ok(Json(courses))
}

async fn course_cards(State(state): State<AppState>) -> Result<Json<Vec<CourseCard>>, AppError> {
    let snapshot = state.tracker.load().await?;
    Ok(Json(views::course_cards(&snapshot)))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let course = state.tracker.get_course(id).await?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.tracker.create_course(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = state.tracker.update_course(id, req).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.tracker.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<AssignmentList>, AppError> {
    let filter = AssignmentFilter::try_from(params)?;
    let snapshot = state.tracker.load().await?;
    Ok(Json(views::assignment_list(&snapshot, &filter, Utc::now())))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.tracker.get_assignment(id).await?;
    Ok(Json(assignment))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = state.tracker.create_assignment(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.tracker.update_assignment(id, req).await?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.tracker.delete_assignment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.tracker.toggle_assignment(id).await?;
    Ok(Json(assignment))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let snapshot = state.tracker.load().await?;
    Ok(Json(views::dashboard(&snapshot, Utc::now())))
}

async fn grades(
    State(state): State<AppState>,
    Query(params): Query<GradesQueryParams>,
) -> Result<Json<GradesReport>, AppError> {
    let course = match params.course.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| AppError::field("course", format!("Unknown course filter: {}", raw)))?,
        ),
    };
    let snapshot = state.tracker.load().await?;
    Ok(Json(views::grades_report(&snapshot, course)))
}

async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarQueryParams>,
) -> Result<Json<CalendarView>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();
    let year = params.year.unwrap_or(today.year());
    let month = params.month.unwrap_or(today.month());
    let selected = params.selected.unwrap_or(today);

    let snapshot = state.tracker.load().await?;
    views::calendar_view(&snapshot, year, month, selected, now)
        .map(Json)
        .ok_or_else(|| AppError::field("month", "Month must be between 1 and 12"))
}
