use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::config::RemoteConfig;
use crate::error::AppError;
use crate::models::{Assignment, AssignmentDraft, Course, CourseDraft};
use crate::store::RecordStore;
use crate::store::dto::{
    ASSIGNMENT_TABLE, AssignmentFields, AssignmentRecord, COURSE_TABLE, CourseFields, CourseRecord,
    DeleteRequest, GetResponse, ListResponse, MutationResponse, WriteRequest,
};

/// Adapter for the hosted record service. One table per record type.
pub struct RemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.config.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Project-Id", &self.config.project_id)
            .header("Authorization", format!("Bearer {}", self.config.public_key))
    }

    async fn send<R: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<R, AppError> {
        let response = builder.send().await.map_err(|e| {
            error!("record service unreachable ({}): {}", what, e);
            AppError::OperationFailed(format!("Failed to {}", what))
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            return Err(AppError::OperationFailed(format!(
                "Record service error {} ({}): {}",
                status, what, body
            )));
        }

        serde_json::from_str::<R>(&body).map_err(|e| {
            error!("Failed to parse record service response ({}): {}", what, e);
            AppError::OperationFailed(format!("Failed to parse record service response: {}", e))
        })
    }

    async fn fetch_all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, AppError> {
        let url = self.records_url(table);
        let response: ListResponse<T> = self
            .send(self.request(Method::GET, &url), &format!("list {}", table))
            .await?;
        if !response.success {
            return Err(AppError::OperationFailed(
                response.message.unwrap_or_else(|| format!("Failed to list {}", table)),
            ));
        }
        Ok(response.data)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, table: &str, id: i64) -> Result<T, AppError> {
        let url = format!("{}/{}", self.records_url(table), id);
        let response: GetResponse<T> = self
            .send(self.request(Method::GET, &url), &format!("get {} {}", table, id))
            .await?;
        if !response.success {
            return Err(AppError::OperationFailed(
                response.message.unwrap_or_else(|| format!("Failed to get {} {}", table, id)),
            ));
        }
        response.data.ok_or(AppError::NotFound)
    }

    /// Send a single-record mutation and return the record the service echoes back.
    async fn mutate<B, T>(&self, method: Method, table: &str, body: &B, what: &str) -> Result<Option<T>, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.records_url(table);
        let response: MutationResponse<T> = self
            .send(self.request(method, &url).json(body), what)
            .await?;

        if !response.success {
            return Err(AppError::OperationFailed(
                response.message.unwrap_or_else(|| format!("Failed to {}", what)),
            ));
        }

        let mut echoed = None;
        let mut failures = Vec::new();
        for result in response.results {
            if result.success {
                echoed = echoed.or(result.data);
            } else {
                for field_error in &result.errors {
                    warn!("{} rejected field {}: {}", what, field_error.field_label, field_error.message);
                }
                failures.push(result.message.unwrap_or_else(|| format!("Failed to {}", what)));
            }
        }

        if !failures.is_empty() {
            return Err(AppError::OperationFailed(failures.join("; ")));
        }
        Ok(echoed)
    }

    async fn write_course(&self, method: Method, id: Option<i64>, draft: &CourseDraft) -> Result<Course, AppError> {
        let what = match id {
            Some(id) => format!("update course {}", id),
            None => "create course".to_string(),
        };
        let body = WriteRequest {
            records: vec![CourseFields::from_draft(id, draft)],
        };
        let record: CourseRecord = self
            .mutate(method, COURSE_TABLE, &body, &what)
            .await?
            .ok_or_else(|| AppError::OperationFailed(format!("Failed to {}", what)))?;
        Ok(Course::from(record))
    }

    async fn write_assignment(&self, method: Method, fields: AssignmentFields) -> Result<Assignment, AppError> {
        let what = match fields.id {
            Some(id) => format!("update assignment {}", id),
            None => "create assignment".to_string(),
        };
        let body = WriteRequest { records: vec![fields] };
        let record: AssignmentRecord = self
            .mutate(method, ASSIGNMENT_TABLE, &body, &what)
            .await?
            .ok_or_else(|| AppError::OperationFailed(format!("Failed to {}", what)))?;
        Assignment::try_from(record)
    }

    async fn delete_record(&self, table: &str, id: i64) -> Result<bool, AppError> {
        match self.fetch_one::<serde_json::Value>(table, id).await {
            Ok(_) => {}
            Err(AppError::NotFound) => return Ok(false),
            Err(e) => return Err(e),
        }
        let body = DeleteRequest { record_ids: vec![id] };
        match self
            .mutate::<_, serde_json::Value>(Method::DELETE, table, &body, &format!("delete {} {}", table, id))
            .await
        {
            Ok(_) => Ok(true),
            Err(AppError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let records: Vec<CourseRecord> = self.fetch_all(COURSE_TABLE).await?;
        Ok(records.into_iter().map(Course::from).collect())
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        let record: CourseRecord = self.fetch_one(COURSE_TABLE, id).await?;
        Ok(Course::from(record))
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, AppError> {
        let course = self.write_course(Method::POST, None, draft).await?;
        info!("created course {} in record service", course.id);
        Ok(course)
    }

    async fn update_course(&self, id: i64, draft: &CourseDraft) -> Result<Course, AppError> {
        // the service answers a PATCH for an unknown id with a failed result, not a 404
        self.get_course(id).await?;
        self.write_course(Method::PATCH, Some(id), draft).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        self.delete_record(COURSE_TABLE, id).await
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        let records: Vec<AssignmentRecord> = self.fetch_all(ASSIGNMENT_TABLE).await?;
        let mut assignments = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id;
            match Assignment::try_from(record) {
                Ok(assignment) => assignments.push(assignment),
                Err(e) => warn!("Skipping assignment record {}: {}", id, e),
            }
        }
        Ok(assignments)
    }

    async fn get_assignment(&self, id: i64) -> Result<Assignment, AppError> {
        let record: AssignmentRecord = self.fetch_one(ASSIGNMENT_TABLE, id).await?;
        Assignment::try_from(record)
    }

    async fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        let assignment = self
            .write_assignment(Method::POST, AssignmentFields::from_draft(None, draft))
            .await?;
        info!("created assignment {} in record service", assignment.id);
        Ok(assignment)
    }

    async fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment, AppError> {
        self.fetch_one::<AssignmentRecord>(ASSIGNMENT_TABLE, id).await?;
        self.write_assignment(Method::PATCH, AssignmentFields::from_draft(Some(id), draft))
            .await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError> {
        self.delete_record(ASSIGNMENT_TABLE, id).await
    }

    async fn toggle_assignment_complete(&self, id: i64) -> Result<Assignment, AppError> {
        let mut assignment = self.get_assignment(id).await?;
        assignment.toggle_complete();
        self.write_assignment(Method::PATCH, AssignmentFields::from_assignment(&assignment))
            .await
    }
}
