use crate::models::{Project, ProjectStatus};
use api_core::reqwest::Method;
use api_core::{ApiClient, ApiError, MultipartForm};
use chrono::NaiveDate;
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "end_not_before_start"))]
pub struct ProjectForm {
    #[validate(length(min = 1, message = "Project title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
}

fn end_not_before_start(form: &ProjectForm) -> Result<(), ValidationError> {
    match form.end_date {
        Some(end) if end < form.start_date => {
            let mut error = ValidationError::new("end_before_start");
            error.message = Some("End date cannot be before the start date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

impl ProjectForm {
    /// Creation goes out as JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "title": self.title,
            "description": self.description.clone().unwrap_or_default(),
            "location": self.location.clone().unwrap_or_default(),
            "start_date": self.start_date.format(DATE_FORMAT).to_string(),
            "end_date": self.end_date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default(),
            "status": self.status.as_str(),
        })
    }

    /// Updates go out as multipart with the PUT override.
    pub fn to_update_multipart(&self) -> MultipartForm {
        MultipartForm::new()
            .text("title", self.title.as_str())
            .text_opt("description", self.description.clone())
            .text_opt("location", self.location.clone())
            .text("start_date", self.start_date.format(DATE_FORMAT).to_string())
            .text_opt(
                "end_date",
                self.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            )
            .text("status", self.status.as_str())
            .method_override(Method::PUT)
    }
}

#[derive(Clone)]
pub struct ProjectClient {
    api: ApiClient,
}

impl ProjectClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        self.api.get("projects", &[]).await?.into_data("projects")
    }

    /// Includes the project's timelines.
    pub async fn get(&self, id: u64) -> Result<Project, ApiError> {
        self.api
            .get(&format!("projects/{}", id), &[])
            .await?
            .into_data("project")
    }

    pub async fn create(&self, form: &ProjectForm) -> Result<Option<Project>, ApiError> {
        form.validate()?;
        self.api
            .post("projects", Some(form.to_json().into()))
            .await?
            .ensure_success()?
            .optional("project")
    }

    pub async fn update(&self, id: u64, form: &ProjectForm) -> Result<Option<Project>, ApiError> {
        form.validate()?;
        self.api
            .post_form(&format!("projects/{}", id), form.to_update_multipart())
            .await?
            .ensure_success()?
            .optional("project")
    }

    pub async fn delete(&self, id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .remove(&format!("projects/{}", id), &[])
            .await?
            .into_message()
    }
}
