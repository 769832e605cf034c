use super::project_client::DATE_FORMAT;
use crate::models::Timeline;
use api_core::reqwest::Method;
use api_core::{ApiClient, ApiError, MultipartForm, Upload};
use chrono::NaiveDate;
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct TimelineForm {
    #[validate(length(min = 1, message = "Timeline title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub timeline_date: NaiveDate,
    pub images: Vec<Upload>,
}

impl TimelineForm {
    fn base(&self) -> MultipartForm {
        MultipartForm::new()
            .text("title", self.title.as_str())
            .text_opt("description", self.description.clone())
            .text(
                "timeline_date",
                self.timeline_date.format(DATE_FORMAT).to_string(),
            )
    }

    pub fn to_multipart(&self) -> MultipartForm {
        self.base().indexed_files("images", self.images.iter().cloned())
    }

    /// `remaining_images` lists the ids of existing images to keep as a
    /// JSON array; every other existing image is dropped.
    pub fn to_update_multipart(&self, remaining_images: &[u64]) -> MultipartForm {
        let remaining = serde_json::Value::from(remaining_images.to_vec()).to_string();
        self.base()
            .text("remaining_images", remaining)
            .indexed_files("images", self.images.iter().cloned())
            .method_override(Method::PUT)
    }
}

#[derive(Clone)]
pub struct TimelineClient {
    api: ApiClient,
}

impl TimelineClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn path(project_id: u64, timeline_id: Option<u64>) -> String {
        match timeline_id {
            Some(id) => format!("projects/{}/timelines/{}", project_id, id),
            None => format!("projects/{}/timelines", project_id),
        }
    }

    pub async fn get(&self, project_id: u64, timeline_id: u64) -> Result<Timeline, ApiError> {
        self.api
            .get(&Self::path(project_id, Some(timeline_id)), &[])
            .await?
            .into_data("timeline")
    }

    pub async fn create(
        &self,
        project_id: u64,
        form: &TimelineForm,
    ) -> Result<Option<Timeline>, ApiError> {
        form.validate()?;
        self.api
            .post_form(&Self::path(project_id, None), form.to_multipart())
            .await?
            .ensure_success()?
            .optional("timeline")
    }

    pub async fn update(
        &self,
        project_id: u64,
        timeline_id: u64,
        form: &TimelineForm,
        remaining_images: &[u64],
    ) -> Result<Option<Timeline>, ApiError> {
        form.validate()?;
        self.api
            .post_form(
                &Self::path(project_id, Some(timeline_id)),
                form.to_update_multipart(remaining_images),
            )
            .await?
            .ensure_success()?
            .optional("timeline")
    }

    pub async fn delete(&self, project_id: u64, timeline_id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .remove(&Self::path(project_id, Some(timeline_id)), &[])
            .await?
            .into_message()
    }
}
