use crate::models::Category;
use api_core::reqwest::Method;
use api_core::{ApiClient, ApiError, MultipartForm, Upload};
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Only sent when a new image was picked.
    pub image: Option<Upload>,
}

impl CategoryForm {
    pub fn to_multipart(&self) -> MultipartForm {
        MultipartForm::new()
            .text("name", self.name.as_str())
            .text_opt("description", self.description.clone())
            .flag("is_active", self.is_active)
            .file_opt("image", self.image.clone())
    }
}

#[derive(Clone)]
pub struct CategoryClient {
    api: ApiClient,
}

impl CategoryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.api.get("categories", &[]).await?.into_data("categories")
    }

    pub async fn get(&self, id: u64) -> Result<Category, ApiError> {
        self.api
            .get(&format!("categories/{}", id), &[])
            .await?
            .into_data("category")
    }

    pub async fn create(&self, form: &CategoryForm) -> Result<Option<Category>, ApiError> {
        form.validate()?;
        self.api
            .post_form("categories", form.to_multipart())
            .await?
            .ensure_success()?
            .optional("category")
    }

    pub async fn update(&self, id: u64, form: &CategoryForm) -> Result<Option<Category>, ApiError> {
        form.validate()?;
        self.api
            .post_form(
                &format!("categories/{}", id),
                form.to_multipart().method_override(Method::PUT),
            )
            .await?
            .ensure_success()?
            .optional("category")
    }

    pub async fn delete(&self, id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .remove(&format!("categories/{}", id), &[])
            .await?
            .into_message()
    }
}
