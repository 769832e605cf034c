use crate::models::{Design, Paginated};
use api_core::http::METHOD_OVERRIDE_FIELD;
use api_core::reqwest::Method;
use api_core::{ApiClient, ApiError, MultipartForm, Upload};
use serde_json::json;
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct DesignForm {
    #[validate(length(min = 1, message = "Design title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<Upload>,
}

impl DesignForm {
    pub fn to_multipart(&self) -> MultipartForm {
        MultipartForm::new()
            .text("title", self.title.as_str())
            .text_opt("description", self.description.clone())
            .files("images", self.images.iter().cloned())
    }

    pub fn to_update_multipart(&self) -> MultipartForm {
        MultipartForm::new()
            .method_override(Method::PUT)
            .text("title", self.title.as_str())
            .text_opt("description", self.description.clone())
            .files("images", self.images.iter().cloned())
    }
}

#[derive(Clone)]
pub struct DesignClient {
    api: ApiClient,
}

impl DesignClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: u32) -> Result<Paginated<Design>, ApiError> {
        self.api
            .get("designs", &[("page", page.max(1).to_string())])
            .await?
            .into_data("designs")
    }

    pub async fn get(&self, id: u64) -> Result<Design, ApiError> {
        self.api
            .get(&format!("designs/{}", id), &[])
            .await?
            .into_data("design")
    }

    pub async fn create(&self, form: &DesignForm) -> Result<Option<Design>, ApiError> {
        form.validate()?;
        self.api
            .post_form("designs", form.to_multipart())
            .await?
            .ensure_success()?
            .optional("design")
    }

    pub async fn update(&self, id: u64, form: &DesignForm) -> Result<Option<Design>, ApiError> {
        form.validate()?;
        self.api
            .post_form(&format!("designs/{}", id), form.to_update_multipart())
            .await?
            .ensure_success()?
            .optional("design")
    }

    pub async fn delete(&self, id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .remove(&format!("designs/{}", id), &[])
            .await?
            .into_message()
    }

    /// Removes one image from a design. Sent as a JSON POST with the
    /// DELETE override.
    pub async fn delete_image(&self, image_id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .post_json(
                &format!("design-images/{}", image_id),
                &json!({ METHOD_OVERRIDE_FIELD: Method::DELETE.as_str() }),
            )
            .await?
            .into_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> DesignForm {
        DesignForm {
            title: "Scandi living room".to_string(),
            description: Some("Light oak and linen".to_string()),
            images: vec![
                Upload::new("a.jpg", vec![1]),
                Upload::new("b.jpg", vec![2]),
            ],
        }
    }

    #[test]
    fn create_field_set() {
        assert_eq!(
            form().to_multipart().field_names(),
            vec!["title", "description", "images[]", "images[]"]
        );
    }

    #[test]
    fn update_field_set() {
        let multipart = DesignForm {
            images: vec![],
            description: None,
            ..form()
        }
        .to_update_multipart();

        assert_eq!(
            multipart.field_names(),
            vec!["_method", "title", "description"]
        );
        assert_eq!(multipart.get_text("description"), Some(""));
    }
}
