use crate::models::Product;
use api_core::reqwest::Method;
use api_core::{ApiClient, ApiError, MultipartForm, Upload};
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct ProductForm {
    #[validate(range(min = 1, message = "Select a category"))]
    pub category_id: u64,

    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock_quantity: i64,

    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,

    pub is_active: bool,

    /// New images to attach; existing ones are untouched.
    pub images: Vec<Upload>,
}

impl ProductForm {
    pub fn to_multipart(&self) -> MultipartForm {
        MultipartForm::new()
            .text("category_id", self.category_id.to_string())
            .text("name", self.name.as_str())
            .text_opt("description", self.description.clone())
            .text("price", self.price.to_string())
            .text("stock_quantity", self.stock_quantity.to_string())
            .text("sku", self.sku.as_str())
            .flag("is_active", self.is_active)
            .files("images", self.images.iter().cloned())
    }

    /// Update body: the create fields, the storage paths of images to
    /// drop, and the PUT override.
    pub fn to_update_multipart(&self, images_to_delete: &[String]) -> MultipartForm {
        self.to_multipart()
            .texts("images_to_delete", images_to_delete.iter().map(String::as_str))
            .method_override(Method::PUT)
    }
}

#[derive(Clone)]
pub struct ProductClient {
    api: ApiClient,
}

impl ProductClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.api.get("products", &[]).await?.into_data("products")
    }

    pub async fn get(&self, id: u64) -> Result<Product, ApiError> {
        self.api
            .get(&format!("products/{}", id), &[])
            .await?
            .into_data("product")
    }

    pub async fn create(&self, form: &ProductForm) -> Result<Option<Product>, ApiError> {
        form.validate()?;
        self.api
            .post_form("products", form.to_multipart())
            .await?
            .ensure_success()?
            .optional("product")
    }

    pub async fn update(
        &self,
        id: u64,
        form: &ProductForm,
        images_to_delete: &[String],
    ) -> Result<Option<Product>, ApiError> {
        form.validate()?;
        self.api
            .post_form(
                &format!("products/{}", id),
                form.to_update_multipart(images_to_delete),
            )
            .await?
            .ensure_success()?
            .optional("product")
    }

    pub async fn delete(&self, id: u64) -> Result<Option<String>, ApiError> {
        self.api
            .remove(&format!("products/{}", id), &[])
            .await?
            .into_message()
    }
}
