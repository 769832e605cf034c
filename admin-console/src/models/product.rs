use super::CategoryRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "super::amount")]
    pub price: f64,
    pub stock_quantity: i64,
    pub sku: String,
    #[serde(deserialize_with = "super::flag")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    /// Public URLs, parallel to `images`.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Storage paths; these are what `images_to_delete[]` refers to.
    #[serde(default)]
    pub images: Vec<String>,
    /// Read-only here; variations are managed server-side.
    #[serde(default)]
    pub variations: Vec<ProductVariation>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub name: String,
    #[serde(deserialize_with = "super::amount")]
    pub price: f64,
    pub stock_quantity: i64,
    pub sku: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}
