pub mod auth;
pub mod category;
pub mod design;
pub mod order;
pub mod product;
pub mod project;

pub use auth::{AuthSession, InvitationDetails};
pub use category::{Category, CategoryRef};
pub use design::{Design, DesignImage};
pub use order::{Order, OrderItem, OrderProduct, ShippingAddress};
pub use product::{Product, ProductVariation};
pub use project::{Project, ProjectStatus, Timeline, TimelineImage};

use serde::{Deserialize, Deserializer, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub total: u64,
    pub last_page: u32,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Accepts `true`/`false`, `1`/`0` and their string forms.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => Ok(value),
        Raw::Int(value) => Ok(value != 0),
        Raw::Text(value) => match value.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid flag `{}`", other))),
        },
    }
}

/// Accepts numbers and numeric strings (decimal columns arrive as strings).
pub(crate) fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(value) => value
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount `{}`", value))),
    }
}
