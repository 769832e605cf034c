//! Request/response pipeline for the admin API.
mod body;
mod client;
mod envelope;

pub use body::{MultipartForm, RequestBody, Upload, METHOD_OVERRIDE_FIELD};
pub use client::ApiClient;
pub use envelope::ResponseEnvelope;
