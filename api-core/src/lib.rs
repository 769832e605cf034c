//! api-core: HTTP client core and session store for the Archflaire admin API.
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod session;

pub use config::ApiSettings;
pub use error::{ApiError, ErrorKind};
pub use http::{ApiClient, MultipartForm, RequestBody, ResponseEnvelope, Upload};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionError, SessionStore, UserProfile,
};

pub use reqwest;
pub use secrecy;
pub use serde_json;
pub use tokio_util::sync::CancellationToken;
pub use tracing;
pub use validator;
