pub mod cli;
pub mod config;
pub mod identity;
pub mod models;
pub mod navigation;
pub mod services;
pub mod views;

use api_core::reqwest::Url;
use api_core::{ApiClient, ApiError, FileSessionStore, SessionStore};
use identity::IdentityBinding;
use navigation::Navigator;
use services::{
    AuthClient, CategoryClient, DesignClient, OrderClient, ProductClient, ProjectClient,
    TimelineClient,
};
use std::sync::Arc;

/// Shared console state: one API client (and through it, one session store)
/// plus the navigator every flow reports to.
#[derive(Clone)]
pub struct Console {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
}

impl Console {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        Self { api, navigator }
    }

    /// Opens the persisted session for the configured API origin.
    pub fn from_settings(
        settings: &config::Settings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let origin = Url::parse(&settings.api.base_url).map_err(|e| {
            ApiError::InvalidRequest(format!(
                "invalid base URL `{}`: {}",
                settings.api.base_url, e
            ))
        })?;
        let store = FileSessionStore::open(&settings.session.resolve_dir(), &origin)?;
        tracing::debug!(dir = %store.dir().display(), "Opened session store");

        let api = ApiClient::new(&settings.api, Arc::new(store))?;
        Ok(Self::new(api, navigator))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.api.session()
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn categories(&self) -> CategoryClient {
        CategoryClient::new(self.api.clone())
    }

    pub fn products(&self) -> ProductClient {
        ProductClient::new(self.api.clone())
    }

    pub fn orders(&self) -> OrderClient {
        OrderClient::new(self.api.clone())
    }

    pub fn projects(&self) -> ProjectClient {
        ProjectClient::new(self.api.clone())
    }

    pub fn timelines(&self) -> TimelineClient {
        TimelineClient::new(self.api.clone())
    }

    pub fn designs(&self) -> DesignClient {
        DesignClient::new(self.api.clone())
    }

    /// A fresh identity binding in the `Loading` state.
    pub fn identity(&self) -> IdentityBinding {
        IdentityBinding::new(
            self.auth(),
            Arc::clone(self.session()),
            Arc::clone(&self.navigator),
        )
    }
}
