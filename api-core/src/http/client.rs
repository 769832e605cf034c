use super::{MultipartForm, RequestBody, ResponseEnvelope};
use crate::config::ApiSettings;
use crate::error::ApiError;
use crate::observability::{inject_request_id, inject_trace_context};
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Single chokepoint for every call to the admin API.
///
/// Each request picks up the current bearer token from the session store,
/// and every response is reduced to its [`ResponseEnvelope`]. The client
/// logs failures but never touches the session itself.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            ApiError::InvalidRequest(format!("invalid base URL `{}`: {}", settings.base_url, e))
        })?;

        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base_url,
            session,
            cancel: None,
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// A client whose calls fail with [`ApiError::Cancelled`] once `cancel`
    /// fires. In-flight requests are dropped at that point.
    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self.clone()
        }
    }

    /// Resolves `path` against the base URL. Slashes at the seam are
    /// normalized, so `/categories` and `categories` are the same endpoint.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid path `{}`: {}", path, e)))
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ResponseEnvelope, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.send(Method::POST, path, &[], body).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.send(Method::PUT, path, &[], body).await
    }

    pub async fn remove(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ResponseEnvelope, ApiError> {
        self.send(Method::DELETE, path, query, None).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ResponseEnvelope, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("cannot encode body: {}", e)))?;
        self.post(path, Some(RequestBody::Json(value))).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.post(path, Some(RequestBody::Multipart(form))).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<RequestBody>,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.endpoint(path)?;

        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        let request_id = inject_request_id(&mut headers);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        request = match body {
            // The transport sets multipart/form-data with its own boundary.
            Some(RequestBody::Multipart(form)) => {
                tracing::debug!(request_id = %request_id, fields = ?form.field_names(), "Multipart body");
                request.multipart(form.into_reqwest()?)
            }
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| ApiError::InvalidRequest(format!("cannot encode body: {}", e)))?;
                request
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes)
            }
            None => request.header(CONTENT_TYPE, "application/json"),
        };

        tracing::debug!(request_id = %request_id, method = %method, url = %url, "Sending API request");

        let exchange = async {
            let response = request.send().await.map_err(|e| {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    url = %url,
                    error = %e,
                    timeout = e.is_timeout(),
                    "API request failed without a response"
                );
                ApiError::Network(e)
            })?;
            unwrap_response(&request_id, &method, &url, response).await
        };

        match &self.cancel {
            Some(cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(request_id = %request_id, url = %url, "API request cancelled");
                    Err(ApiError::Cancelled)
                }
                result = exchange => result,
            },
            None => exchange.await,
        }
    }
}

/// Drops transport metadata and keeps only the application envelope.
async fn unwrap_response(
    request_id: &str,
    method: &Method,
    url: &Url,
    response: Response,
) -> Result<ResponseEnvelope, ApiError> {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.bytes().await.map_err(|e| {
        tracing::error!(request_id = %request_id, url = %url, error = %e, "Failed to read API response body");
        ApiError::Network(e)
    })?;

    if !status.is_success() {
        let body = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        tracing::error!(
            request_id = %request_id,
            method = %method,
            url = %url,
            status = %status,
            headers = ?headers,
            body = %body,
            "API responded with an error status"
        );
        return Err(ApiError::Status { status, body });
    }

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            tracing::error!(request_id = %request_id, url = %url, error = %e, "API response is not JSON");
            ApiError::Decode(format!("response body is not JSON: {}", e))
        })?
    };

    ResponseEnvelope::from_value(value).map_err(|e| {
        tracing::error!(request_id = %request_id, url = %url, error = %e, "API response has no envelope");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiSettings::new(base), Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn endpoint_normalizes_slashes() {
        let api = client("http://localhost:8000/api/");
        assert_eq!(
            api.endpoint("/categories").unwrap().as_str(),
            "http://localhost:8000/api/categories"
        );
        assert_eq!(
            api.endpoint("auth/forgot-password").unwrap().as_str(),
            "http://localhost:8000/api/auth/forgot-password"
        );

        let bare = client("http://localhost:8000/api");
        assert_eq!(
            bare.endpoint("projects/3/timelines").unwrap().as_str(),
            "http://localhost:8000/api/projects/3/timelines"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = ApiClient::new(
            &ApiSettings::new("not a url"),
            Arc::new(MemorySessionStore::new()),
        );
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn cancelled_scope_fails_before_sending() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let api = client("http://127.0.0.1:9/api/").scoped(cancel);

        let result = api.get("categories", &[]).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
