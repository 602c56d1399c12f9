use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, Instrument};

use crate::models::{ClientError, ClientResult};
use crate::observability::Metrics;

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Shared HTTP transport to the catalog and order backend
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    metrics: Option<Arc<Metrics>>,
}

impl HttpBackend {
    /// Create a transport for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hybrid-market/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            metrics: None,
        })
    }

    /// Record every backend call in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `base_url` followed by `segments`. Each segment is percent-encoded on
    /// its own, so `/`, `?` and `#` inside an id stay part of that id.
    fn segment_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ClientError::Network {
            message: format!("Invalid backend URL: {}", e),
        })?;

        url.path_segments_mut()
            .map_err(|_| ClientError::Network {
                message: format!("Backend URL cannot carry a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Client span for one backend call. The query string is never recorded
    /// because admin calls carry the password there.
    fn create_backend_span(&self, operation: &str, method: &Method, url: &str) -> tracing::Span {
        tracing::info_span!(
            "backend",
            "otel.kind" = "client",
            "otel.name" = format!("{} {}", method, operation),
            "peer.service" = "hybrid-market-backend",
            "operation" = operation,
            "http.method" = %method,
            "http.url" = %url,
            "http.status_code" = tracing::field::Empty,
        )
    }

    /// GET `path` and decode a JSON answer
    pub async fn get_json<T>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.get(&url).query(query);
        let response = self.execute(operation, Method::GET, &url, request).await?;
        decode_json(response).await
    }

    /// POST a JSON body to `path` and decode a JSON answer
    pub async fn post_json<B, T>(&self, operation: &str, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        let response = self.execute(operation, Method::POST, &url, request).await?;
        decode_json(response).await
    }

    /// POST a JSON body to `path`, ignoring whatever a successful answer holds
    pub async fn post_unit<B>(&self, operation: &str, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        self.execute(operation, Method::POST, &url, request).await?;
        Ok(())
    }

    /// Like [`HttpBackend::post_unit`], for a path built from `segments`
    /// that may hold caller-supplied ids
    pub async fn post_unit_to_segments<B>(
        &self,
        operation: &str,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.segment_url(segments)?;
        let url_text = url.to_string();
        let request = self.client.post(url).json(body);
        self.execute(operation, Method::POST, &url_text, request).await?;
        Ok(())
    }

    /// Send a request, turning transport failures and non-success statuses
    /// into [`ClientError`]s. Nothing is retried.
    async fn execute(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> ClientResult<Response> {
        let span = self.create_backend_span(operation, &method, url);
        let start_time = Instant::now();

        let result = async {
            debug!("Calling backend");
            let response = request.send().await.map_err(|e| {
                error!(error = %e, "Backend request could not be completed");
                ClientError::from(e)
            })?;

            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());

            if status.is_success() {
                return Ok(response);
            }

            let detail = read_error_detail(response).await;
            error!(
                status_code = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "Backend returned an error status"
            );
            Err(ClientError::Application {
                status: status.as_u16(),
                detail,
            })
        }
        .instrument(span)
        .await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(response) => response.status().as_u16().to_string(),
                Err(ClientError::Application { status, .. }) => status.to_string(),
                Err(ClientError::Network { .. }) => "network_error".to_string(),
            };
            metrics.record_backend_request(operation, &outcome, start_time.elapsed().as_secs_f64());
        }

        result
    }
}

async fn decode_json<T>(response: Response) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    response.json::<T>().await.map_err(|e| ClientError::Network {
        message: format!("Failed to decode backend response: {}", e),
    })
}

/// Pull the `detail` field out of an error answer, if there is one
async fn read_error_detail(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let body: ErrorBody = serde_json::from_str(&text).ok()?;

    match body.detail? {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
