//! Authenticated transport with retry and cursor pagination.

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::ApiError;
use crate::settings::ApiSettings;
use crate::Result;

/// One page of a list endpoint.
#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    settings: ApiSettings,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("stdsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// `{base}/organizations/{provider}/{organization}/{path...}` with each
    /// segment percent-encoded.
    pub fn endpoint(&self, path: &[&str]) -> Result<Url> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                path: path.join("/"),
                reason: format!("{} cannot be a base URL", self.settings.base_url),
            })?
            .pop_if_empty()
            .extend([
                "organizations",
                self.settings.provider.as_str(),
                self.settings.organization.as_str(),
            ])
            .extend(path);
        Ok(url)
    }

    /// Issues one logical request, retrying 429, 5xx and connection failures.
    ///
    /// An empty success body decodes to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let route = path.join("/");
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let mut builder = self
                .http
                .request(method.clone(), url.clone())
                .header(ACCEPT, "application/json");
            builder = self.settings.credential.apply(builder, &self.settings.token);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let (err, retry_after) = match builder.send().await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .map_err(|source| ApiError::Request {
                            method: method.clone(),
                            path: route.clone(),
                            attempts: attempt,
                            source,
                        })?;
                    tracing::trace!(
                        method = %method,
                        path = %route,
                        status = status.as_u16(),
                        "Response"
                    );
                    if text.trim().is_empty() {
                        return Ok(Value::Null);
                    }
                    return serde_json::from_str(&text).map_err(|source| ApiError::Decode {
                        path: route,
                        source,
                    });
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after = retry_after(&response);
                    let body = response.text().await.unwrap_or_default();
                    let err = ApiError::Status {
                        method: method.clone(),
                        path: route.clone(),
                        status,
                        body,
                        attempts: attempt,
                    };
                    (err, retry_after)
                }
                Err(source) => {
                    let err = ApiError::Request {
                        method: method.clone(),
                        path: route.clone(),
                        attempts: attempt,
                        source,
                    };
                    (err, None)
                }
            };

            if !err.is_retryable() || attempt > self.settings.max_retries {
                return Err(err);
            }
            let delay = self.backoff(attempt, retry_after);
            tracing::warn!(
                method = %method,
                path = %route,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient API failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// GETs a single resource wrapped as `{"data": ...}`.
    pub async fn get_data<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let value = self.request(Method::GET, path, &[], None).await?;
        decode_data(path, value)
    }

    /// Sends `body` and decodes the `{"data": ...}` response.
    pub async fn send_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: &Value,
    ) -> Result<T> {
        let value = self.request(method, path, &[], Some(body)).await?;
        decode_data(path, value)
    }

    /// Follows pagination cursors until the remote reports no further page
    /// and returns the concatenated items.
    pub async fn list_all<T: DeserializeOwned>(&self, path: &[&str]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();
        let mut pages = 0usize;

        loop {
            let mut query = vec![("limit", self.settings.page_size.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("cursor", cursor.clone()));
            }
            let value = self.request(Method::GET, path, &query, None).await?;
            let page: Page<T> =
                serde_json::from_value(value).map_err(|source| ApiError::Decode {
                    path: path.join("/"),
                    source,
                })?;
            pages += 1;
            items.extend(page.data);

            let next = page
                .pagination
                .and_then(|p| p.cursor)
                .filter(|c| !c.is_empty());
            match next {
                None => break,
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(ApiError::StalledCursor {
                        path: path.join("/"),
                        cursor: next,
                    });
                }
                Some(next) => cursor = Some(next),
            }
        }

        tracing::debug!(path = %path.join("/"), pages, items = items.len(), "Listed collection");
        Ok(items)
    }

    fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let computed = self.settings.retry_base_delay.saturating_mul(1 << exponent);
        retry_after
            .unwrap_or(computed)
            .min(self.settings.retry_max_delay)
    }
}

fn decode_data<T: DeserializeOwned>(path: &[&str], value: Value) -> Result<T> {
    serde_json::from_value::<Envelope<T>>(value)
        .map(|envelope| envelope.data)
        .map_err(|source| ApiError::Decode {
            path: path.join("/"),
            source,
        })
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
