use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use portal_identity::TokenProvider;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::error::{ResponseError, WebApiError, map_deser};
use crate::interceptors::{self, Expect};
use crate::retry;

/// Overall time limit of a download call, retries included.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const JSON_CONTENT_TYPE: &str = "application/json";

/// Binary response of [`Client::download_photo`].
#[derive(Debug, Clone)]
pub struct Download {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// One request as the interceptors see it; rebuilt on every attempt.
struct Call<'a> {
    method: Method,
    service: &'a str,
    query: &'a [(&'a str, &'a str)],
    body: Option<(Bytes, String)>,
    expect: Expect,
    timeout: Option<Duration>,
}

impl<'a> Call<'a> {
    fn new(method: Method, service: &'a str, expect: Expect) -> Self {
        Self {
            method,
            service,
            query: &[],
            body: None,
            expect,
            timeout: None,
        }
    }
}

/// Web API client
///
/// Generic over a [`Config`] for addressing; tokens come from the injected
/// [`TokenProvider`] on every attempt.
#[derive(Clone)]
pub struct Client<C: Config> {
    http: reqwest::Client,
    config: C,
    tokens: Arc<dyn TokenProvider>,
    scopes: Vec<String>,
    backoff: ExponentialBuilder,
    download_timeout: Duration,
}

impl<C: Config + std::fmt::Debug> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("scopes", &self.scopes)
            .field("download_timeout", &self.download_timeout)
            .finish_non_exhaustive()
    }
}

impl<C: Config> Client<C> {
    /// Creates a client requesting tokens for `scopes`.
    pub fn with_config(
        config: C,
        tokens: Arc<dyn TokenProvider>,
        scopes: Vec<String>,
    ) -> Result<Self, WebApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| WebApiError::new(Some("failed to build HTTP client"), e.into()))?;
        Ok(Self {
            http,
            config,
            tokens,
            scopes,
            backoff: retry::default_backoff_builder(),
            download_timeout: DOWNLOAD_TIMEOUT,
        })
    }

    /// Replaces the HTTP client with a custom one
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the backoff configuration for retry logic
    #[must_use]
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub async fn get<O>(
        &self,
        service: &str,
        query: &[(&str, &str)],
        message: Option<&str>,
    ) -> Result<O, WebApiError>
    where
        O: DeserializeOwned,
    {
        let mut call = Call::new(Method::GET, service, Expect::Json);
        call.query = query;
        self.execute(&call, message).await
    }

    pub async fn post<I, O>(
        &self,
        service: &str,
        body: &I,
        message: Option<&str>,
    ) -> Result<O, WebApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let call = Self::with_json(Method::POST, service, body, None, message)?;
        self.execute(&call, message).await
    }

    pub async fn patch<I, O>(
        &self,
        service: &str,
        body: &I,
        message: Option<&str>,
    ) -> Result<O, WebApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let call = Self::with_json(Method::PATCH, service, body, None, message)?;
        self.execute(&call, message).await
    }

    /// PUT with a JSON body; `content_type` overrides `application/json`.
    pub async fn put<I, O>(
        &self,
        service: &str,
        body: &I,
        content_type: Option<&str>,
        message: Option<&str>,
    ) -> Result<O, WebApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let call = Self::with_json(Method::PUT, service, body, content_type, message)?;
        self.execute(&call, message).await
    }

    /// PUT with a raw body, e.g. a photo upload.
    pub async fn put_bytes<O>(
        &self,
        service: &str,
        body: impl Into<Bytes>,
        content_type: &str,
        message: Option<&str>,
    ) -> Result<O, WebApiError>
    where
        O: DeserializeOwned,
    {
        let mut call = Call::new(Method::PUT, service, Expect::Json);
        call.body = Some((body.into(), content_type.to_string()));
        self.execute(&call, message).await
    }

    pub async fn delete<O>(&self, service: &str, message: Option<&str>) -> Result<O, WebApiError>
    where
        O: DeserializeOwned,
    {
        let call = Call::new(Method::DELETE, service, Expect::Json);
        self.execute(&call, message).await
    }

    /// Binary GET returning status and content type alongside the bytes.
    pub async fn download_photo(
        &self,
        service: &str,
        message: Option<&str>,
    ) -> Result<Download, WebApiError> {
        let mut call = Call::new(Method::GET, service, Expect::Binary);
        call.timeout = Some(self.download_timeout);
        let (status, content_type, bytes) = self
            .execute_raw(&call)
            .await
            .map_err(|e| WebApiError::new(message, e))?;
        Ok(Download {
            status,
            content_type,
            bytes,
        })
    }

    /// Binary GET returning only the body.
    pub async fn download_file(
        &self,
        service: &str,
        query: &[(&str, &str)],
        message: Option<&str>,
    ) -> Result<Bytes, WebApiError> {
        let mut call = Call::new(Method::GET, service, Expect::Binary);
        call.query = query;
        call.timeout = Some(self.download_timeout);
        let (_, _, bytes) = self
            .execute_raw(&call)
            .await
            .map_err(|e| WebApiError::new(message, e))?;
        Ok(bytes)
    }

    fn with_json<'a, I>(
        method: Method,
        service: &'a str,
        body: &I,
        content_type: Option<&str>,
        message: Option<&str>,
    ) -> Result<Call<'a>, WebApiError>
    where
        I: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| WebApiError::new(message, ResponseError::Decode(e.to_string())))?;
        let mut call = Call::new(method, service, Expect::Json);
        call.body = Some((
            Bytes::from(bytes),
            content_type.unwrap_or(JSON_CONTENT_TYPE).to_string(),
        ));
        Ok(call)
    }

    async fn execute<O>(&self, call: &Call<'_>, message: Option<&str>) -> Result<O, WebApiError>
    where
        O: DeserializeOwned,
    {
        let (_, _, bytes) = self
            .execute_raw(call)
            .await
            .map_err(|e| WebApiError::new(message, e))?;

        // An empty body is treated as `null` so `Option<T>` decodes to `None`.
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|e| WebApiError::new(message, map_deser(&e, &bytes)))
    }

    async fn execute_raw(
        &self,
        call: &Call<'_>,
    ) -> Result<(StatusCode, Option<String>, Bytes), ResponseError> {
        self.config.validate()?;
        let idempotent = retry::is_idempotent(&call.method);

        let attempts = (|| async {
            let token = self.tokens.get_access_token(&self.scopes).await;

            let mut headers = self.config.headers()?;
            interceptors::attach_bearer(&mut headers, &token)?;

            let mut builder = self
                .http
                .request(call.method.clone(), self.config.url(call.service))
                .headers(headers);
            if !call.query.is_empty() {
                builder = builder.query(call.query);
            }
            if let Some((body, content_type)) = &call.body {
                let content_type = HeaderValue::from_str(content_type).map_err(|_| {
                    ResponseError::Config(format!("invalid content type '{content_type}'"))
                })?;
                builder = builder.header(CONTENT_TYPE, content_type).body(body.clone());
            }

            let response = self.http.execute(builder.build()?).await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await?;
            tracing::debug!(
                method = %call.method,
                service = call.service,
                status = status.as_u16(),
                "web API response"
            );

            if status.is_success() {
                return Ok((status, content_type, bytes));
            }

            let data =
                interceptors::normalize_error_data(call.expect, content_type.as_deref(), &bytes);
            if status == StatusCode::UNAUTHORIZED {
                interceptors::prime_on_unauthorized(self.tokens.as_ref(), &self.scopes).await;
                return Err(ResponseError::Unauthorized { data });
            }
            Err(ResponseError::Status { status, data })
        })
        .retry(self.backoff)
        .when(|e: &ResponseError| idempotent && e.is_retryable())
        .notify(|e, delay| tracing::debug!(?delay, "retrying web API request: {e}"));

        match call.timeout {
            Some(limit) => tokio::time::timeout(limit, attempts).await.unwrap_or_else(|_| {
                tracing::warn!(service = call.service, ?limit, "web API download timed out");
                Err(ResponseError::Timeout(limit))
            }),
            None => attempts.await,
        }
    }
}
