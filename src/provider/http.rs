use crate::{Result, SubsConfig, SubsError};
use encoding_rs::Encoding;
use reqwest::{Client, RequestBuilder, header::CONTENT_DISPOSITION};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent sent to every site
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Fully buffered response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects
    pub url: String,
    /// Raw `Content-Disposition` header
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

/// HTTP client shared by all providers.
///
/// Every attempt runs under its own timeout and aborts when the caller's
/// token is cancelled.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &SubsConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.request_timeout())
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a request and buffer the whole body.
    ///
    /// Non-2xx statuses are errors. The timeout covers the send and the body read.
    pub async fn fetch(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            return Err(SubsError::Cancelled);
        }

        let attempt = async {
            let response = request.send().await?;
            let status = response.status();
            let url = response.url().to_string();

            if !status.is_success() {
                return Err(SubsError::Http {
                    status: status.as_u16(),
                    url,
                });
            }

            let content_disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
            let body = response.bytes().await?.to_vec();

            Ok(HttpResponse {
                url,
                content_disposition,
                body,
            })
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SubsError::Cancelled),
            result = tokio::time::timeout(self.timeout, attempt) => match result {
                Ok(response) => response,
                Err(_) => Err(SubsError::Timeout(self.timeout)),
            },
        }
    }
}

/// Decode a body with a site's character set
#[must_use]
pub fn decode(encoding: &'static Encoding, body: &[u8]) -> String {
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}
