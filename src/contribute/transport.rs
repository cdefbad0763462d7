//! Batch transport
//!
//! [`BatchTransport`] carries one [`BatchRequest`] to whatever applies it.
//! [`HttpTransport`] posts it to a contribution worker; the in-process
//! alternative is [`DirectBatchHandler`](crate::contribute::DirectBatchHandler).

use crate::contribute::wire::{BatchRequest, BatchResponse, ErrorBody};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Worker route that accepts batch submissions
pub const DIRECT_CONTRIBUTE_PATH: &str = "api/direct-contribute";

const FALLBACK_ERROR: &str = "API request failed";

/// Sends a batch and returns the remote side's reply
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Submit one batch; a failed round trip is an error, never retried here
    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse>;
}

/// HTTP client for the contribution worker
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a client for `worker_url` authenticated with an identity token
    ///
    /// The endpoint is resolved relative to `worker_url`, so a base with a
    /// path must end in `/`.
    pub fn new(worker_url: &Url, id_token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {id_token}"))
                .map_err(|_| Error::Auth("identity token is not a valid header value".to_string()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let endpoint = worker_url
            .join(DIRECT_CONTRIBUTE_PATH)
            .map_err(|e| Error::Config(format!("invalid worker URL {worker_url}: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Resolved submission endpoint
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BatchTransport for HttpTransport {
    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse> {
        debug!(
            endpoint = %self.endpoint,
            batch = request.batch_info.current,
            total = request.batch_info.total,
            create_pr = request.create_pr,
            "posting batch"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("batch {}", request.batch_info.current))
                } else {
                    Error::Http(e)
                }
            })?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            // The worker's own message is surfaced unchanged
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            return Err(Error::Remote(message));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribute::wire::BatchInfo;

    fn request() -> BatchRequest {
        BatchRequest {
            email: "ms21001@iisermohali.ac.in".to_string(),
            name: "A Student".to_string(),
            files: Vec::new(),
            all_files: None,
            pr_title: "Add papers".to_string(),
            pr_description: String::new(),
            branch_name: None,
            create_pr: false,
            batch_info: BatchInfo {
                current: 1,
                total: 1,
            },
        }
    }

    fn transport(server: &mockito::ServerGuard) -> HttpTransport {
        let base = Url::parse(&server.url()).unwrap();
        HttpTransport::new(&base, "id-token", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_posts_batch_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/direct-contribute")
            .match_header("authorization", "Bearer id-token")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"prTitle": "Add papers", "createPR": false}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"branch": "contribution-ms21001-1", "pr": null, "filesUploaded": []}"#)
            .create_async()
            .await;

        let resp = transport(&server).submit_batch(&request()).await.unwrap();
        assert_eq!(resp.branch, "contribution-ms21001-1");
        assert!(resp.pr.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_message_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/direct-contribute")
            .with_status(422)
            .with_body(r#"{"error": "Reference already exists"}"#)
            .create_async()
            .await;

        let err = transport(&server).submit_batch(&request()).await.unwrap_err();
        assert!(matches!(&err, Error::Remote(m) if m == "Reference already exists"));
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/direct-contribute")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = transport(&server).submit_batch(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "API request failed");
    }

    #[test]
    fn test_endpoint_resolution() {
        let base = Url::parse("https://worker.example.dev/qpr/").unwrap();
        let t = HttpTransport::new(&base, "tok", Duration::from_secs(1)).unwrap();
        assert_eq!(
            t.endpoint().as_str(),
            "https://worker.example.dev/qpr/api/direct-contribute"
        );
    }
}
