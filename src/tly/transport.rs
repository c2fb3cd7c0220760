use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// A fully resolved API call: the URL already carries its query string.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends an [`ApiRequest`] and hands back the raw status and body.
///
/// Implementations must not interpret the status; the client decides what
/// counts as failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
        })
    }

    pub fn from_client(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Records every request and answers each with the same canned response.
    pub struct MockTransport {
        response: ApiResponse,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                response: ApiResponse {
                    status,
                    body: body.to_string(),
                },
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: Value) -> Self {
            Self::new(200, &body.to_string())
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last(&self) -> ApiRequest {
            self.requests()
                .pop()
                .expect("no request was sent through the mock transport")
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }
}
