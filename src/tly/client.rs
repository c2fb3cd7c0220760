use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::transport::{ApiRequest, ReqwestTransport, Transport};
use crate::config::{TlyConfig, DEFAULT_BASE_URL};
use crate::error::{Result, TlyError};

/// Client for the T.ly REST API.
///
/// Holds nothing but the base address, the bearer headers and a shared
/// transport, so clones are cheap and calls may run concurrently.
#[derive(Clone)]
pub struct TlyClient {
    base_url: Url,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for TlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlyClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TlyClient {
    pub fn new(api_token: impl AsRef<str>) -> Result<Self> {
        Self::with_base_url(api_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_token: impl AsRef<str>, base_url: &str) -> Result<Self> {
        let transport = ReqwestTransport::new(None)?;
        Self::with_transport(api_token, base_url, Arc::new(transport))
    }

    pub fn from_config(config: &TlyConfig) -> Result<Self> {
        let token = config.api_token.as_deref().unwrap_or_default();
        let transport = ReqwestTransport::new(config.timeout_seconds.map(Duration::from_secs))?;
        Self::with_transport(token, &config.base_url, Arc::new(transport))
    }

    pub fn with_transport(
        api_token: impl AsRef<str>,
        base_url: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let token = api_token.as_ref();
        if token.trim().is_empty() {
            return Err(TlyError::MissingToken);
        }

        let base_url = parse_base_url(base_url)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| TlyError::InvalidToken)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        info!(base_url = %base_url, "T.ly client initialized");

        Ok(Self {
            base_url,
            headers,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, &[], None).await
    }

    pub(crate) async fn get_with_query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Value> {
        self.send(Method::GET, path, query, None).await
    }

    pub(crate) async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub(crate) async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], None).await
    }

    pub(crate) async fn delete_with_body<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::DELETE, path, &[], Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.endpoint(path, query);
        debug!(%method, path = url.path(), "Sending T.ly request");

        let request = ApiRequest {
            method: method.clone(),
            url,
            headers: self.headers.clone(),
            body,
        };

        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            warn!(%method, path, status = response.status, "T.ly request rejected");
            return Err(TlyError::Api {
                status: response.status,
                body: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", prefix, path));

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        url
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| TlyError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base address".to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tly::transport::mock::MockTransport;
    use serde_json::json;

    fn client_with(mock: &Arc<MockTransport>) -> TlyClient {
        TlyClient::with_transport("test-token", DEFAULT_BASE_URL, mock.clone()).unwrap()
    }

    #[test]
    fn missing_token_is_rejected() {
        assert!(matches!(TlyClient::new(""), Err(TlyError::MissingToken)));
        assert!(matches!(TlyClient::new("   "), Err(TlyError::MissingToken)));
        assert!(matches!(
            TlyClient::from_config(&TlyConfig::default()),
            Err(TlyError::MissingToken)
        ));
    }

    #[test]
    fn token_with_control_characters_is_rejected() {
        assert!(matches!(
            TlyClient::new("abc\ndef"),
            Err(TlyError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_is_sent_as_given() {
        let mock = Arc::new(MockTransport::ok(json!([])));
        let client =
            TlyClient::with_transport(" padded-token ", DEFAULT_BASE_URL, mock.clone()).unwrap();

        client.get("/api/v1/link/tag").await.unwrap();

        assert_eq!(mock.last().headers[AUTHORIZATION], "Bearer  padded-token ");
    }

    #[test]
    fn default_base_url_is_production() {
        let client = TlyClient::new("test-token").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.t.ly/");
    }

    #[test]
    fn base_url_override_is_validated() {
        let client = TlyClient::with_base_url("t", "http://localhost:8080").unwrap();
        assert_eq!(client.base_url().host_str(), Some("localhost"));

        assert!(matches!(
            TlyClient::with_base_url("t", "not a url"),
            Err(TlyError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            TlyClient::with_base_url("t", "ftp://api.t.ly"),
            Err(TlyError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let client = TlyClient::new("super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("api.t.ly"));
    }

    #[tokio::test]
    async fn every_request_carries_auth_and_json_headers() {
        let mock = Arc::new(MockTransport::ok(json!([])));
        let client = client_with(&mock);

        client.get("/api/v1/link/tag").await.unwrap();

        let request = mock.last();
        assert_eq!(request.headers[AUTHORIZATION], "Bearer test-token");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn base_path_prefix_is_kept() {
        let mock = Arc::new(MockTransport::ok(json!({})));
        let client =
            TlyClient::with_transport("t", "http://localhost:9000/proxy/", mock.clone()).unwrap();

        client.get("/api/v1/link/pixel").await.unwrap();

        assert_eq!(
            mock.last().url.as_str(),
            "http://localhost:9000/proxy/api/v1/link/pixel"
        );
    }

    #[tokio::test]
    async fn non_success_status_surfaces_status_and_body() {
        let mock = Arc::new(MockTransport::new(
            401,
            r#"{"message":"Unauthenticated."}"#,
        ));
        let client = client_with(&mock);

        let err = client.get("/api/v1/link/tag").await.unwrap_err();

        match &err {
            TlyError::Api { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, r#"{"message":"Unauthenticated."}"#);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.body_json().unwrap()["message"], "Unauthenticated.");
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let mock = Arc::new(MockTransport::new(204, ""));
        let client = client_with(&mock);

        let value = client.delete("/api/v1/link/tag/1").await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let mock = Arc::new(MockTransport::new(200, "<html>"));
        let client = client_with(&mock);

        let err = client.get("/api/v1/link/tag").await.unwrap_err();
        assert!(matches!(err, TlyError::Decode(_)));
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_client() {
        let mock = Arc::new(MockTransport::ok(json!({"ok": true})));
        let client = client_with(&mock);

        let (a, b) = tokio::join!(client.get("/api/v1/link/tag"), client.get("/api/v1/link/pixel"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(mock.requests().len(), 2);
    }
}
