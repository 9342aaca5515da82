use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::HEALTH_CHECK_TIMEOUT_MS;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ConnectionConfig, ConnectionStatus, ProviderId};

/// Failure of a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("API Error: {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Single-attempt GET client bound to one [`ConnectionConfig`].
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ConnectionConfig>,
    http_client: Arc<dyn HttpClient>,
}

impl ApiClient {
    pub fn new(config: ConnectionConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
        }
    }

    pub fn with_reqwest(config: ConnectionConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn provider(&self) -> ProviderId {
        self.config.provider()
    }

    /// GETs `path` and decodes the body as JSON. Anything but a 200 is an error.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let mut request = self.config.request(path);
        for (name, value) in query {
            request = request.with_query(*name, value.clone());
        }

        tracing::debug!(
            provider = %self.provider(),
            url = %request.full_url(),
            timeout_ms = request.timeout_ms,
            "sending upstream request"
        );

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| ApiError::Transport(error.message().to_owned()))?;

        if !response.is_ok() {
            return Err(ApiError::Status(response.status));
        }

        serde_json::from_str(&response.body).map_err(|error| ApiError::Decode(error.to_string()))
    }

    /// Probes `path` with the health-check timeout; the body is not inspected.
    pub async fn probe(&self, path: &str) -> ConnectionStatus {
        let request = self
            .config
            .request(path)
            .with_timeout_ms(HEALTH_CHECK_TIMEOUT_MS);

        tracing::debug!(provider = %self.provider(), url = %request.url, "probing upstream");

        let failure = match self.http_client.execute(request).await {
            Ok(response) if response.is_ok() => return ConnectionStatus::connected(),
            Ok(response) => ApiError::Status(response.status),
            Err(error) => ApiError::Transport(error.message().to_owned()),
        };
        ConnectionStatus::failed(failure.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpRequest, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct FixedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FixedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> HttpRequest {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .last()
                .cloned()
                .expect("a request was sent")
        }
    }

    impl HttpClient for FixedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn client(response: Result<HttpResponse, HttpError>) -> (ApiClient, Arc<FixedHttpClient>) {
        let http = FixedHttpClient::new(response);
        let api = ApiClient::new(ConnectionConfig::defaults(ProviderId::DefiLlama), http.clone());
        (api, http)
    }

    #[tokio::test]
    async fn get_json_decodes_success_body() {
        let (api, http) = client(Ok(HttpResponse::ok_json(r#"[{"name":"Ethereum"}]"#)));

        let value = api
            .get_json("chains", &[("limit", String::from("5"))])
            .await
            .expect("decodes");

        assert_eq!(value[0]["name"], "Ethereum");
        let request = http.last_request();
        assert_eq!(request.full_url(), "https://api.llama.fi/chains?limit=5");
        assert_eq!(request.timeout_ms, crate::config::DEFAULT_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn get_json_reports_status_code() {
        let (api, _) = client(Ok(HttpResponse::new(429, "slow down")));

        let error = api.get_json("protocols", &[]).await.expect_err("must fail");
        assert_eq!(error, ApiError::Status(429));
        assert_eq!(error.to_string(), "API Error: 429");
        assert_eq!(error.status(), Some(429));
    }

    #[tokio::test]
    async fn get_json_reports_transport_message() {
        let (api, _) = client(Err(HttpError::new("connection failed: refused")));

        let error = api.get_json("protocols", &[]).await.expect_err("must fail");
        assert_eq!(error.to_string(), "connection failed: refused");
        assert_eq!(error.status(), None);
    }

    #[tokio::test]
    async fn get_json_reports_invalid_json() {
        let (api, _) = client(Ok(HttpResponse::ok_json("<html>oops</html>")));

        let error = api.get_json("protocols", &[]).await.expect_err("must fail");
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn probe_uses_health_check_timeout() {
        let (api, http) = client(Ok(HttpResponse::ok_json("not even json")));

        let status = api.probe("protocols").await;
        assert_eq!(status, ConnectionStatus::connected());
        assert_eq!(http.last_request().timeout_ms, HEALTH_CHECK_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn probe_fails_on_non_200() {
        let (api, _) = client(Ok(HttpResponse::new(401, "")));

        let status = api.probe("key/info").await;
        assert!(!status.success);
        assert_eq!(status.error_message.as_deref(), Some("API Error: 401"));
    }
}
