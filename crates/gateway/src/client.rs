//! The reqwest-backed API client and the trait seam stores depend on.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{map_reqwest_error, ApiError},
    session::SessionStore,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REFRESH_PATH: &str = "accounts/token/refresh/";

/// Verb used for a resource update. Most entities take PUT; reclamations
/// and single-field status changes go through PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateVerb {
    Put,
    Patch,
}

impl UpdateVerb {
    fn method(self) -> Method {
        match self {
            UpdateVerb::Put => Method::PUT,
            UpdateVerb::Patch => Method::PATCH,
        }
    }
}

/// One method per REST operation per resource. Implemented by
/// [`ApiClient`] for the real backend and by in-memory fakes in store
/// tests.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list(&self, resource: &str) -> Result<Value, ApiError>;
    async fn list_with(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value, ApiError>;
    async fn retrieve(&self, resource: &str, key: &str) -> Result<Value, ApiError>;
    async fn create(&self, resource: &str, payload: &Value) -> Result<Value, ApiError>;
    async fn update(
        &self,
        resource: &str,
        key: &str,
        payload: &Value,
        verb: UpdateVerb,
    ) -> Result<Value, ApiError>;
    async fn destroy(&self, resource: &str, key: &str) -> Result<Value, ApiError>;
    /// POST `/api/{resource}/{key}/{action}/` (valider, resoudre, ...).
    async fn member_action(
        &self,
        resource: &str,
        key: &str,
        action: &str,
        body: &Value,
    ) -> Result<Value, ApiError>;
    /// GET `/api/{resource}/{path}/` for collection extras (statistiques,
    /// impayees) and member extras (`{key}/paiements`).
    async fn collection_get(&self, resource: &str, path: &str) -> Result<Value, ApiError>;
}

/// One wire exchange: status code and body text. The auth pipeline
/// (bearer attachment, refresh-and-replay) sits above this seam so it
/// can be exercised without a server.
#[async_trait]
trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        url: Url,
        bearer: Option<String>,
        body: Option<Value>,
    ) -> Result<(u16, String), ApiError>;
}

struct ReqwestTransport {
    http: Client,
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: Method,
        url: Url,
        bearer: Option<String>,
        body: Option<Value>,
    ) -> Result<(u16, String), ApiError> {
        let mut request = self.http.request(method, url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;
        Ok((status, text))
    }
}

/// HTTP client for the Sahara Express backend.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// `base` is the server root (the `/api/` prefix is added per
    /// request; accounts endpoints live outside it).
    pub fn new(base: &str, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sahara-data/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::with_transport(Arc::new(ReqwestTransport { http }), base, session)
    }

    fn with_transport(
        transport: Arc<dyn HttpTransport>,
        base: &str,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            transport,
            base,
            session,
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.join(path)?;
        self.request_url(method, url, body).await
    }

    pub(crate) async fn request_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let mut url = self.join(path)?;
        url.query_pairs_mut().extend_pairs(query);
        self.request_url(Method::GET, url, None).await
    }

    /// Send with the current access token; on a 401 refresh it and replay
    /// exactly once. A second 401 surfaces as [`ApiError::Unauthorized`].
    async fn request_url(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let (mut status, mut text) = self.send_once(&method, &url, body).await?;

        if status == 401 {
            debug!(url = %url, "access token rejected, attempting refresh");
            self.refresh_access().await?;
            (status, text) = self.send_once(&method, &url, body).await?;
            if status == 401 {
                return Err(ApiError::Unauthorized);
            }
        }

        Self::decode(status, text)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<(u16, String), ApiError> {
        self.transport
            .execute(
                method.clone(),
                url.clone(),
                self.session.access_token(),
                body.cloned(),
            )
            .await
    }

    /// Exchange the stored refresh token for a new access token. On any
    /// failure the session is cleared and the caller gets
    /// [`ApiError::Unauthorized`].
    async fn refresh_access(&self) -> Result<(), ApiError> {
        let refresh = match self.session.refresh_token() {
            Some(t) => t,
            None => {
                self.session.clear();
                return Err(ApiError::Unauthorized);
            }
        };

        let url = self.join(REFRESH_PATH)?;
        let body = serde_json::json!({ "refresh": refresh });
        let (status, text) = match self
            .transport
            .execute(Method::POST, url, None, Some(body))
            .await
        {
            Ok(exchange) => exchange,
            Err(e) => {
                self.session.clear();
                return Err(e);
            }
        };

        if !(200..300).contains(&status) {
            warn!(status, "token refresh rejected, clearing session");
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| ApiError::Serde(e.to_string()))?;
        match body.get("access").and_then(Value::as_str) {
            Some(access) => {
                self.session.set_access(access.to_string());
                Ok(())
            }
            None => {
                self.session.clear();
                Err(ApiError::Unauthorized)
            }
        }
    }

    fn decode(status: u16, text: String) -> Result<Value, ApiError> {
        if (200..300).contains(&status) {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| ApiError::Serde(e.to_string()))
        } else {
            Err(ApiError::from_response_parts(status, &text))
        }
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn list(&self, resource: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("api/{resource}/"), None)
            .await
    }

    async fn list_with(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.request_with_query(&format!("api/{resource}/"), query)
            .await
    }

    async fn retrieve(&self, resource: &str, key: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("api/{resource}/{key}/"), None)
            .await
    }

    async fn create(&self, resource: &str, payload: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, &format!("api/{resource}/"), Some(payload))
            .await
    }

    async fn update(
        &self,
        resource: &str,
        key: &str,
        payload: &Value,
        verb: UpdateVerb,
    ) -> Result<Value, ApiError> {
        self.request(
            verb.method(),
            &format!("api/{resource}/{key}/"),
            Some(payload),
        )
        .await
    }

    async fn destroy(&self, resource: &str, key: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &format!("api/{resource}/{key}/"), None)
            .await
    }

    async fn member_action(
        &self,
        resource: &str,
        key: &str,
        action: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.request(
            Method::POST,
            &format!("api/{resource}/{key}/{action}/"),
            Some(body),
        )
        .await
    }

    async fn collection_get(&self, resource: &str, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("api/{resource}/{path}/"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use serde_json::json;

    use super::*;
    use crate::session::MemorySession;

    struct Exchange {
        method: Method,
        path: String,
        bearer: Option<String>,
    }

    struct FakeTransport {
        responses: Mutex<VecDeque<(u16, String)>>,
        exchanges: Mutex<Vec<Exchange>>,
    }

    impl FakeTransport {
        fn with_responses(responses: Vec<(u16, Value)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| (status, body.to_string()))
                        .collect(),
                ),
                exchanges: Mutex::new(Vec::new()),
            })
        }

        fn exchange(&self, index: usize) -> (Method, String, Option<String>) {
            let log = self.exchanges.lock().unwrap();
            let e = &log[index];
            (e.method.clone(), e.path.clone(), e.bearer.clone())
        }

        fn len(&self) -> usize {
            self.exchanges.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn execute(
            &self,
            method: Method,
            url: Url,
            bearer: Option<String>,
            _body: Option<Value>,
        ) -> Result<(u16, String), ApiError> {
            self.exchanges.lock().unwrap().push(Exchange {
                method,
                path: url.path().to_string(),
                bearer,
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("no canned response left".to_string()))
        }
    }

    fn client(
        transport: Arc<FakeTransport>,
        session: Arc<MemorySession>,
    ) -> ApiClient {
        ApiClient::with_transport(transport, "http://backend.local", session)
            .unwrap()
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed_and_replayed_once() {
        let transport = FakeTransport::with_responses(vec![
            (401, json!({ "detail": "token expired" })),
            (200, json!({ "access": "a2" })),
            (200, json!([{ "numexp": 1 }])),
        ]);
        let session = Arc::new(MemorySession::new());
        session.set_tokens("a1".into(), "r1".into());
        let client = client(transport.clone(), session.clone());

        let body = client.list("expeditions").await.unwrap();
        assert_eq!(body, json!([{ "numexp": 1 }]));

        assert_eq!(transport.len(), 3);
        let (method, path, bearer) = transport.exchange(0);
        assert_eq!((method, path, bearer.as_deref()),
            (Method::GET, "/api/expeditions/".to_string(), Some("a1")));
        let (method, path, bearer) = transport.exchange(1);
        assert_eq!(method, Method::POST);
        assert_eq!(path, "/accounts/token/refresh/");
        assert!(bearer.is_none(), "refresh must not carry the stale token");
        let (_, path, bearer) = transport.exchange(2);
        assert_eq!(path, "/api/expeditions/");
        assert_eq!(bearer.as_deref(), Some("a2"), "replay uses the new token");
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn rejected_refresh_clears_the_session() {
        let transport = FakeTransport::with_responses(vec![
            (401, json!({ "detail": "token expired" })),
            (401, json!({ "detail": "refresh expired" })),
        ]);
        let session = Arc::new(MemorySession::new());
        session.set_tokens("a1".into(), "r1".into());
        let client = client(transport.clone(), session.clone());

        let err = client.list("clients").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(transport.len(), 2, "no replay after a failed refresh");
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
    }

    #[tokio::test]
    async fn second_rejection_after_refresh_is_unauthorized() {
        let transport = FakeTransport::with_responses(vec![
            (401, json!({ "detail": "token expired" })),
            (200, json!({ "access": "a2" })),
            (401, json!({ "detail": "still no" })),
        ]);
        let session = Arc::new(MemorySession::new());
        session.set_tokens("a1".into(), "r1".into());
        let client = client(transport.clone(), session.clone());

        let err = client.list("clients").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(transport.len(), 3, "replayed exactly once");
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_a_refresh_call() {
        let transport = FakeTransport::with_responses(vec![
            (401, json!({ "detail": "token expired" })),
        ]);
        let session = Arc::new(MemorySession::new());
        let client = client(transport.clone(), session.clone());

        let err = client.list("clients").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(transport.len(), 1);
    }

    #[tokio::test]
    async fn empty_success_body_decodes_to_null() {
        let transport = Arc::new(FakeTransport {
            responses: Mutex::new(VecDeque::from([(204, String::new())])),
            exchanges: Mutex::new(Vec::new()),
        });
        let session = Arc::new(MemorySession::new());
        session.set_tokens("a1".into(), "r1".into());
        let client = client(transport, session);

        let body = client.destroy("clients", "9").await.unwrap();
        assert_eq!(body, Value::Null);
    }
}
