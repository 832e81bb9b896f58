//! Authenticated request gateway for the Quill service.
//!
//! # Architecture
//!
//! [`Gateway`] is the single choke point for outbound calls. Before every request it reads
//! the [`SessionStore`] and, when a credential is present, attaches it as a bearer token.
//! Requests without a credential go out unauthenticated; the service decides whether that
//! is acceptable.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`Gateway::register`] | `POST /auth/register` |
//! | [`Gateway::login`] | `POST /auth/login` |
//! | [`Gateway::current_identity`] | `GET /auth/me` |
//! | [`Gateway::generate_readme`] | `POST /projects/generate-readme` |
//! | [`Gateway::list_history`] | `GET /projects/history` |
//!
//! # Error Handling
//!
//! Non-2xx responses become [`GatewayError::Unauthorized`] (401/403) or
//! [`GatewayError::Remote`], carrying the service's `detail` message when present.
//! The gateway never retries and never writes to the session store.

mod error;
mod wire;

pub use error::{GatewayError, extract_detail, is_auth_status};
pub use wire::{GenerateResponse, RegisterResponse, TokenResponse};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use quill_session::SessionStore;
use quill_types::{GenerationRequest, HistoryEntry, Identity};

use wire::{LoginBody, RegisterBody};

const CONNECT_TIMEOUT_SECS: u64 = 30;

// Note: reqwest only exposes tcp_keepalive (idle time); interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

const REGISTER_PATH: &str = "auth/register";
const LOGIN_PATH: &str = "auth/login";
const ME_PATH: &str = "auth/me";
const GENERATE_PATH: &str = "projects/generate-readme";
const HISTORY_PATH: &str = "projects/history";

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(concat!("quill/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().timeout(timeout).build()
}

pub async fn read_capped_error_body(response: Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Make sure relative joins append to the base path instead of replacing its last segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.session.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(
        base_url: Url,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = http_client_with_timeout(timeout).map_err(GatewayError::Client)?;
        Ok(Self::with_client(client, base_url, session))
    }

    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: Url,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
            session,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, GatewayError> {
        let body = RegisterBody {
            name,
            email,
            password,
        };
        let request = self.request(Method::POST, REGISTER_PATH)?.json(&body);
        self.send(REGISTER_PATH, request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, GatewayError> {
        let body = LoginBody { email, password };
        let request = self.request(Method::POST, LOGIN_PATH)?.json(&body);
        self.send(LOGIN_PATH, request).await
    }

    pub async fn current_identity(&self) -> Result<Identity, GatewayError> {
        let request = self.request(Method::GET, ME_PATH)?;
        self.send(ME_PATH, request).await
    }

    pub async fn generate_readme(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, GatewayError> {
        tracing::debug!(
            project = request.project_name(),
            mode = %request.mode(),
            "Requesting README generation"
        );
        let builder = self.request(Method::POST, GENERATE_PATH)?.json(request);
        self.send(GENERATE_PATH, builder).await
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>, GatewayError> {
        let request = self.request(Method::GET, HISTORY_PATH)?;
        self.send(HISTORY_PATH, request).await
    }

    /// Build a request for `path`, attaching the current credential if there is one.
    fn request(&self, method: Method, path: &'static str) -> Result<RequestBuilder, GatewayError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| GatewayError::Endpoint { path, source })?;

        let builder = self.client.request(method, url);
        Ok(match self.session.get() {
            Some(credential) => builder.bearer_auth(credential.expose_secret()),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = path, error = %e, "Request failed");
            GatewayError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            tracing::warn!(endpoint = path, %status, body_bytes = body.len(), "Service returned error");
            return Err(GatewayError::from_status(status, &body));
        }

        tracing::debug!(endpoint = path, %status, "Request succeeded");
        response
            .json::<T>()
            .await
            .map_err(|source| GatewayError::Decode {
                endpoint: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Gateway, GatewayError, normalize_base_url};
    use quill_session::{MemorySessionStore, SessionStore};
    use quill_types::{Credential, FormField, GenerationForm, GenerationMode};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer, session: Arc<dyn SessionStore>) -> Gateway {
        let base = Url::parse(&server.uri()).unwrap();
        Gateway::new(base, session, Duration::from_secs(5)).unwrap()
    }

    fn authenticated() -> Arc<dyn SessionStore> {
        Arc::new(MemorySessionStore::with_credential(
            Credential::new("tok-123").unwrap(),
        ))
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = normalize_base_url(Url::parse("https://example.com/api").unwrap());
        assert_eq!(url.join("auth/me").unwrap().as_str(), "https://example.com/api/auth/me");

        let url = normalize_base_url(Url::parse("https://example.com").unwrap());
        assert_eq!(url.join("auth/me").unwrap().as_str(), "https://example.com/auth/me");
    }

    #[tokio::test]
    async fn attaches_bearer_when_credential_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "8a1f7f0e-4a3b-4c41-9a4e-2c5c0d6b7e10",
                "name": "Ada",
                "email": "ada@example.com",
                "created_at": "2024-01-01T00:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = gateway(&server, authenticated())
            .current_identity()
            .await
            .unwrap();
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn omits_authorization_without_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let entries = gateway(&server, Arc::new(MemorySessionStore::new()))
            .list_history()
            .await
            .unwrap();
        assert!(entries.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn generate_sends_full_payload() {
        let server = MockServer::start().await;
        let request = GenerationForm::new()
            .with(FormField::ProjectName, "X")
            .with(FormField::Description, "Y")
            .with(FormField::TechStack, "Z")
            .with(FormField::Features, "F")
            .with(FormField::InstallationSteps, "S")
            .with_mode(GenerationMode::Advanced)
            .to_request()
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/projects/generate-readme"))
            .and(body_json(serde_json::json!({
                "project_name": "X",
                "description": "Y",
                "tech_stack": "Z",
                "features": "F",
                "installation_steps": "S",
                "extra_notes": "",
                "mode": "advanced"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "readme": "# X",
                "project_id": "8a1f7f0e-4a3b-4c41-9a4e-2c5c0d6b7e10"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = gateway(&server, authenticated())
            .generate_readme(&request)
            .await
            .unwrap();
        assert_eq!(response.readme, "# X");
        assert!(response.project_id.is_some());
    }

    #[tokio::test]
    async fn maps_unauthorized_without_touching_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/history"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"detail": "Could not validate credentials"})),
            )
            .mount(&server)
            .await;

        let session = authenticated();
        let err = gateway(&server, session.clone())
            .list_history()
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Could not validate credentials"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn maps_server_error_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "Incorrect email or password"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = gateway(&server, Arc::new(MemorySessionStore::new()))
            .login("a@b.c", "wrong")
            .await
            .unwrap_err();
        match err {
            GatewayError::Remote { status, detail } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(detail.as_deref(), Some("Incorrect email or password"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway(&server, Arc::new(MemorySessionStore::new()))
            .login("a@b.c", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        let gateway = Gateway::new(
            base,
            Arc::new(MemorySessionStore::new()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = gateway.list_history().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
