//! Portal HTTP client with transparent access-token renewal.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, RenewalFailure};
use crate::events::SessionEvent;
use crate::renewal::{Admission, RenewalCoordinator};
use crate::token_store::TokenStore;
use crate::types::{ErrorBody, LoginResponse, TOKEN_EXPIRED, TokenResponse, UserInfo};

const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";
const LOGOUT_PATH: &str = "/api/auth/logout";
const ME_PATH: &str = "/api/auth/me";

/// Paths sent without a bearer token and never renewed on.
const PUBLIC_PATHS: &[&str] = &[LOGIN_PATH, REFRESH_PATH, LOGOUT_PATH, "/api/health"];

/// Decorates a `reqwest::Client` with the portal's session lifecycle.
#[derive(Debug)]
pub struct PortalClient {
    base_url: Url,
    http: reqwest::Client,
    store: Arc<TokenStore>,
    renewal: RenewalCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

impl PortalClient {
    /// Creates a client, loading any remembered refresh token.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let store = Arc::new(TokenStore::open(config.credential_file.clone())?);
        let (events, _) = broadcast::channel(64);
        let renewal =
            RenewalCoordinator::new(Arc::clone(&store), events.clone(), config.renewal_timeout());

        Ok(Self {
            base_url,
            http,
            store,
            renewal,
            events,
        })
    }

    /// Subscribes to session notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The credential store.
    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Whether any credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.store.has_session()
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Primary login. `remember` picks the refresh token's scope.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<UserInfo, ClientError> {
        let body = json!({
            "username": username,
            "password": password,
            "remember": remember,
        });
        let response = self
            .dispatch(Method::POST, LOGIN_PATH, Some(&body), None)
            .await?;
        let login: LoginResponse = Self::handle_response(response).await?.json().await?;

        self.store.set_pair(
            login.tokens.access_token,
            login.tokens.refresh_token,
            remember,
        )?;
        info!(username = %login.user.username, remember = remember, "Logged in");

        Ok(login.user)
    }

    /// Ends the session. Server errors are logged, never returned; local
    /// credentials are always cleared.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store.refresh_token() {
            let body = json!({ "refresh_token": refresh_token });
            match self.dispatch(Method::POST, LOGOUT_PATH, Some(&body), None).await {
                Ok(response) if response.status().is_success() => {
                    debug!("Server acknowledged logout");
                }
                Ok(response) => warn!(status = %response.status(), "Server rejected logout"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }

        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear stored credentials on logout");
        }
        info!("Logged out");
    }

    /// The authenticated user.
    pub async fn me(&self) -> Result<UserInfo, ClientError> {
        self.get_json(ME_PATH).await
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST `body` to `path` and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Sends a request through the renewal decorator.
    ///
    /// On `401 Token expired` the call waits for the single shared renewal
    /// and is replayed once with the new access token. Any other 401 on a
    /// protected path ends the session.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ClientError> {
        if PUBLIC_PATHS.contains(&path) {
            let response = self.dispatch(method, path, body.as_ref(), None).await?;
            return Self::handle_response(response).await;
        }

        let Some(used) = self.store.access_token() else {
            if self.store.refresh_token().is_none() {
                return Err(ClientError::MissingCredential);
            }
            debug!(path, "No access token held; renewing from refresh token");
            self.renew(None).await?;
            return self.replay(method, path, body.as_ref()).await;
        };

        let response = self
            .dispatch(method.clone(), path, body.as_ref(), Some(&used))
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::handle_response(response).await;
        }

        let rejection = read_error_body(response).await;
        if rejection.message != TOKEN_EXPIRED {
            let cause = ClientError::from_unauthorized(rejection);
            return Err(self.terminate(cause.to_string()));
        }

        debug!(path, "Access token expired; renewing");
        self.renew(Some(&used)).await?;
        self.replay(method, path, body.as_ref()).await
    }

    /// Sends the call once more with the renewed token. Any 401 here is
    /// terminal: a fresh token must not be rejected.
    async fn replay(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let token = self.store.access_token();
        let response = self.dispatch(method, path, body, token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let cause = ClientError::from_unauthorized(read_error_body(response).await);
            return Err(self.terminate(cause.to_string()));
        }
        Self::handle_response(response).await
    }

    async fn renew(&self, used_access: Option<&str>) -> Result<(), ClientError> {
        let http = self.http.clone();
        let url = self.url(REFRESH_PATH)?;

        match self
            .renewal
            .admit(used_access, move |refresh_token| rotate(http, url, refresh_token))
        {
            Admission::Wait(pending) => pending.await.map_err(ClientError::from),
            Admission::AlreadyRenewed => Ok(()),
            Admission::NoSession => Err(ClientError::SessionTerminated {
                reason: "no stored credentials".to_string(),
            }),
        }
    }

    fn terminate(&self, reason: String) -> ClientError {
        warn!(reason = %reason, "Session rejected by server; clearing credentials");
        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear stored credentials");
        }
        let _ = self.events.send(SessionEvent::Terminated {
            reason: reason.clone(),
        });
        ClientError::SessionTerminated { reason }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method, self.url(path)?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn handle_response(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = read_error_body(response).await;
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::from_unauthorized(body));
        }
        Err(ClientError::Server {
            status: status.as_u16(),
            code: body.error,
            message: body.message,
        })
    }
}

async fn read_error_body(response: Response) -> ErrorBody {
    response.json::<ErrorBody>().await.unwrap_or_default()
}

/// One call to the rotation endpoint.
async fn rotate(
    http: reqwest::Client,
    url: Url,
    refresh_token: String,
) -> Result<TokenResponse, RenewalFailure> {
    let response = http
        .post(url)
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .map_err(|e| RenewalFailure::Network(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return response
            .json::<TokenResponse>()
            .await
            .map_err(|e| RenewalFailure::Network(e.to_string()));
    }

    let body = read_error_body(response).await;
    if status.is_server_error() {
        return Err(RenewalFailure::Server {
            status: status.as_u16(),
            code: body.error,
            message: body.message,
        });
    }
    Err(RenewalFailure::Rejected(if body.message.is_empty() {
        status.to_string()
    } else {
        body.message
    }))
}
