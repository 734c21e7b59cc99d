//! Session manager: the façade the HTTP layer talks to.

use std::sync::Arc;

use tracing::{info, warn};

use ticketdesk_core::clock::Clock;
use ticketdesk_core::config::AuthConfig;
use ticketdesk_core::error::AppError;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::{Identity, IdentityProvider, RevocationStore};

use crate::jwt::{CredentialCodec, TokenType, VerifyError};
use crate::password::PasswordHasher;

use super::{AuthFailure, LoginResult, RotationService, SessionIssuer, SessionTerminator, TokenPair};

const INVALID_LOGIN: &str = "Invalid username or password";

/// Manages the complete session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: Arc<CredentialCodec>,
    identities: Arc<dyn IdentityProvider>,
    password_hasher: Arc<PasswordHasher>,
    issuer: Arc<SessionIssuer>,
    rotation: Arc<RotationService>,
    terminator: Arc<SessionTerminator>,
}

impl SessionManager {
    /// Wires the session services around one codec and one store.
    pub fn new(
        config: &AuthConfig,
        codec: Arc<CredentialCodec>,
        store: Arc<dyn RevocationStore>,
        identities: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let issuer = Arc::new(SessionIssuer::new(
            config,
            Arc::clone(&codec),
            Arc::clone(&store),
        )?);
        let rotation = Arc::new(RotationService::new(
            Arc::clone(&codec),
            Arc::clone(&store),
            Arc::clone(&issuer),
            clock,
        ));
        let terminator = Arc::new(SessionTerminator::new(Arc::clone(&codec), store));

        Ok(Self {
            codec,
            identities,
            password_hasher: Arc::new(PasswordHasher::new()),
            issuer,
            rotation,
            terminator,
        })
    }

    /// Authenticates with username and password and issues a session.
    ///
    /// Unknown users and wrong passwords are rejected identically.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> AppResult<LoginResult> {
        let Some(stored) = self.identities.find_credentials(username).await? else {
            warn!(username = %username, "Login attempt for unknown user");
            return Err(AppError::invalid_credentials(INVALID_LOGIN));
        };

        if !self
            .password_hasher
            .verify_password(password, &stored.password_hash)?
        {
            warn!(username = %username, "Login attempt with wrong password");
            return Err(AppError::invalid_credentials(INVALID_LOGIN));
        }

        let tokens = self.issuer.issue(stored.identity.id, remember).await?;
        info!(
            user_id = %stored.identity.id,
            username = %username,
            remember = remember,
            "User logged in"
        );

        Ok(LoginResult {
            tokens,
            identity: stored.identity,
        })
    }

    /// Exchanges a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        self.rotation.rotate(refresh_token).await
    }

    /// Removes the record behind `refresh_token`. Never fails.
    pub async fn logout(&self, refresh_token: &str) -> bool {
        self.terminator.logout(refresh_token).await
    }

    /// Resolves the identity behind a bearer access token.
    ///
    /// Lookup failures in the identity provider propagate as-is; every
    /// credential problem becomes an [`AuthFailure`].
    pub async fn authenticate(&self, bearer: Option<&str>) -> AppResult<Identity> {
        let token = bearer
            .filter(|t| !t.is_empty())
            .ok_or(AuthFailure::MissingToken)?;

        let claims = self
            .codec
            .verify_as(token, TokenType::Access)
            .map_err(|e| match e {
                VerifyError::Expired => AuthFailure::ExpiredAccess,
                VerifyError::Invalid => AuthFailure::InvalidAccess,
            })?;

        match self.identities.find_by_id(claims.user_id()).await? {
            Some(identity) => Ok(identity),
            None => {
                warn!(user_id = %claims.user_id(), "Access token for unknown identity");
                Err(AuthFailure::InvalidAccess.into())
            }
        }
    }

    /// The issuer, for callers that mint sessions for already-verified identities.
    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }
}
