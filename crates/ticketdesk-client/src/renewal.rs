//! Single-flight silent renewal.
//!
//! One gate holds the pending renewal as a [`Shared`] future. Callers that
//! hit an expired access token either join the pending renewal, find that a
//! renewal for their expiry event already finished, or start the one
//! renewal themselves. The renewal runs on its own task, so a caller that is
//! cancelled does not cancel it for the others. The store is updated before
//! the gate is cleared; a caller that sees an empty gate therefore also sees
//! the outcome in the store.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::error::RenewalFailure;
use crate::events::SessionEvent;
use crate::token_store::TokenStore;
use crate::types::TokenResponse;

/// Outcome every waiter of one renewal receives.
pub type RenewalOutcome = Result<(), RenewalFailure>;

type PendingRenewal = Shared<BoxFuture<'static, RenewalOutcome>>;

/// What a caller holding a rejected access token should do next.
pub enum Admission {
    /// Await this renewal, then replay.
    Wait(PendingRenewal),
    /// The stored access token is already newer than the one used: replay now.
    AlreadyRenewed,
    /// Nothing to renew with; the session is over.
    NoSession,
}

impl std::fmt::Debug for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wait(_) => f.write_str("Wait"),
            Self::AlreadyRenewed => f.write_str("AlreadyRenewed"),
            Self::NoSession => f.write_str("NoSession"),
        }
    }
}

/// Coordinates renewals so one expiry event causes one rotation.
#[derive(Clone)]
pub struct RenewalCoordinator {
    gate: Arc<Mutex<Option<PendingRenewal>>>,
    store: Arc<TokenStore>,
    events: broadcast::Sender<SessionEvent>,
    timeout: Duration,
}

impl std::fmt::Debug for RenewalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalCoordinator")
            .field("in_flight", &self.in_flight())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RenewalCoordinator {
    /// Creates a coordinator over `store`, bounding each renewal by `timeout`.
    pub fn new(
        store: Arc<TokenStore>,
        events: broadcast::Sender<SessionEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            gate: Arc::new(Mutex::new(None)),
            store,
            events,
            timeout,
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, Option<PendingRenewal>> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a renewal is pending.
    pub fn in_flight(&self) -> bool {
        self.lock_gate().is_some()
    }

    /// Admits a caller whose request was sent with `used_access`.
    ///
    /// `rotate` is called with the stored refresh token only when this caller
    /// starts the renewal.
    pub fn admit<F, Fut>(&self, used_access: Option<&str>, rotate: F) -> Admission
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<TokenResponse, RenewalFailure>> + Send + 'static,
    {
        let mut gate = self.lock_gate();

        if let Some(pending) = gate.as_ref() {
            return Admission::Wait(pending.clone());
        }

        let current = self.store.snapshot();
        if current.access_token.as_deref() != used_access {
            return if current.access_token.is_some() {
                Admission::AlreadyRenewed
            } else {
                Admission::NoSession
            };
        }

        let Some(refresh_token) = current.refresh_token else {
            return Admission::NoSession;
        };

        let task = tokio::spawn(self.clone().run(rotate(refresh_token)));
        let pending = async move { task.await.unwrap_or(Err(RenewalFailure::Cancelled)) }
            .boxed()
            .shared();

        *gate = Some(pending.clone());
        Admission::Wait(pending)
    }

    async fn run<Fut>(self, rotate: Fut) -> RenewalOutcome
    where
        Fut: Future<Output = Result<TokenResponse, RenewalFailure>>,
    {
        let outcome = match tokio::time::timeout(self.timeout, rotate).await {
            Ok(Ok(pair)) => {
                let access_expires_at = pair.access_expires_at;
                self.store
                    .replace_pair(pair.access_token, pair.refresh_token)
                    .map(|()| access_expires_at)
                    .map_err(|e| RenewalFailure::Storage(e.to_string()))
            }
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(RenewalFailure::Timeout),
        };

        let outcome = match outcome {
            Ok(access_expires_at) => {
                info!(access_expires_at = %access_expires_at, "Session renewed");
                let _ = self.events.send(SessionEvent::Renewed { access_expires_at });
                Ok(())
            }
            Err(failure) if !failure.is_terminal() => {
                warn!(reason = %failure, "Session renewal hit a server fault; keeping credentials");
                Err(failure)
            }
            Err(failure) => {
                warn!(reason = %failure, "Session renewal failed; clearing credentials");
                if let Err(e) = self.store.clear() {
                    error!(error = %e, "Failed to clear stored credentials");
                }
                let _ = self.events.send(SessionEvent::Terminated {
                    reason: failure.to_string(),
                });
                Err(failure)
            }
        };

        self.lock_gate().take();
        outcome
    }
}
