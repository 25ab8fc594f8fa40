//! Authentication state for the lifetime of one client session.
//!
//! `AuthStateController` owns the authenticated flag and is the only writer
//! of the persisted token. Consumers read the flag through
//! [`AuthStateController::is_authenticated`] or subscribe to changes.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::token::decode_claims;
use super::{AuthError, TokenStatus, TokenStore};
use crate::clock::{Clock, SystemClock};
use crate::nav::Navigator;
use crate::notify::{NoticeKind, Notifier};

/// Storage key the session token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Where logout sends the user.
pub const ROOT_PATH: &str = "/";

const LOGOUT_SUCCESS_MESSAGE: &str = "Logout successful!";
const LOGOUT_FAILURE_MESSAGE: &str = "Logout failed. Please try again.";

/// What `initialize` does with a stored token that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedTokenPolicy {
    /// Leave it in storage. Only expired tokens are deleted.
    Retain,
    /// Delete it, same as an expired token.
    #[default]
    Purge,
}

pub struct AuthStateController<S, C = SystemClock> {
    store: S,
    clock: C,
    malformed_policy: MalformedTokenPolicy,
    authenticated: watch::Sender<bool>,
}

impl<S: TokenStore, C: Clock> AuthStateController<S, C> {
    /// Create a controller in the unauthenticated state. Call
    /// [`initialize`](Self::initialize) before reading the flag.
    pub fn new(store: S, clock: C) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            store,
            clock,
            malformed_policy: MalformedTokenPolicy::default(),
            authenticated,
        }
    }

    pub fn with_malformed_policy(mut self, policy: MalformedTokenPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    /// Derive the flag from the persisted token.
    ///
    /// Expired tokens are deleted. Malformed tokens are deleted or kept per
    /// the [`MalformedTokenPolicy`]. Storage failures are logged and leave the
    /// session unauthenticated; nothing is returned as an error.
    pub fn initialize(&mut self) -> TokenStatus {
        let status = self.check_persisted_token();
        self.set_authenticated(status.is_valid());
        status
    }

    fn check_persisted_token(&self) -> TokenStatus {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token");
                return TokenStatus::Absent;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                return TokenStatus::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let status = TokenStatus::evaluate(&token, self.clock.now_ms());
        match &status {
            TokenStatus::Valid { expires_at_ms } => {
                debug!(expires_at_ms, "Persisted token is valid");
            }
            TokenStatus::Expired { expires_at_ms } => {
                debug!(?expires_at_ms, "Persisted token expired, removing");
                self.discard_token();
            }
            TokenStatus::Malformed { reason } => match self.malformed_policy {
                MalformedTokenPolicy::Purge => {
                    debug!(reason = %reason, "Persisted token is malformed, removing");
                    self.discard_token();
                }
                MalformedTokenPolicy::Retain => {
                    debug!(reason = %reason, "Persisted token is malformed, keeping");
                }
            },
            TokenStatus::Absent | TokenStatus::Unavailable { .. } => {}
        }
        status
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove persisted token");
        }
    }

    /// Overwrite the flag. Subscribers are woken when the value changes.
    ///
    /// No validation happens here; the caller must already have brought the
    /// persisted token in line. Prefer [`login`](Self::login) and
    /// [`logout`](Self::logout), which keep both in step.
    pub fn set_authenticated(&mut self, value: bool) {
        let changed = self.authenticated.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
        if changed {
            debug!(authenticated = value, "Auth state changed");
        }
    }

    /// Persist a freshly issued token and mark the session authenticated.
    ///
    /// The token must decode and be unexpired. On any error nothing is
    /// persisted and the flag is left as it was.
    pub fn login(&mut self, token: &str) -> Result<(), AuthError> {
        let claims = decode_claims(token)?;
        if !claims.is_unexpired_at(self.clock.now_ms()) {
            return Err(AuthError::TokenExpired);
        }

        self.store.set(TOKEN_KEY, token)?;
        self.set_authenticated(true);
        info!(subject = ?claims.subject(), "Logged in");
        Ok(())
    }

    /// Drop the session and send the user to the root page.
    ///
    /// Best effort: if the token cannot be removed the user is told so, but
    /// the flag is still cleared and the redirect still happens.
    pub fn logout<N, T>(&mut self, navigator: &mut N, notifier: &T)
    where
        N: Navigator + ?Sized,
        T: Notifier + ?Sized,
    {
        match self.store.remove(TOKEN_KEY) {
            Ok(()) => {
                info!("Logged out");
                notifier.notify(NoticeKind::Success, LOGOUT_SUCCESS_MESSAGE);
            }
            Err(e) => {
                warn!(error = %e, "Failed to remove token during logout");
                notifier.notify(NoticeKind::Error, LOGOUT_FAILURE_MESSAGE);
            }
        }

        self.set_authenticated(false);
        navigator.redirect_to(ROOT_PATH);
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Receiver that observes every change of the flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// The persisted token, for use as a bearer credential. `None` while
    /// unauthenticated or when storage cannot be read.
    pub fn token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
