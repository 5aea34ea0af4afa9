//! # Session
//!
//! `SessionProvider` is the single owner of "who is signed in". Everything
//! else holds a `SessionContext`, a read-only handle that observes changes.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{SessionUser, SignUpOutcome};
use crate::traits::AuthProvider;

/// State shared by a provider and the contexts it hands out.
struct Shared {
    auth: Arc<dyn AuthProvider>,
    tx: watch::Sender<Option<SessionUser>>,
    refreshing: Mutex<()>,
}

impl Shared {
    /// Asks the auth collaborator for current tokens and publishes them.
    /// Callers queued behind a refresh reuse its result.
    async fn refresh(&self) -> Result<Option<SessionUser>> {
        let _guard = self.refreshing.lock().await;
        let current = self.tx.borrow().clone();
        match current {
            Some(user) if !user.tokens.is_expired(Utc::now()) => return Ok(Some(user)),
            None => return Ok(None),
            Some(_) => {}
        }
        debug!("session tokens expired, refreshing");
        let user = self.auth.current_user().await?;
        if user.is_none() {
            warn!("session ended during token refresh");
        }
        self.tx.send_replace(user.clone());
        Ok(user)
    }
}

/// Read-only view of the current session.
#[derive(Clone)]
pub struct SessionContext {
    rx: watch::Receiver<Option<SessionUser>>,
    shared: Option<Arc<Shared>>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user", &*self.rx.borrow())
            .field("refreshable", &self.shared.is_some())
            .finish()
    }
}

impl SessionContext {
    pub fn current(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }

    pub fn username(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|u| u.username.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The signed-in user, or `Unauthorized` naming the attempted action.
    pub fn require(&self, action: &str) -> Result<SessionUser> {
        self.current()
            .ok_or_else(|| AppError::Unauthorized(format!("sign in to {action}")))
    }

    /// Like [`require`](Self::require), but expired tokens are refreshed
    /// through the provider first. A session the refresh ends is `Unauthorized`.
    pub async fn require_fresh(&self, action: &str) -> Result<SessionUser> {
        let user = self.require(action)?;
        let Some(shared) = &self.shared else {
            return Ok(user);
        };
        if !user.tokens.is_expired(Utc::now()) {
            return Ok(user);
        }
        shared
            .refresh()
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("session expired, sign in to {action}")))
    }

    /// A context pinned to `user` with no provider behind it.
    pub fn fixed(user: Option<SessionUser>) -> Self {
        let (_tx, rx) = watch::channel(user);
        Self { rx, shared: None }
    }
}

/// Wraps the auth collaborator and publishes the resulting session.
pub struct SessionProvider {
    shared: Arc<Shared>,
}

impl SessionProvider {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { shared: Arc::new(Shared { auth, tx, refreshing: Mutex::new(()) }) }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext { rx: self.shared.tx.subscribe(), shared: Some(self.shared.clone()) }
    }

    /// Refreshes expired tokens and publishes the outcome.
    pub async fn ensure_fresh(&self) -> Result<Option<SessionUser>> {
        self.shared.refresh().await
    }

    /// Picks up a session left over from an earlier sign-in.
    pub async fn restore(&self) -> Result<Option<SessionUser>> {
        let user = self.shared.auth.current_user().await?;
        if let Some(u) = &user {
            info!(username = %u.username, "restored session");
        }
        self.shared.tx.send_replace(user.clone());
        Ok(user)
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SessionUser> {
        let user = self.shared.auth.sign_in(username, password).await?;
        info!(username = %user.username, "signed in");
        self.shared.tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_up(&self, username: &str, password: &str, email: &str) -> Result<SignUpOutcome> {
        let outcome = self.shared.auth.sign_up(username, password, email).await?;
        info!(%username, confirmed = outcome.user_confirmed, "signed up");
        Ok(outcome)
    }

    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<()> {
        self.shared.auth.confirm_sign_up(username, code).await
    }

    /// Clears the local session even when the remote sign-out fails.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(user) = self.shared.tx.send_replace(None) else {
            return Ok(());
        };
        if let Err(e) = self.shared.auth.sign_out(&user).await {
            warn!(username = %user.username, error = %e, "remote sign-out failed");
            return Err(e);
        }
        info!(username = %user.username, "signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionTokens;
    use crate::traits::MockAuthProvider;
    use chrono::{Duration, Utc};

    fn user(name: &str) -> SessionUser {
        SessionUser {
            username: name.to_string(),
            email: None,
            tokens: SessionTokens {
                id_token: "id".into(),
                access_token: "access".into(),
                refresh_token: None,
                expires_at: Utc::now() + Duration::hours(1),
            },
        }
    }

    fn expired(name: &str) -> SessionUser {
        let mut u = user(name);
        u.tokens.id_token = "stale".into();
        u.tokens.refresh_token = Some("refresh".into());
        u.tokens.expires_at = Utc::now() - Duration::hours(2);
        u
    }

    #[tokio::test]
    async fn sign_in_publishes_to_every_context() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().returning(|name, _| Ok(user(name)));
        let provider = SessionProvider::new(Arc::new(auth));
        let ctx = provider.context();
        assert!(!ctx.is_signed_in());

        provider.sign_in("alice", "password1").await.unwrap();
        assert_eq!(ctx.username().as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_session_empty() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .returning(|_, _| Err(AppError::Auth("Incorrect username or password.".into())));
        let provider = SessionProvider::new(Arc::new(auth));
        let ctx = provider.context();

        let err = provider.sign_in("alice", "wrong-pass").await.unwrap_err();
        assert_eq!(err.user_message(), "Incorrect username or password.");
        assert!(ctx.current().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_locally_even_on_remote_failure() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().returning(|name, _| Ok(user(name)));
        auth.expect_sign_out()
            .times(1)
            .returning(|_| Err(AppError::Auth("network".into())));
        let provider = SessionProvider::new(Arc::new(auth));
        let ctx = provider.context();

        provider.sign_in("bob", "password1").await.unwrap();
        assert!(provider.sign_out().await.is_err());
        assert!(!ctx.is_signed_in());
        // Nothing left to sign out of.
        assert!(provider.sign_out().await.is_ok());
    }

    #[tokio::test]
    async fn expired_tokens_are_refreshed_once_and_published() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().returning(|name, _| Ok(expired(name)));
        auth.expect_current_user().times(1).returning(|| {
            let mut fresh = user("carol");
            fresh.tokens.id_token = "renewed".into();
            Ok(Some(fresh))
        });
        let provider = SessionProvider::new(Arc::new(auth));
        let ctx = provider.context();
        provider.sign_in("carol", "password1").await.unwrap();

        let first = ctx.require_fresh("vote").await.unwrap();
        assert_eq!(first.tokens.id_token, "renewed");
        assert_eq!(ctx.current().unwrap().tokens.id_token, "renewed");
        // Already fresh, no second refresh.
        let second = ctx.require_fresh("vote").await.unwrap();
        assert_eq!(second.tokens.id_token, "renewed");
    }

    #[tokio::test]
    async fn rejected_refresh_signs_out() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in().returning(|name, _| Ok(expired(name)));
        auth.expect_current_user().times(1).returning(|| Ok(None));
        let provider = SessionProvider::new(Arc::new(auth));
        let ctx = provider.context();
        provider.sign_in("dave", "password1").await.unwrap();

        assert!(matches!(provider.ensure_fresh().await, Ok(None)));
        assert!(!ctx.is_signed_in());
        assert!(matches!(ctx.require_fresh("comment").await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn fixed_context_sends_tokens_as_is() {
        let ctx = SessionContext::fixed(Some(expired("erin")));
        let u = ctx.require_fresh("post").await.unwrap();
        assert_eq!(u.tokens.id_token, "stale");
    }

    #[test]
    fn require_without_user_is_unauthorized() {
        let ctx = SessionContext::fixed(None);
        assert!(matches!(ctx.require("vote"), Err(AppError::Unauthorized(_))));
    }
}
