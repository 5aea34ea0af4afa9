//! # rc-auth-cognito
//!
//! `AuthProvider` over the hosted user pool's JSON API.
//! Features: password sign-in, sign-up with emailed code, refresh-token
//! session restore and an optional on-disk refresh token cache.

mod api;
mod token;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rc_core::error::{AppError, Result};
use rc_core::models::{SessionTokens, SessionUser, SignUpOutcome};
use rc_core::traits::AuthProvider;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{
    Action, AttributeType, AuthenticationResult, CachedSession, ConfirmSignUpRequest, ErrorBody,
    GlobalSignOutRequest, InitiateAuthRequest, InitiateAuthResponse, SignUpRequest, SignUpResponse,
};
use crate::token::decode_claims;

pub struct CognitoAuth {
    http: Client,
    endpoint: String,
    client_id: String,
    token_cache: Option<PathBuf>,
    session: Mutex<Option<SessionUser>>,
}

impl CognitoAuth {
    pub fn new(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            token_cache: None,
            session: Mutex::new(None),
        }
    }

    /// Keeps the refresh token in `path` so a later run can restore the session.
    pub fn with_token_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache = Some(path.into());
        self
    }

    async fn call<Req: Serialize, Res: DeserializeOwned>(&self, action: Action, body: &Req) -> Result<Res> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| AppError::Internal(format!("{} body: {e}", action.name())))?;
        debug!(action = action.name(), "identity request");
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", action.target())
            .header(CONTENT_TYPE, api::CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("identity service unreachable: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("identity service read failed: {e}")))?;

        if !status.is_success() {
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            warn!(action = action.name(), %status, kind = error.short_kind(), "identity call rejected");
            let message = if error.message.is_empty() {
                format!("{} failed with status {status}", action.name())
            } else {
                error.message
            };
            return Err(AppError::Auth(message));
        }

        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::Internal(format!("{} response: {e}", action.name())))
    }

    async fn initiate_auth(
        &self,
        flow: &'static str,
        parameters: HashMap<&'static str, &str>,
    ) -> Result<AuthenticationResult> {
        let response: InitiateAuthResponse = self
            .call(
                Action::InitiateAuth,
                &InitiateAuthRequest { auth_flow: flow, client_id: &self.client_id, auth_parameters: parameters },
            )
            .await?;
        if let Some(challenge) = response.challenge_name {
            return Err(AppError::Auth(format!("additional sign-in step required: {challenge}")));
        }
        response
            .authentication_result
            .ok_or(AppError::MissingData("authentication result"))
    }

    /// Builds the session from issued tokens, falling back to `username`
    /// and the previous refresh token where the response omits them.
    fn session_from(
        result: AuthenticationResult,
        username: &str,
        previous_refresh: Option<String>,
    ) -> Result<SessionUser> {
        let claims = decode_claims(&result.id_token)?;
        let expires_at = claims
            .expires_at()
            .unwrap_or_else(|| Utc::now() + Duration::seconds(result.expires_in));
        Ok(SessionUser {
            username: claims.username.unwrap_or_else(|| username.to_string()),
            email: claims.email,
            tokens: SessionTokens {
                id_token: result.id_token,
                access_token: result.access_token,
                refresh_token: result.refresh_token.or(previous_refresh),
                expires_at,
            },
        })
    }

    async fn refresh(&self, username: &str, refresh_token: String) -> Result<SessionUser> {
        let mut parameters = HashMap::new();
        parameters.insert("REFRESH_TOKEN", refresh_token.as_str());
        let result = self.initiate_auth("REFRESH_TOKEN_AUTH", parameters).await?;
        Self::session_from(result, username, Some(refresh_token))
    }

    async fn load_cached(&self) -> Option<CachedSession> {
        let path = self.token_cache.as_ref()?;
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no cached session");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable session cache");
                None
            }
        }
    }

    async fn store_cached(&self, user: &SessionUser) {
        let (Some(path), Some(refresh_token)) = (&self.token_cache, &user.tokens.refresh_token) else {
            return;
        };
        let cached = CachedSession { username: user.username.clone(), refresh_token: refresh_token.clone() };
        let result = match serde_json::to_vec(&cached) {
            Ok(raw) => tokio::fs::write(path, raw).await,
            Err(e) => Err(std::io::Error::other(e)),
        };
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "could not write session cache");
        }
    }

    async fn forget_cached(&self) {
        let Some(path) = &self.token_cache else { return };
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not clear session cache"),
        }
    }
}

#[async_trait]
impl AuthProvider for CognitoAuth {
    async fn sign_up(&self, username: &str, password: &str, email: &str) -> Result<SignUpOutcome> {
        let response: SignUpResponse = self
            .call(
                Action::SignUp,
                &SignUpRequest {
                    client_id: &self.client_id,
                    username,
                    password,
                    user_attributes: vec![AttributeType { name: "email", value: email }],
                },
            )
            .await?;
        Ok(SignUpOutcome {
            user_confirmed: response.user_confirmed,
            code_destination: response.code_delivery_details.and_then(|d| d.destination),
        })
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<()> {
        let _: IgnoredAny = self
            .call(
                Action::ConfirmSignUp,
                &ConfirmSignUpRequest { client_id: &self.client_id, username, confirmation_code: code },
            )
            .await?;
        info!(%username, "sign-up confirmed");
        Ok(())
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<SessionUser> {
        let mut parameters = HashMap::new();
        parameters.insert("USERNAME", username);
        parameters.insert("PASSWORD", password);
        let result = self.initiate_auth("USER_PASSWORD_AUTH", parameters).await?;
        let user = Self::session_from(result, username, None)?;

        self.store_cached(&user).await;
        *self.session.lock().await = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self, user: &SessionUser) -> Result<()> {
        self.session.lock().await.take();
        self.forget_cached().await;
        let _: IgnoredAny = self
            .call(Action::GlobalSignOut, &GlobalSignOutRequest { access_token: &user.tokens.access_token })
            .await?;
        Ok(())
    }

    /// Returns the cached user, refreshing expired tokens first. A refresh
    /// token the pool no longer accepts ends the session.
    async fn current_user(&self) -> Result<Option<SessionUser>> {
        let mut session = self.session.lock().await;
        let (username, refresh_token) = match session.clone() {
            Some(user) if !user.tokens.is_expired(Utc::now()) => return Ok(Some(user)),
            Some(user) => match user.tokens.refresh_token {
                Some(token) => (user.username, token),
                None => {
                    session.take();
                    return Ok(None);
                }
            },
            None => match self.load_cached().await {
                Some(cached) => (cached.username, cached.refresh_token),
                None => return Ok(None),
            },
        };

        match self.refresh(&username, refresh_token).await {
            Ok(user) => {
                info!(username = %user.username, "session refreshed");
                *session = Some(user.clone());
                Ok(Some(user))
            }
            Err(AppError::Auth(message)) => {
                warn!(%username, %message, "refresh rejected, session dropped");
                session.take();
                self.forget_cached().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
