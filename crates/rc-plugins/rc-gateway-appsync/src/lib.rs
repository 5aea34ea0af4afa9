//! # rc-gateway-appsync
//!
//! `DataGateway` over the managed GraphQL endpoint.
//! Reads authorize with the API key, mutations with the signed-in user's pool token.

mod documents;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rc_core::error::{AppError, Result};
use rc_core::models::{
    Comment, Connection, CreateCommentInput, CreatePostInput, CreateVoteInput, Post,
    UpdateVoteInput, Vote,
};
use rc_core::session::SessionContext;
use rc_core::traits::{AuthMode, DataGateway};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Page size requested from list fields.
pub const PAGE_LIMIT: u32 = 100;

/// What a top-level field is called in messages shown to the user.
fn noun(field: &'static str) -> &'static str {
    match field {
        "listPosts" => "posts",
        "getPost" | "createPost" => "post",
        "createComment" => "comment",
        "createVote" | "updateVote" => "vote",
        other => other,
    }
}

pub struct AppSyncGateway {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    session: SessionContext,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<HashMap<String, Option<T>>>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
}

impl AppSyncGateway {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString, session: SessionContext) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            session,
        }
    }

    /// Runs one operation and returns its top-level field, `None` when it is null.
    async fn execute<T: DeserializeOwned>(
        &self,
        field: &'static str,
        query: &str,
        variables: serde_json::Value,
        mode: AuthMode,
    ) -> Result<Option<T>> {
        let request = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        let request = match mode {
            AuthMode::ApiKey => request.header("x-api-key", self.api_key.expose_secret()),
            AuthMode::UserPool => {
                let user = self.session.require_fresh(noun(field)).await?;
                request.header(AUTHORIZATION, user.tokens.id_token)
            }
        };

        debug!(operation = field, ?mode, "graphql request");
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("{field}: request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("{field}: {e}")))?;

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                AppError::Gateway(format!("{field}: parse failed: {e}"))
            } else {
                AppError::Gateway(format!("{field}: HTTP {status}"))
            }
        })?;

        if !parsed.errors.is_empty() {
            warn!(operation = field, %status, count = parsed.errors.len(), "graphql errors");
            let unauthorized = parsed
                .errors
                .iter()
                .any(|e| e.error_type.as_deref() == Some("UnauthorizedException"));
            let message = parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if unauthorized {
                AppError::Unauthorized(message)
            } else {
                AppError::Gateway(format!("{field}: {message}"))
            });
        }

        let mut data = parsed.data.ok_or(AppError::MissingData(noun(field)))?;
        data.remove(field).ok_or(AppError::MissingData(noun(field)))
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        field: &'static str,
        query: &str,
        input: impl Serialize,
    ) -> Result<T> {
        let variables = json!({ "input": input });
        self.execute(field, query, variables, AuthMode::UserPool)
            .await?
            .ok_or(AppError::MissingData(noun(field)))
    }
}

#[async_trait]
impl DataGateway for AppSyncGateway {
    /// Follows `nextToken` until every page is in. A token seen twice
    /// ends the walk.
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut seen = HashSet::new();
        let mut next_token: Option<String> = None;
        loop {
            let variables = json!({ "limit": PAGE_LIMIT, "nextToken": next_token });
            let page: Connection<Post> = self
                .execute("listPosts", documents::LIST_POSTS, variables, AuthMode::ApiKey)
                .await?
                .ok_or(AppError::MissingData(noun("listPosts")))?;
            posts.extend(page.items);
            match page.next_token {
                Some(token) if !seen.insert(token.clone()) => {
                    warn!(%token, pages = seen.len(), "listPosts repeated a page token, stopping");
                    break;
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        self.execute("getPost", documents::GET_POST, json!({ "id": id }), AuthMode::ApiKey)
            .await
    }

    async fn create_post(&self, input: CreatePostInput) -> Result<Post> {
        self.mutate("createPost", documents::CREATE_POST, input).await
    }

    async fn create_comment(&self, input: CreateCommentInput) -> Result<Comment> {
        self.mutate("createComment", documents::CREATE_COMMENT, input).await
    }

    async fn create_vote(&self, input: CreateVoteInput) -> Result<Vote> {
        self.mutate("createVote", documents::CREATE_VOTE, input).await
    }

    async fn update_vote(&self, input: UpdateVoteInput) -> Result<Vote> {
        self.mutate("updateVote", documents::UPDATE_VOTE, input).await
    }
}
