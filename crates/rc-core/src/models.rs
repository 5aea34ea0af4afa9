//! # Domain Models
//!
//! Transient client-side copies of the entities owned by the managed API.
//! Field names follow the GraphQL schema so the same types travel over the wire.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A page of items as returned by list fields (`items` + `nextToken`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { items: Vec::new(), next_token: None }
    }
}

/// The fundamental unit of content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub contents: String,
    /// Opaque storage key, resolved to a signed URL by the `ObjectStore`.
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Connection<Comment>,
    #[serde(default)]
    pub votes: Connection<Vote>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(rename = "postID")]
    pub post_id: String,
    pub owner: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub id: String,
    #[serde(rename = "postID")]
    pub post_id: String,
    pub owner: String,
    pub vote: VoteKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" | "up" => Ok(VoteKind::Upvote),
            "downvote" | "down" => Ok(VoteKind::Downvote),
            other => Err(AppError::Internal(format!("unknown vote kind `{other}`"))),
        }
    }
}

// ── Mutation inputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatePostInput {
    pub title: String,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateCommentInput {
    #[serde(rename = "postID")]
    pub post_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateVoteInput {
    #[serde(rename = "postID")]
    pub post_id: String,
    pub vote: VoteKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdateVoteInput {
    pub id: String,
    #[serde(rename = "postID")]
    pub post_id: String,
    pub vote: VoteKind,
}

// ── Session ─────────────────────────────────────────────────────────────────

/// The signed-in user as handed out by the auth collaborator.
#[derive(Clone, PartialEq)]
pub struct SessionUser {
    pub username: String,
    pub email: Option<String>,
    pub tokens: SessionTokens,
}

#[derive(Clone, PartialEq)]
pub struct SessionTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionTokens {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for SessionUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a sign-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_confirmed: bool,
    /// Where the verification code was sent (e.g. a masked email).
    pub code_destination: Option<String>,
}

// ── Uploads ─────────────────────────────────────────────────────────────────

/// A locally selected image, held in memory until uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
