//! # Core Traits (Ports)
//!
//! The three managed collaborators the client talks to. Any adapter plugin
//! must implement these to be wired in by the binary.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::models::{
    Comment, CreateCommentInput, CreatePostInput, CreateVoteInput, Post, SessionUser,
    SignUpOutcome, UpdateVoteInput, Vote,
};

/// Authorization mode attached to each remote data call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Public key; enough for reads.
    ApiKey,
    /// The signed-in user's pool token; required for mutations.
    UserPool,
}

/// Typed query/mutation contract against the managed GraphQL API.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DataGateway: Send + Sync {
    // Queries
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>>;

    // Mutations
    async fn create_post(&self, input: CreatePostInput) -> Result<Post>;
    async fn create_comment(&self, input: CreateCommentInput) -> Result<Comment>;
    async fn create_vote(&self, input: CreateVoteInput) -> Result<Vote>;
    async fn update_vote(&self, input: UpdateVoteInput) -> Result<Vote>;
}

/// Object storage contract for post images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads bytes under a caller-generated key.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    /// Resolves a key to a time-limited signed URL.
    async fn get_url(&self, key: &str) -> Result<String>;
}

/// Hosted identity contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, username: &str, password: &str, email: &str) -> Result<SignUpOutcome>;
    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<()>;
    async fn sign_in(&self, username: &str, password: &str) -> Result<SessionUser>;
    async fn sign_out(&self, user: &SessionUser) -> Result<()>;
    /// The user from a previous sign-in, if its session is still usable.
    async fn current_user(&self) -> Result<Option<SessionUser>>;
}
