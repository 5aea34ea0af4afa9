//! Listing page (`/`): every post, newest data from the gateway on load.

use chrono::{DateTime, Utc};
use rc_core::error::{AppError, Result};
use rc_core::models::VoteKind;
use rc_ui::HomeTemplate;
use tracing::{error, info};

use crate::components::{Header, PostPreview};
use crate::context::{render, AppContext};

pub enum ListingState {
    Loading,
    Loaded(Vec<PostPreview>),
    /// The fetch failed; shown instead of an empty list. Not retried.
    Failed(String),
}

pub struct ListingPage {
    state: ListingState,
}

impl Default for ListingPage {
    fn default() -> Self {
        Self { state: ListingState::Loading }
    }
}

impl ListingPage {
    pub async fn load(ctx: &AppContext) -> Self {
        let mut page = Self::default();
        page.refresh(ctx).await;
        page
    }

    pub async fn refresh(&mut self, ctx: &AppContext) {
        self.state = ListingState::Loading;
        self.state = match ctx.gateway.list_posts().await {
            Ok(posts) => {
                info!(count = posts.len(), "posts loaded");
                let mut previews = Vec::with_capacity(posts.len());
                for post in posts {
                    let mut preview = PostPreview::new(post, ctx);
                    preview.load_image(ctx).await;
                    previews.push(preview);
                }
                ListingState::Loaded(previews)
            }
            Err(e) => {
                error!(error = %e, "could not get posts");
                ListingState::Failed(e.to_string())
            }
        };
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn previews(&self) -> &[PostPreview] {
        match &self.state {
            ListingState::Loaded(previews) => previews,
            _ => &[],
        }
    }

    /// The id of the post shown at 1-based `position`.
    pub fn post_id(&self, position: usize) -> Result<String> {
        self.preview_at(position).map(|p| p.post().id.clone())
    }

    pub async fn vote(&mut self, ctx: &AppContext, position: usize, kind: VoteKind) -> Result<()> {
        self.preview_at_mut(position)?.vote(ctx, kind).await
    }

    pub fn sync_session(&mut self, username: Option<&str>) {
        if let ListingState::Loaded(previews) = &mut self.state {
            previews.iter_mut().for_each(|p| p.sync_session(username));
        }
    }

    fn preview_at(&self, position: usize) -> Result<&PostPreview> {
        position
            .checked_sub(1)
            .and_then(|i| self.previews().get(i))
            .ok_or_else(|| AppError::NotFound("post at position".into(), position.to_string()))
    }

    fn preview_at_mut(&mut self, position: usize) -> Result<&mut PostPreview> {
        let ListingState::Loaded(previews) = &mut self.state else {
            return Err(AppError::NotFound("post at position".into(), position.to_string()));
        };
        position
            .checked_sub(1)
            .and_then(|i| previews.get_mut(i))
            .ok_or_else(|| AppError::NotFound("post at position".into(), position.to_string()))
    }

    pub fn render(&self, ctx: &AppContext, now: DateTime<Utc>) -> Result<String> {
        let header = Header::render(ctx)?;
        let posts = self
            .previews()
            .iter()
            .enumerate()
            .map(|(i, p)| p.render(Some(i + 1), now))
            .collect::<Result<Vec<_>>>()?;
        let error = match &self.state {
            ListingState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        };
        render(&HomeTemplate {
            header: &header,
            loading: matches!(self.state, ListingState::Loading),
            error,
            posts: &posts,
        })
    }
}
