//! Single post page (`/post/{id}`): the post, its comments and a comment form.

use chrono::{DateTime, Utc};
use rc_core::error::{AppError, Result};
use rc_core::hours_since;
use rc_core::models::{Comment, CreateCommentInput, VoteKind};
use rc_core::validation::{validate_comment, Field, FormErrors};
use rc_ui::{PostCommentTemplate, PostPageTemplate};
use tracing::{error, info};

use crate::components::{Header, PostPreview};
use crate::context::{render, AppContext};

pub struct PostPage {
    preview: PostPreview,
    comments: Vec<Comment>,
    draft: String,
    errors: FormErrors,
    loading: bool,
}

impl PostPage {
    /// Fetches the post and seeds the local comment list from it.
    pub async fn load(ctx: &AppContext, id: &str) -> Result<Self> {
        let post = ctx
            .gateway
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".into(), id.to_string()))?;
        let mut comments = post.comments.items.clone();
        sort_newest_first(&mut comments);

        let mut preview = PostPreview::new(post, ctx);
        preview.load_image(ctx).await;
        Ok(Self {
            preview,
            comments,
            draft: String::new(),
            errors: FormErrors::default(),
            loading: false,
        })
    }

    pub fn preview(&self) -> &PostPreview {
        &self.preview
    }

    /// Comments, newest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub async fn vote(&mut self, ctx: &AppContext, kind: VoteKind) -> Result<()> {
        self.preview.vote(ctx, kind).await
    }

    pub fn sync_session(&mut self, username: Option<&str>) {
        self.preview.sync_session(username);
    }

    /// Publishes the draft. The new comment is added locally, not re-fetched.
    pub async fn submit_comment(&mut self, ctx: &AppContext) -> Result<()> {
        if let Err(e) = validate_comment(&self.draft) {
            if let AppError::Validation(errors) = &e {
                self.errors = errors.clone();
            }
            return Err(e);
        }
        self.errors = FormErrors::default();
        if let Err(e) = ctx.session.require("comment") {
            self.errors = FormErrors::single(Field::Comment, e.to_string());
            return Err(e);
        }

        self.loading = true;
        let input = CreateCommentInput {
            post_id: self.preview.post().id.clone(),
            content: self.draft.clone(),
        };
        let result = ctx.gateway.create_comment(input).await;
        self.loading = false;

        match result {
            Ok(comment) => {
                info!(post_id = %comment.post_id, comment_id = %comment.id, "comment published");
                self.comments.push(comment);
                sort_newest_first(&mut self.comments);
                self.draft.clear();
                Ok(())
            }
            Err(e) => {
                error!(post_id = %self.preview.post().id, error = %e, "comment failed");
                Err(e)
            }
        }
    }

    pub fn render(&self, ctx: &AppContext, now: DateTime<Utc>) -> Result<String> {
        let header = Header::render(ctx)?;
        let preview = self.preview.render(None, now)?;
        let comments = self
            .comments
            .iter()
            .map(|c| {
                render(&PostCommentTemplate {
                    owner: &c.owner,
                    hours_ago: hours_since(c.created_at, now),
                    content: &c.content,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        render(&PostPageTemplate {
            header: &header,
            preview: &preview,
            draft: &self.draft,
            comment_error: self.errors.get(Field::Comment),
            loading: self.loading,
            comments: &comments,
        })
    }
}

fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
