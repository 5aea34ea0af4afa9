//! Post preview: renders one post and owns its vote state.

use chrono::{DateTime, Utc};
use rc_core::error::Result;
use rc_core::hours_since;
use rc_core::models::{Post, Vote, VoteKind};
use rc_core::votes::{Tally, VoteMutation, VoteState};
use rc_ui::{excerpt, PostPreviewTemplate};
use tracing::{debug, error, info, warn};

use crate::context::{render, AppContext};

pub struct PostPreview {
    post: Post,
    votes: VoteState,
    image_url: Option<String>,
}

impl PostPreview {
    /// Seeds the tally from the snapshot and picks up the signed-in user's vote.
    pub fn new(post: Post, ctx: &AppContext) -> Self {
        let votes = VoteState::new(&post, ctx.session.username().as_deref());
        Self { post, votes, image_url: None }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn tally(&self) -> Tally {
        self.votes.tally()
    }

    pub fn score(&self) -> i64 {
        self.votes.score()
    }

    pub fn my_vote(&self) -> Option<VoteKind> {
        self.votes.existing().map(|e| e.kind)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Resolves the post image to a signed URL. A failure only hides the image.
    pub async fn load_image(&mut self, ctx: &AppContext) {
        let Some(key) = self.post.image.as_deref() else {
            return;
        };
        match ctx.store.get_url(key).await {
            Ok(url) => self.image_url = Some(url),
            Err(e) => warn!(post_id = %self.post.id, %key, error = %e, "no image found"),
        }
    }

    /// Re-resolves "my vote" after a sign-in or sign-out.
    pub fn sync_session(&mut self, username: Option<&str>) {
        self.votes.attach_user(&self.post.votes.items, username);
    }

    /// Casts or switches the user's vote. Re-casting the current kind does nothing.
    ///
    /// The tally moves before the call returns; a failed call puts it back.
    pub async fn vote(&mut self, ctx: &AppContext, kind: VoteKind) -> Result<()> {
        ctx.session.require("vote")?;

        let Some(pending) = self.votes.begin(kind)? else {
            debug!(post_id = %self.post.id, %kind, "vote unchanged");
            return Ok(());
        };

        let result = match pending.mutation {
            VoteMutation::Create(input) => ctx.gateway.create_vote(input).await,
            VoteMutation::Update(input) => ctx.gateway.update_vote(input).await,
        };

        match result {
            Ok(record) => {
                self.votes.confirm(pending.correlation_id, &record);
                info!(post_id = %self.post.id, vote_id = %record.id, kind = %record.vote, "vote saved");
                self.remember(record);
                Ok(())
            }
            Err(e) => {
                self.votes.revert(pending.correlation_id);
                error!(post_id = %self.post.id, %kind, error = %e, "vote failed, reverted");
                Err(e)
            }
        }
    }

    /// Keeps the snapshot's vote list in line with the confirmed record.
    fn remember(&mut self, record: Vote) {
        let items = &mut self.post.votes.items;
        match items.iter_mut().find(|v| v.id == record.id) {
            Some(v) => *v = record,
            None => items.push(record),
        }
    }

    pub fn render(&self, index: Option<usize>, now: DateTime<Utc>) -> Result<String> {
        let mine = self.my_vote();
        let excerpt = excerpt(&self.post.contents);
        render(&PostPreviewTemplate {
            index,
            owner: &self.post.owner,
            hours_ago: hours_since(self.post.created_at, now),
            title: &self.post.title,
            excerpt: &excerpt,
            score: self.score(),
            up_marker: if mine == Some(VoteKind::Upvote) { "x" } else { " " },
            down_marker: if mine == Some(VoteKind::Downvote) { "x" } else { " " },
            image_url: self.image_url.as_deref(),
            pending: self.votes.is_pending(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{context, post_with_votes, vote};
    use mockall::predicate::eq;
    use rc_core::error::AppError;
    use rc_core::models::{CreateVoteInput, UpdateVoteInput};
    use rc_core::traits::{MockDataGateway, MockObjectStore};

    #[tokio::test]
    async fn new_vote_issues_one_create() {
        let mut gateway = MockDataGateway::new();
        gateway
            .expect_create_vote()
            .with(eq(CreateVoteInput { post_id: "p1".into(), vote: VoteKind::Upvote }))
            .times(1)
            .returning(|_| Ok(vote("v-new", "me", VoteKind::Upvote)));
        gateway.expect_update_vote().never();
        let ctx = context(gateway, MockObjectStore::new(), Some("me")).await;

        let mut preview = PostPreview::new(post_with_votes(vec![]), &ctx);
        preview.vote(&ctx, VoteKind::Upvote).await.unwrap();

        assert_eq!(preview.tally(), Tally { upvotes: 1, downvotes: 0 });
        assert_eq!(preview.my_vote(), Some(VoteKind::Upvote));
    }

    #[tokio::test]
    async fn switching_vote_issues_one_update_with_existing_id() {
        let mut gateway = MockDataGateway::new();
        gateway
            .expect_update_vote()
            .with(eq(UpdateVoteInput {
                id: "v1".into(),
                post_id: "p1".into(),
                vote: VoteKind::Downvote,
            }))
            .times(1)
            .returning(|_| Ok(vote("v1", "me", VoteKind::Downvote)));
        gateway.expect_create_vote().never();
        let ctx = context(gateway, MockObjectStore::new(), Some("me")).await;

        let mut preview = PostPreview::new(post_with_votes(vec![vote("v1", "me", VoteKind::Upvote)]), &ctx);
        preview.vote(&ctx, VoteKind::Downvote).await.unwrap();

        assert_eq!(preview.tally(), Tally { upvotes: 0, downvotes: 1 });
        assert_eq!(preview.post().votes.items.len(), 1);
    }

    #[tokio::test]
    async fn failed_vote_is_rolled_back() {
        let mut gateway = MockDataGateway::new();
        gateway
            .expect_create_vote()
            .returning(|_| Err(AppError::Gateway("timeout".into())));
        let ctx = context(gateway, MockObjectStore::new(), Some("me")).await;

        let mut preview = PostPreview::new(post_with_votes(vec![vote("a", "other", VoteKind::Upvote)]), &ctx);
        assert!(preview.vote(&ctx, VoteKind::Downvote).await.is_err());
        assert_eq!(preview.tally(), Tally { upvotes: 1, downvotes: 0 });
        assert_eq!(preview.my_vote(), None);
    }

    #[tokio::test]
    async fn voting_signed_out_makes_no_call() {
        let mut gateway = MockDataGateway::new();
        gateway.expect_create_vote().never();
        let ctx = context(gateway, MockObjectStore::new(), None).await;

        let mut preview = PostPreview::new(post_with_votes(vec![]), &ctx);
        let err = preview.vote(&ctx, VoteKind::Upvote).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(preview.score(), 0);
    }

    #[tokio::test]
    async fn missing_image_is_not_an_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_get_url()
            .withf(|key| key == "img-key")
            .returning(|_| Err(AppError::Storage("NoSuchKey".into())));
        let ctx = context(MockDataGateway::new(), store, None).await;

        let mut post = post_with_votes(vec![]);
        post.image = Some("img-key".into());
        let mut preview = PostPreview::new(post, &ctx);
        preview.load_image(&ctx).await;
        assert!(preview.image_url().is_none());
    }

    #[tokio::test]
    async fn sign_in_after_mount_picks_up_existing_vote() {
        let ctx = context(MockDataGateway::new(), MockObjectStore::new(), None).await;
        let mut preview = PostPreview::new(post_with_votes(vec![vote("v1", "me", VoteKind::Downvote)]), &ctx);
        assert_eq!(preview.my_vote(), None);

        preview.sync_session(Some("me"));
        assert_eq!(preview.my_vote(), Some(VoteKind::Downvote));
        assert_eq!(preview.score(), -1);
    }
}
