//! # Vote Reconciliation
//!
//! Per-post local vote state. A vote action is two-phase: `begin` applies a
//! provisional delta to the tally and hands back the mutation to send, tagged
//! with a correlation id; the caller then either `confirm`s it with the
//! server's record or `revert`s it on failure.
//!
//! Invariant: the current user owns at most one vote per post. An existing
//! vote is always updated in place, never duplicated.

use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateVoteInput, Post, UpdateVoteInput, Vote, VoteKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl Tally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        votes.iter().fold(Tally::default(), |mut t, v| {
            t.bump(v.vote, 1);
            t
        })
    }

    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    fn bump(&mut self, kind: VoteKind, delta: i64) {
        match kind {
            VoteKind::Upvote => self.upvotes += delta,
            VoteKind::Downvote => self.downvotes += delta,
        }
    }
}

/// The current user's vote on a post. `id` is `None` until a create is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingVote {
    pub kind: VoteKind,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoteMutation {
    Create(CreateVoteInput),
    Update(UpdateVoteInput),
}

/// A provisional vote awaiting the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVote {
    pub correlation_id: Uuid,
    pub mutation: VoteMutation,
}

#[derive(Debug, Clone)]
struct Provisional {
    correlation_id: Uuid,
    requested: VoteKind,
    previous: Option<ExistingVote>,
}

#[derive(Debug, Clone)]
pub struct VoteState {
    post_id: String,
    tally: Tally,
    existing: Option<ExistingVote>,
    pending: Option<Provisional>,
}

impl VoteState {
    /// Seeds the tally from the post snapshot and finds `username`'s vote in it.
    pub fn new(post: &Post, username: Option<&str>) -> Self {
        let mut state = Self {
            post_id: post.id.clone(),
            tally: Tally::from_votes(&post.votes.items),
            existing: None,
            pending: None,
        };
        state.attach_user(&post.votes.items, username);
        state
    }

    /// Re-resolves the user's existing vote after the session changes.
    pub fn attach_user(&mut self, votes: &[Vote], username: Option<&str>) {
        self.existing = username.and_then(|name| {
            votes.iter().find(|v| v.owner == name).map(|v| ExistingVote {
                kind: v.vote,
                id: Some(v.id.clone()),
            })
        });
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn score(&self) -> i64 {
        self.tally.score()
    }

    pub fn existing(&self) -> Option<&ExistingVote> {
        self.existing.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies the provisional delta for a vote of `kind`.
    ///
    /// Returns `Ok(None)` when the user already holds a vote of that kind.
    /// Only one vote per post may be in flight.
    pub fn begin(&mut self, kind: VoteKind) -> Result<Option<PendingVote>> {
        if self.pending.is_some() {
            return Err(AppError::Conflict(format!(
                "a vote on post {} is still in flight",
                self.post_id
            )));
        }

        let previous = self.existing.clone();
        let mutation = match &previous {
            Some(e) if e.kind == kind => return Ok(None),
            Some(e) => {
                let id = e.id.clone().ok_or_else(|| {
                    AppError::Internal("existing vote has no id outside a pending create".into())
                })?;
                self.tally.bump(e.kind, -1);
                self.tally.bump(kind, 1);
                self.existing = Some(ExistingVote { kind, id: Some(id.clone()) });
                VoteMutation::Update(UpdateVoteInput {
                    id,
                    post_id: self.post_id.clone(),
                    vote: kind,
                })
            }
            None => {
                self.tally.bump(kind, 1);
                self.existing = Some(ExistingVote { kind, id: None });
                VoteMutation::Create(CreateVoteInput {
                    post_id: self.post_id.clone(),
                    vote: kind,
                })
            }
        };

        let correlation_id = Uuid::new_v4();
        debug!(post_id = %self.post_id, %correlation_id, %kind, "provisional vote applied");
        self.pending = Some(Provisional { correlation_id, requested: kind, previous });
        Ok(Some(PendingVote { correlation_id, mutation }))
    }

    /// Settles the provisional vote against the server's record.
    /// Returns `false` for a correlation id that is no longer pending.
    pub fn confirm(&mut self, correlation_id: Uuid, record: &Vote) -> bool {
        let Some(p) = self.take_pending(correlation_id) else {
            return false;
        };
        if record.vote != p.requested {
            self.tally.bump(p.requested, -1);
            self.tally.bump(record.vote, 1);
        }
        self.existing = Some(ExistingVote { kind: record.vote, id: Some(record.id.clone()) });
        true
    }

    /// Undoes the provisional delta and restores the previous vote.
    pub fn revert(&mut self, correlation_id: Uuid) -> bool {
        let Some(p) = self.take_pending(correlation_id) else {
            return false;
        };
        self.tally.bump(p.requested, -1);
        if let Some(prev) = &p.previous {
            self.tally.bump(prev.kind, 1);
        }
        self.existing = p.previous;
        true
    }

    fn take_pending(&mut self, correlation_id: Uuid) -> Option<Provisional> {
        match &self.pending {
            Some(p) if p.correlation_id == correlation_id => self.pending.take(),
            _ => {
                debug!(post_id = %self.post_id, %correlation_id, "ignoring stale vote settlement");
                None
            }
        }
    }
}
