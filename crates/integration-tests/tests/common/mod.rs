//! Shared fixtures for the scenario tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rc_app::AppContext;
use rc_core::models::{Comment, Connection, Post, SessionTokens, SessionUser, Vote, VoteKind};
use rc_core::session::SessionProvider;
use rc_core::traits::{MockAuthProvider, MockDataGateway, MockObjectStore};

pub const POST_ID: &str = "post-1";

pub fn user(name: &str) -> SessionUser {
    SessionUser {
        username: name.to_string(),
        email: Some(format!("{name}@example.com")),
        tokens: SessionTokens {
            id_token: format!("id-{name}"),
            access_token: format!("access-{name}"),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        },
    }
}

pub fn vote(id: &str, owner: &str, kind: VoteKind) -> Vote {
    Vote { id: id.into(), post_id: POST_ID.into(), owner: owner.into(), vote: kind }
}

pub fn comment(id: &str, content: &str, created_at: DateTime<Utc>) -> Comment {
    Comment {
        id: id.into(),
        post_id: POST_ID.into(),
        owner: "commenter".into(),
        content: content.into(),
        created_at,
    }
}

pub fn post(id: &str, title: &str, votes: Vec<Vote>) -> Post {
    Post {
        id: id.into(),
        owner: "author".into(),
        title: title.into(),
        contents: "Body text".into(),
        image: None,
        created_at: Utc::now() - Duration::hours(3),
        comments: Connection::default(),
        votes: Connection { items: votes, next_token: None },
    }
}

/// An auth mock that accepts any password sign-in.
pub fn permissive_auth() -> MockAuthProvider {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_in().returning(|name, _| Ok(user(name)));
    auth.expect_sign_out().returning(|_| Ok(()));
    auth
}

pub fn context(gateway: MockDataGateway, store: MockObjectStore, auth: MockAuthProvider) -> AppContext {
    let provider = Arc::new(SessionProvider::new(Arc::new(auth)));
    AppContext::new(Arc::new(gateway), Arc::new(store), provider)
}

/// A context already signed in as `name`.
pub async fn signed_in(gateway: MockDataGateway, store: MockObjectStore, name: &str) -> AppContext {
    let ctx = context(gateway, store, permissive_auth());
    ctx.auth.sign_in(name, "password1").await.expect("sign in");
    ctx
}
