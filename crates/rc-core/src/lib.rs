//! redclone/crates/rc-core/src/lib.rs
//!
//! The central domain logic and interface definitions for the redclone client.

pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod traits;
pub mod validation;
pub mod votes;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use routes::Route;
pub use session::{SessionContext, SessionProvider};
pub use traits::*;

use chrono::{DateTime, Utc};

/// Whole hours elapsed since `created_at`, as shown next to posts and comments.
pub fn hours_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_hours().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_post_deserializes_from_wire_shape() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "owner": "alice",
            "title": "Hello",
            "contents": "World",
            "image": null,
            "createdAt": "2024-01-02T03:04:05.000Z",
            "comments": { "items": [] },
            "votes": { "items": [
                { "id": "v1", "postID": "p1", "owner": "bob", "vote": "upvote" }
            ], "nextToken": null }
        }))
        .unwrap();
        assert_eq!(post.votes.items[0].vote, VoteKind::Upvote);
        assert!(post.image.is_none());
    }

    #[test]
    fn test_create_post_input_omits_absent_image() {
        let input = CreatePostInput {
            title: "Hello World".into(),
            contents: "First post".into(),
            image: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_hours_since_floors_and_clamps() {
        let now = Utc::now();
        assert_eq!(hours_since(now - Duration::minutes(179), now), 2);
        assert_eq!(hours_since(now + Duration::hours(1), now), 0);
    }
}
