//! Per-route page controllers.

pub mod create;
pub mod listing;
pub mod post;
pub mod signup;

pub use create::CreatePostPage;
pub use listing::{ListingPage, ListingState};
pub use post::PostPage;
pub use signup::{AuthMode, SignupPage};
