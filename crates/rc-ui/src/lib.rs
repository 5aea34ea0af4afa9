//! # rc-ui
//!
//! Presentational components. Each template renders one screen element from
//! already-computed values; controllers in `rc-app` decide what goes in.

use askama::Template;
use rc_core::models::ImageFile;

/// Characters of post content shown in a preview.
pub const EXCERPT_LEN: usize = 120;

#[derive(Template)]
#[template(path = "header.txt")]
pub struct HeaderTemplate<'a> {
    pub username: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "post_preview.txt")]
pub struct PostPreviewTemplate<'a> {
    /// Position in the listing, used to target `open <n>` / `up <n>`.
    pub index: Option<usize>,
    pub owner: &'a str,
    pub hours_ago: i64,
    pub title: &'a str,
    pub excerpt: &'a str,
    pub score: i64,
    pub up_marker: &'a str,
    pub down_marker: &'a str,
    pub image_url: Option<&'a str>,
    pub pending: bool,
}

#[derive(Template)]
#[template(path = "comment.txt")]
pub struct PostCommentTemplate<'a> {
    pub owner: &'a str,
    pub hours_ago: i64,
    pub content: &'a str,
}

#[derive(Template)]
#[template(path = "dropzone.txt")]
pub struct ImageDropzoneTemplate<'a> {
    pub file: Option<&'a ImageFile>,
}

#[derive(Template)]
#[template(path = "notification.txt")]
pub struct NotificationTemplate<'a> {
    pub message: &'a str,
}

#[derive(Template)]
#[template(path = "home.txt")]
pub struct HomeTemplate<'a> {
    pub header: &'a str,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub posts: &'a [String],
}

#[derive(Template)]
#[template(path = "post.txt")]
pub struct PostPageTemplate<'a> {
    pub header: &'a str,
    pub preview: &'a str,
    pub draft: &'a str,
    pub comment_error: Option<&'a str>,
    pub loading: bool,
    pub comments: &'a [String],
}

#[derive(Template)]
#[template(path = "create.txt")]
pub struct CreatePostTemplate<'a> {
    pub header: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub title_error: Option<&'a str>,
    pub content_error: Option<&'a str>,
    pub dropzone: &'a str,
    pub loading: bool,
}

/// One visible input of the sign-up form.
pub struct FormField<'a> {
    pub label: &'a str,
    pub value: String,
    pub error: Option<&'a str>,
    pub hint: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "signup.txt")]
pub struct SignupTemplate<'a> {
    pub header: &'a str,
    pub mode: &'a str,
    pub fields: Vec<FormField<'a>>,
    pub button: &'a str,
    pub toggle: &'a str,
    pub notification: Option<&'a str>,
}

/// First `EXCERPT_LEN` characters of `contents`, with an ellipsis when cut.
pub fn excerpt(contents: &str) -> String {
    let mut chars = contents.chars();
    let head: String = chars.by_ref().take(EXCERPT_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Hides a secret input behind one mark per character.
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}
