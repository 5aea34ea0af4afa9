//! Presentational controllers shared between pages.

pub mod dropzone;
pub mod header;
pub mod notification;
pub mod preview;

pub use dropzone::ImageDropzone;
pub use header::Header;
pub use notification::{DismissReason, Notification};
pub use preview::PostPreview;
