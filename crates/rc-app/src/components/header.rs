//! Top bar: home, create-post and account actions.

use rc_core::error::Result;
use rc_ui::HeaderTemplate;

use crate::context::{render, AppContext};

pub struct Header;

impl Header {
    pub fn render(ctx: &AppContext) -> Result<String> {
        let username = ctx.session.username();
        render(&HeaderTemplate { username: username.as_deref() })
    }

    pub async fn sign_out(ctx: &AppContext) -> Result<()> {
        ctx.auth.sign_out().await
    }
}
