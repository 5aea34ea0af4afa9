//! # Shell
//!
//! Text front end. Each input line is one user intent; intents are handled to
//! completion, one at a time, before the next line is read.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use rc_core::error::{AppError, Result};
use rc_core::models::VoteKind;
use rc_core::routes::Route;
use rc_core::validation::Field;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::components::{DismissReason, Header};
use crate::context::AppContext;
use crate::pages::{AuthMode, CreatePostPage, ListingPage, PostPage, SignupPage};

pub const HELP: &str = "\
commands:
  go <route>            navigate to /, /create, /signup or /post/<id>
  open <n>              open the n-th post of the listing
  up [n] | down [n]     vote on the n-th post (or the open post)
  set <field> <text>    fill a form input (title, content, comment, username,
                        email, password, confirm, code)
  image <path>          attach an image to the new post
  remove-image          drop the attached image
  submit                submit the current form
  mode <m>              login | register | verify | reset
  forgot | toggle       sign-up form links
  dismiss               close the notification
  refresh               reload the listing
  logout                sign out
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(Route),
    Open(usize),
    Vote { position: Option<usize>, kind: VoteKind },
    Set { field: Field, value: String },
    Image(PathBuf),
    RemoveImage,
    Submit,
    Mode(AuthMode),
    Forgot,
    Toggle,
    Dismiss,
    Refresh,
    Logout,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').map_or((line, ""), |(v, r)| (v, r.trim()));
        let position = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| AppError::Internal(format!("expected a post number, got `{s}`")))
        };
        let cmd = match verb {
            "go" => Command::Go(rest.parse()?),
            "open" => Command::Open(position(rest)?),
            "up" | "down" => Command::Vote {
                position: if rest.is_empty() { None } else { Some(position(rest)?) },
                kind: verb.parse()?,
            },
            "set" => {
                let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
                Command::Set { field: field.parse()?, value: value.to_string() }
            }
            "image" if !rest.is_empty() => Command::Image(PathBuf::from(rest)),
            "remove-image" => Command::RemoveImage,
            "submit" => Command::Submit,
            "mode" => Command::Mode(rest.parse()?),
            "forgot" => Command::Forgot,
            "toggle" => Command::Toggle,
            "dismiss" => Command::Dismiss,
            "refresh" => Command::Refresh,
            "logout" => Command::Logout,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(AppError::Internal(format!("unknown command `{line}`, try `help`"))),
        };
        Ok(cmd)
    }
}

pub enum Page {
    Listing(ListingPage),
    Post(Box<PostPage>),
    Create(CreatePostPage),
    Signup(SignupPage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    ctx: AppContext,
    page: Page,
    seen_user: Option<String>,
}

impl Shell {
    /// Opens the listing page.
    pub async fn start(ctx: AppContext) -> Self {
        let page = Page::Listing(ListingPage::load(&ctx).await);
        let seen_user = ctx.session.username();
        Self { ctx, page, seen_user }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn navigate(&mut self, route: &Route) -> Result<()> {
        info!(%route, "navigate");
        self.page = match route {
            Route::Home => Page::Listing(ListingPage::load(&self.ctx).await),
            Route::Create => Page::Create(CreatePostPage::default()),
            Route::Signup => Page::Signup(SignupPage::default()),
            Route::Post(id) => Page::Post(Box::new(PostPage::load(&self.ctx, id).await?)),
        };
        Ok(())
    }

    pub async fn handle(&mut self, cmd: Command) -> Result<Flow> {
        debug!(?cmd, "handle");
        let ctx = &self.ctx;
        let mut goto = None;
        match (&mut self.page, cmd) {
            (_, Command::Quit) => return Ok(Flow::Quit),
            (_, Command::Help) => {}
            (_, Command::Go(route)) => goto = Some(route),
            (_, Command::Logout) => Header::sign_out(ctx).await?,

            (Page::Listing(page), Command::Open(n)) => goto = Some(Route::Post(page.post_id(n)?)),
            (Page::Listing(page), Command::Vote { position: Some(n), kind }) => page.vote(ctx, n, kind).await?,
            (Page::Listing(page), Command::Refresh) => page.refresh(ctx).await,

            (Page::Post(page), Command::Vote { position: None, kind }) => page.vote(ctx, kind).await?,
            (Page::Post(page), Command::Set { field: Field::Comment, value }) => page.set_draft(value),
            (Page::Post(page), Command::Submit) => page.submit_comment(ctx).await?,

            (Page::Create(page), Command::Set { field: Field::Title, value }) => page.set_title(value),
            (Page::Create(page), Command::Set { field: Field::Content, value }) => page.set_content(value),
            (Page::Create(page), Command::Image(path)) => page.pick_image(&path).await?,
            (Page::Create(page), Command::RemoveImage) => page.dropzone_mut().remove(),
            (Page::Create(page), Command::Submit) => goto = Some(page.submit(ctx).await?),

            (Page::Signup(page), Command::Set { field, value }) => page.set_field(field, value)?,
            (Page::Signup(page), Command::Mode(mode)) => page.set_mode(mode),
            (Page::Signup(page), Command::Forgot) => page.forgot_password(),
            (Page::Signup(page), Command::Toggle) => page.toggle(),
            (Page::Signup(page), Command::Dismiss) => page.dismiss(DismissReason::Close),
            (Page::Signup(page), Command::Submit) => goto = page.submit(ctx).await?,

            (_, cmd) => {
                return Err(AppError::Internal(format!("{cmd:?} is not available on this page")));
            }
        }

        self.sync_session();
        if let Some(route) = goto {
            self.navigate(&route).await?;
        }
        Ok(Flow::Continue)
    }

    /// Re-resolves per-user state when the session changed since the last intent.
    fn sync_session(&mut self) {
        let current = self.ctx.session.username();
        if current == self.seen_user {
            return;
        }
        let username = current.as_deref();
        match &mut self.page {
            Page::Listing(page) => page.sync_session(username),
            Page::Post(page) => page.sync_session(username),
            Page::Create(_) | Page::Signup(_) => {}
        }
        self.seen_user = current;
    }

    pub fn render(&self) -> Result<String> {
        let now = Utc::now();
        match &self.page {
            Page::Listing(page) => page.render(&self.ctx, now),
            Page::Post(page) => page.render(&self.ctx, now),
            Page::Create(page) => page.render(&self.ctx),
            Page::Signup(page) => page.render(&self.ctx),
        }
    }

    /// Reads intents line by line until `quit` or end of input.
    pub async fn run<R, W>(mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.write_page(&mut output).await?;
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let outcome = match line.parse::<Command>() {
                Ok(Command::Help) => {
                    output.write_all(format!("{HELP}\n").as_bytes()).await?;
                    continue;
                }
                Ok(cmd) => self.handle(cmd).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    warn!(error = %e, "action failed");
                    output.write_all(format!("error: {e}\n").as_bytes()).await?;
                }
            }
            // A failed sign-out still ends the local session.
            self.sync_session();
            self.write_page(&mut output).await?;
        }
        output.flush().await
    }

    async fn write_page<W: AsyncWrite + Unpin>(&self, output: &mut W) -> std::io::Result<()> {
        let text = self.render().unwrap_or_else(|e| format!("error: {e}"));
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n> ").await?;
        output.flush().await
    }
}
