//! The explicit context handed to every page and component.

use std::sync::Arc;

use askama::Template;
use rc_core::error::{AppError, Result};
use rc_core::session::{SessionContext, SessionProvider};
use rc_core::traits::{DataGateway, ObjectStore};

/// Shared handles for one running client. Cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<dyn DataGateway>,
    pub store: Arc<dyn ObjectStore>,
    /// Read-only view of the session.
    pub session: SessionContext,
    /// The session owner; only sign-in/sign-up/sign-out go through it.
    pub auth: Arc<SessionProvider>,
}

impl AppContext {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        store: Arc<dyn ObjectStore>,
        auth: Arc<SessionProvider>,
    ) -> Self {
        Self {
            gateway,
            store,
            session: auth.context(),
            auth,
        }
    }
}

/// Renders a template, folding askama failures into `AppError`.
pub(crate) fn render<T: Template>(template: &T) -> Result<String> {
    template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))
}
