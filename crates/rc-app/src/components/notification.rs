//! Dismissible error notification.

use rc_core::error::Result;
use rc_ui::NotificationTemplate;

use crate::context::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// A click somewhere outside the notification.
    ClickAway,
    /// The close action on the notification itself.
    Close,
}

#[derive(Debug, Default)]
pub struct Notification {
    message: String,
    open: bool,
}

impl Notification {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.open = true;
    }

    /// Clicking away keeps it open.
    pub fn dismiss(&mut self, reason: DismissReason) {
        if reason == DismissReason::ClickAway {
            return;
        }
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn message(&self) -> Option<&str> {
        self.open.then_some(self.message.as_str())
    }

    pub fn render(&self) -> Result<Option<String>> {
        self.message()
            .map(|message| render(&NotificationTemplate { message }))
            .transpose()
    }
}
