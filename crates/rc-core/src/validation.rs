//! # Form Validation
//!
//! Field rules checked before any submission. A failing form never reaches
//! the network; errors are reported per field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Content,
    Comment,
    Username,
    Email,
    Password,
    ConfirmPassword,
    Code,
    Image,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Content => "content",
            Field::Comment => "comment",
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm",
            Field::Code => "code",
            Field::Image => "image",
        }
    }
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "title" => Field::Title,
            "content" => Field::Content,
            "comment" => Field::Comment,
            "username" => Field::Username,
            "email" => Field::Email,
            "password" => Field::Password,
            "confirm" | "confirm-password" => Field::ConfirmPassword,
            "code" => Field::Code,
            "image" => Field::Image,
            other => return Err(AppError::Internal(format!("unknown field `{other}`"))),
        })
    }
}

/// Length constraints for a single input, with the message shown on failure.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub required: &'static str,
    pub min: Option<(usize, &'static str)>,
    pub max: Option<(usize, &'static str)>,
}

impl Rule {
    /// Returns the first violated message, if any. Lengths count characters.
    pub fn check(&self, value: &str) -> Option<&'static str> {
        if value.is_empty() {
            return Some(self.required);
        }
        let len = value.chars().count();
        if let Some((min, msg)) = self.min {
            if len < min {
                return Some(msg);
            }
        }
        if let Some((max, msg)) = self.max {
            if len > max {
                return Some(msg);
            }
        }
        None
    }
}

pub const TITLE_MAX: usize = 120;
pub const CONTENT_MAX: usize = 1000;
pub const COMMENT_MAX: usize = 240;

pub const TITLE: Rule = Rule {
    required: "Please enter a title.",
    min: None,
    max: Some((TITLE_MAX, "Please enter a title that is 120 characters or less.")),
};

pub const CONTENT: Rule = Rule {
    required: "Please enter some content for your post.",
    min: None,
    max: Some((CONTENT_MAX, "Please make sure your content is 1000 characters or less.")),
};

pub const COMMENT: Rule = Rule {
    required: "Please enter a comment.",
    min: None,
    max: Some((COMMENT_MAX, "Please enter a comment under 240 characters.")),
};

pub const USERNAME: Rule = Rule {
    required: "Please enter a username.",
    min: Some((3, "Please enter a username between 3-16 characters.")),
    max: Some((16, "Please enter a username between 3-16 characters.")),
};

pub const EMAIL: Rule = Rule {
    required: "Please enter a valid email.",
    min: None,
    max: None,
};

pub const PASSWORD: Rule = Rule {
    required: "Please enter a password.",
    min: Some((8, "Please enter a stronger password.")),
    max: None,
};

pub const CODE: Rule = Rule {
    required: "Adding a valid code is required.",
    min: Some((6, "Your verification should be 6 characters long.")),
    max: Some((6, "Your verification should be 6 characters long.")),
};

/// Field-level errors collected from one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.0.insert(field, message.into());
        errors
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.name(), msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Accumulates rule checks for one form.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FormErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field, value: &str, rule: &Rule) -> Self {
        if let Some(msg) = rule.check(value) {
            self.errors.0.insert(field, msg.to_string());
        }
        self
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Title and content of the create-post form.
pub fn validate_post(title: &str, content: &str) -> Result<()> {
    Validator::new()
        .field(Field::Title, title, &TITLE)
        .field(Field::Content, content, &CONTENT)
        .finish()
}

pub fn validate_comment(content: &str) -> Result<()> {
    Validator::new().field(Field::Comment, content, &COMMENT).finish()
}
