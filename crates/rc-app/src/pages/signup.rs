//! Sign-up / sign-in page (`/signup`).
//!
//! One form, four modes. The mode decides which inputs are shown, which are
//! validated and what a submit does. Failures never move the mode back to
//! `Login`.

use std::fmt;
use std::str::FromStr;

use rc_core::error::{AppError, Result};
use rc_core::routes::Route;
use rc_core::validation::{Field, FormErrors, Validator, CODE, EMAIL, PASSWORD, USERNAME};
use rc_ui::{mask, FormField, SignupTemplate};
use tracing::{error, info};

use crate::components::{DismissReason, Header, Notification};
use crate::context::{render, AppContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
    Verify,
    Reset,
}

impl AuthMode {
    fn shows(&self, field: Field) -> bool {
        use AuthMode::*;
        match field {
            Field::Username => *self != Verify,
            Field::Email | Field::ConfirmPassword => *self == Register,
            Field::Password => matches!(self, Login | Register),
            Field::Code => *self == Verify,
            _ => false,
        }
    }

    fn button(&self, loading: bool) -> &'static str {
        match (self, loading) {
            (AuthMode::Login, false) => "Login To Your Account",
            (AuthMode::Login, true) => "Logging into your account...",
            (AuthMode::Register, false) => "Create An Account",
            (AuthMode::Register, true) => "Creating Your Account...",
            (AuthMode::Verify, false) => "Confirm your Account",
            (AuthMode::Verify, true) => "Confirming your account...",
            (AuthMode::Reset, false) => "Reset Your Password",
            (AuthMode::Reset, true) => "Resetting Your Password...",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthMode::Login => "login",
            AuthMode::Register => "register",
            AuthMode::Verify => "verify",
            AuthMode::Reset => "reset",
        })
    }
}

impl FromStr for AuthMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "login" => Ok(AuthMode::Login),
            "register" => Ok(AuthMode::Register),
            "verify" => Ok(AuthMode::Verify),
            "reset" => Ok(AuthMode::Reset),
            other => Err(AppError::Internal(format!("unknown auth mode `{other}`"))),
        }
    }
}

#[derive(Default)]
pub struct SignupPage {
    mode: AuthMode,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    code: String,
    errors: FormErrors,
    loading: bool,
    notification: Notification,
}

impl SignupPage {
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.errors = FormErrors::default();
    }

    /// "Forgot password?" link.
    pub fn forgot_password(&mut self) {
        self.set_mode(AuthMode::Reset);
    }

    /// The register/login switch under the form.
    pub fn toggle(&mut self) {
        let next = if self.mode == AuthMode::Register { AuthMode::Login } else { AuthMode::Register };
        self.set_mode(next);
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        let slot = match field {
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
            Field::Code => &mut self.code,
            other => {
                return Err(AppError::Internal(format!(
                    "field `{}` is not part of the sign-up form",
                    other.name()
                )))
            }
        };
        *slot = value.into();
        Ok(())
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn dismiss(&mut self, reason: DismissReason) {
        self.notification.dismiss(reason);
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn validate(&self) -> Result<()> {
        let m = self.mode;
        let mut v = Validator::new();
        if m.shows(Field::Username) {
            v = v.field(Field::Username, &self.username, &USERNAME);
        }
        if m.shows(Field::Email) {
            v = v.field(Field::Email, &self.email, &EMAIL);
        }
        if m.shows(Field::Password) {
            v = v.field(Field::Password, &self.password, &PASSWORD);
        }
        if m.shows(Field::ConfirmPassword) {
            v = v.field(Field::ConfirmPassword, &self.confirm_password, &PASSWORD);
        }
        if m.shows(Field::Code) {
            v = v.field(Field::Code, &self.code, &CODE);
        }
        v.finish()
    }

    /// Runs the current mode's auth operation.
    ///
    /// Returns where to navigate on success, if anywhere. Auth failures are
    /// also shown in the notification.
    pub async fn submit(&mut self, ctx: &AppContext) -> Result<Option<Route>> {
        if let Err(e) = self.validate() {
            if let AppError::Validation(errors) = &e {
                self.errors = errors.clone();
            }
            return Err(e);
        }
        self.errors = FormErrors::default();

        self.loading = true;
        let result = self.run(ctx).await;
        self.loading = false;

        if let Err(e) = &result {
            error!(mode = %self.mode, error = %e, "auth operation failed");
            self.notification.show(e.user_message());
        }
        result
    }

    async fn run(&mut self, ctx: &AppContext) -> Result<Option<Route>> {
        match self.mode {
            AuthMode::Login => {
                ctx.auth.sign_in(&self.username, &self.password).await?;
                Ok(Some(Route::Home))
            }
            AuthMode::Register => {
                let outcome = ctx.auth.sign_up(&self.username, &self.password, &self.email).await?;
                info!(
                    username = %self.username,
                    destination = outcome.code_destination.as_deref().unwrap_or("-"),
                    "verification code sent"
                );
                self.mode = AuthMode::Verify;
                Ok(None)
            }
            AuthMode::Verify => {
                ctx.auth.confirm_sign_up(&self.username, &self.code).await?;
                ctx.auth.sign_in(&self.username, &self.password).await?;
                Ok(Some(Route::Home))
            }
            // No reset operation is wired to the auth collaborator.
            AuthMode::Reset => Ok(None),
        }
    }

    pub fn render(&self, ctx: &AppContext) -> Result<String> {
        let header = Header::render(ctx)?;
        let inputs: [(Field, &str, String, Option<&str>); 5] = [
            (Field::Username, "Username", self.username.clone(), None),
            (Field::Email, "Email", self.email.clone(), None),
            (Field::Password, "Password", mask(&self.password), None),
            (Field::ConfirmPassword, "Confirm Password", mask(&self.confirm_password), None),
            (
                Field::Code,
                "Verification Code",
                self.code.clone(),
                Some("Enter the verification code sent to your email."),
            ),
        ];
        let fields = inputs
            .into_iter()
            .filter(|(field, ..)| self.mode.shows(*field))
            .map(|(field, label, value, hint)| {
                let error = self.errors.get(field);
                FormField { label, value, error, hint: if error.is_some() { None } else { hint } }
            })
            .collect();
        let toggle = if self.mode == AuthMode::Register {
            "Already have an account? Log in"
        } else {
            "Don't have an account? Sign Up"
        };
        let mode = self.mode.to_string();
        let notification = self.notification.render()?;
        render(&SignupTemplate {
            header: &header,
            mode: &mode,
            fields,
            button: self.mode.button(self.loading),
            toggle,
            notification: notification.as_deref(),
        })
    }
}
