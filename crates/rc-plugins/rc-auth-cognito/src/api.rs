//! Request and response bodies of the user-pool JSON API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Clone, Copy)]
pub enum Action {
    SignUp,
    ConfirmSignUp,
    InitiateAuth,
    GlobalSignOut,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::SignUp => "SignUp",
            Action::ConfirmSignUp => "ConfirmSignUp",
            Action::InitiateAuth => "InitiateAuth",
            Action::GlobalSignOut => "GlobalSignOut",
        }
    }

    pub fn target(self) -> String {
        format!("{TARGET_PREFIX}.{}", self.name())
    }
}

#[derive(Serialize)]
pub struct AttributeType<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub user_attributes: Vec<AttributeType<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpResponse {
    #[serde(default)]
    pub user_confirmed: bool,
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDeliveryDetails {
    pub destination: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmSignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub confirmation_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthRequest<'a> {
    pub auth_flow: &'static str,
    pub client_id: &'a str,
    pub auth_parameters: HashMap<&'static str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthResponse {
    pub authentication_result: Option<AuthenticationResult>,
    pub challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub id_token: String,
    pub access_token: String,
    /// Absent on refresh; the previous refresh token stays valid.
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalSignOutRequest<'a> {
    pub access_token: &'a str,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: String,
    #[serde(alias = "Message", default)]
    pub message: String,
}

impl ErrorBody {
    /// Short exception name, without any namespace in front of `#`.
    pub fn short_kind(&self) -> &str {
        self.kind.rsplit('#').next().unwrap_or(&self.kind)
    }
}

/// What is kept on disk between runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedSession {
    pub username: String,
    pub refresh_token: String,
}
