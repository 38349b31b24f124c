use serde::{Deserialize, Serialize};

/// Profile kept for the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SignInWithPasswordRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "returnSecureToken")]
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SignInWithPasswordResponse {
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "localId", default)]
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "profilePicture", default)]
    pub profile_picture: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub registered: Option<bool>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct SignUpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "returnSecureToken")]
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SignUpResponse {
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "localId", default)]
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SendOobCodeRequest {
    #[serde(rename = "requestType")]
    pub request_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "idToken", skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SendOobCodeResponse {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ResetPasswordRequest {
    #[serde(rename = "oobCode")]
    pub oob_code: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ResetPasswordResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "requestType", default)]
    pub request_type: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct UpdateAccountRequest {
    #[serde(rename = "idToken", skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(rename = "oobCode", skip_serializing_if = "Option::is_none")]
    pub oob_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "returnSecureToken", skip_serializing_if = "Option::is_none")]
    pub return_secure_token: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct UpdateAccountResponse {
    #[serde(rename = "localId", default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: Option<bool>,
    #[serde(rename = "idToken", default)]
    pub id_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct DeleteAccountRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshTokenRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub expires_in: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
