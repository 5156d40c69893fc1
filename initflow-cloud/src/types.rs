//! Shared types for workspace key operations.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Answer to a successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Short-lived bearer token, used to register this device.
    pub token: String,
    pub user: LoginUser,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"***")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

/// A workspace as reported by the backend.
///
/// `key_initialized` is set server-side once a wrapped key exists. It is an
/// idempotency hint, not a security boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub key_initialized: bool,
    #[serde(default)]
    pub role: String,
}

/// Body of a wrapped-key upload, and of the wrapped-key fetch response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKeyPayload {
    /// Standard base64 of `ephemeral_pk || nonce || ciphertext+tag`.
    pub wrapped_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkspaceList {
    pub workspaces: Vec<Workspace>,
}
