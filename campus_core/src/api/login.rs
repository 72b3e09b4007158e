use serde::{Deserialize, Serialize};

/// The request to log into the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Req {
    /// Who are you?
    pub username: String,

    /// Plaintext password to use for login.
    pub password: String,
}

/// Result of logging in. The server always answers with a 200; only the
/// presence of `role` tells success from failure.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Resp {
    /// The permission level of the account, if the credentials were good.
    #[serde(default)]
    pub role: Option<String>,

    /// Whatever the server said about it.
    #[serde(default)]
    pub message: Option<String>,
}

/// Where the login endpoint lives.
pub const PATH: &str = "/login";
