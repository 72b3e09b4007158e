use serde::{Deserialize, Serialize};

/// The request to register a new account.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Req {
    /// Username to log in with later.
    pub username: String,

    /// Plaintext password to use for login.
    pub password: String,

    /// Permission level to request, e.g. `student` or `faculty`.
    pub role: String,

    /// Display name. Left out of the request entirely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,

    /// Contact address. Left out of the request entirely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Result of registering: just a message, whether it worked or not.
pub type Resp = super::MessageResp;

/// Where the register endpoint lives.
pub const PATH: &str = "/register";
