use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// What the user wants to reset.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Set a new password
    Password,

    /// Pick a new username
    Username,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => f.write_str("password"),
            Self::Username => f.write_str("username"),
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "password" => Ok(Self::Password),
            "username" => Ok(Self::Username),
            other => Err(format!("can't reset \"{other}\" (try password or username)")),
        }
    }
}

/// The request to reset a forgotten password or username. The captcha is
/// checked by the server, so we send back both what the user typed and what
/// they were shown.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Req {
    /// What to reset
    #[serde(rename = "type")]
    pub kind: Kind,

    /// Current username
    pub username: String,

    /// Email on the account
    pub email: String,

    /// The new password or username
    #[serde(rename = "newvalue")]
    pub new_value: String,

    /// The new value again
    #[serde(rename = "confirmvalue")]
    pub confirm_value: String,

    /// What the user typed for the captcha
    pub captcha: String,

    /// The captcha the server handed out
    pub captcha_real: String,
}

/// Result of the reset attempt.
pub type Resp = super::MessageResp;

/// Where the recovery endpoint lives.
pub const PATH: &str = "/forgot";
