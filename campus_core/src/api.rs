/// Things that can go wrong in the API
pub mod error;
pub use error::Error;

/// The HTTP client
pub mod client;
pub use client::Client;

/// Log in with a username and password
pub mod login;

/// Create a new account
pub mod register;

/// End the server-side session
pub mod logout;

/// Fetch a captcha challenge for account recovery
pub mod captcha;

/// Reset a forgotten password or username
pub mod recover;

/// Academic records shown on the dashboard
pub mod records;

use serde::{Deserialize, Serialize};

/// The server answers most requests with nothing but a message for the user.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MessageResp {
    /// Human-readable result, shown verbatim.
    pub message: String,
}
