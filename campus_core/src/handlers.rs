/// Log in and remember the role
pub mod login;
pub use login::{EmptyRolePolicy, LoginHandler, LoginOutcome};

/// Register a new account
pub mod register;
pub use register::{RegistrationHandler, RegistrationOutcome};

/// What we show when the server couldn't be reached or sent back something we
/// couldn't make sense of.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, try again";

/// Turn an API error into something to show the user. The server's own words
/// win when it sent any.
fn failure_message(err: &crate::api::Error) -> String {
    match err {
        crate::api::Error::Client(message) => message.clone(),
        _ => NETWORK_ERROR_MESSAGE.to_string(),
    }
}
