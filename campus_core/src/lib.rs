//! Client-side core of the campus portal: talking to the authentication
//! service and remembering who logged in.

/// Wire types and the HTTP client for the portal's API.
pub mod api;
pub use api::Client;

/// The login and registration flows.
pub mod handlers;
pub use handlers::{LoginHandler, RegistrationHandler};

/// Client-side key/value storage for the session role.
pub mod session;
