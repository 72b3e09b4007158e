use crate::api::{self, register, Client};

/// How a registration attempt turned out. The client can't tell success from
/// failure; only the server's message says which it was.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// The server answered. Show this verbatim.
    Message(String),

    /// We couldn't complete the request at all.
    Failed(api::Error),
}

impl RegistrationOutcome {
    /// What to show the user.
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Failed(err) => super::failure_message(err),
        }
    }
}

/// Registers new accounts.
#[derive(Debug, Clone)]
pub struct RegistrationHandler {
    /// Where to send requests
    client: Client,

    /// Connection pool to send them with
    http: reqwest::Client,
}

impl RegistrationHandler {
    /// Create a new handler
    pub fn new(client: Client, http: reqwest::Client) -> Self {
        Self { client, http }
    }

    /// Send the registration to the server and report what it said.
    #[tracing::instrument(skip(self, req), fields(username = %req.username, role = %req.role))]
    pub async fn register(&self, req: &register::Req) -> RegistrationOutcome {
        tracing::info!("registering");

        match self.client.register(&self.http, req).await {
            Ok(resp) => RegistrationOutcome::Message(resp.message),
            Err(api::Error::Client(message)) => RegistrationOutcome::Message(message),
            Err(err) => {
                tracing::warn!(?err, "registration request failed");
                RegistrationOutcome::Failed(err)
            }
        }
    }
}
