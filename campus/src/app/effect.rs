use super::Action;
use crate::config::Config;
use campus_core::{
    api::{self, login, records, recover, register},
    session::{self, stored_role, FileStorage, Storage, ROLE_KEY},
    Client, LoginHandler, RegistrationHandler,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What we show when the session ended here but the server didn't confirm it.
pub const UNCONFIRMED_LOGOUT_MESSAGE: &str =
    "Logged out on this device, but the server didn't confirm it";

/// Connections to external services that effects use. We keep these around
/// to share connections (and the session cookie) across the app as a whole.
pub struct EffectContext {
    /// an HTTP client with reqwest
    http: reqwest::Client,

    /// Where the portal lives
    client: Client,

    /// Logs in and stores the role
    login: LoginHandler<FileStorage>,

    /// Creates accounts
    register: RegistrationHandler,
}

impl EffectContext {
    /// Set up connections and open the session storage.
    ///
    /// ## Errors
    ///
    /// If the HTTP client can't be built or the session file can't be read.
    pub async fn new(config: &Config) -> Result<Self, Problem> {
        let http = api::Client::http(config.request_timeout)?;
        let client = Client::new(config.server.clone());
        let storage = Arc::new(Mutex::new(FileStorage::open(config.session_path()).await?));

        Ok(Self {
            login: LoginHandler::new(client.clone(), http.clone(), storage)
                .with_policy(config.empty_role_policy()),
            register: RegistrationHandler::new(client.clone(), http.clone()),
            http,
            client,
        })
    }

    /// The storage shared with the login handler
    fn storage(&self) -> &Arc<Mutex<FileStorage>> {
        self.login.storage()
    }
}

/// Things that can happen as a result of user input. Side effects!
#[derive(Debug)]
pub enum Effect {
    /// Log in to an existing account
    LogIn(login::Req),

    /// Register a new account
    Register(register::Req),

    /// Get a captcha for the recovery form
    FetchCaptcha,

    /// Reset a password or username
    Recover(recover::Req),

    /// Read the stored role and load the records it can see
    LoadDashboard,

    /// Add a record (faculty only)
    AddRecord(records::Record),

    /// Forget the stored role and end the server session
    LogOut,
}

impl Effect {
    /// Perform the side-effectful portions of this effect, returning the next
    /// `Action` the application needs to handle
    pub async fn run(self, conn: &EffectContext) -> Option<Action> {
        match self.run_inner(conn).await {
            Ok(action) => action,
            Err(problem) => {
                tracing::error!(?problem, "problem running effect");
                Some(Action::Problem(problem.to_string()))
            }
        }
    }

    /// The actual implementation of `run`, but with a `Result` wrapper to make
    /// it more ergonomic to write.
    async fn run_inner(self, conn: &EffectContext) -> Result<Option<Action>, Problem> {
        match self {
            Self::LogIn(req) => {
                let outcome = conn.login.login(&req).await;

                Ok(Some(Action::LoginFinished(outcome)))
            }

            Self::Register(req) => {
                let outcome = conn.register.register(&req).await;

                Ok(Some(Action::Registered(outcome)))
            }

            Self::FetchCaptcha => {
                tracing::info!("fetching captcha");

                let resp = conn.client.captcha(&conn.http).await?;

                Ok(Some(Action::GotCaptcha(resp.captcha)))
            }

            Self::Recover(req) => {
                tracing::info!(kind = %req.kind, username = %req.username, "recovering account");

                let message = match conn.client.recover(&conn.http, &req).await {
                    Ok(resp) => resp.message,
                    Err(api::Error::Client(message)) => message,
                    Err(err) => return Err(err.into()),
                };

                Ok(Some(Action::Recovered(message)))
            }

            Self::LoadDashboard => {
                let role = stored_role(&*conn.storage().lock().await)?;
                tracing::info!(?role, "loading dashboard");

                let records = match &role {
                    Some(role) => conn.client.records(&conn.http, role).await?,
                    None => None,
                };

                Ok(Some(Action::LoadedDashboard { role, records }))
            }

            Self::AddRecord(record) => {
                tracing::info!(subject = %record.subject, "adding record");

                let resp = conn.client.add_record(&conn.http, &record).await?;

                Ok(Some(Action::RecordAdded(resp.message)))
            }

            Self::LogOut => {
                tracing::info!("logging out");

                conn.storage().lock().await.remove_item(ROLE_KEY).await?;

                // The role is gone, so we're logged out here no matter what
                // the server says.
                let message = match conn.client.logout(&conn.http).await {
                    Ok(resp) => resp.message,
                    Err(err) => {
                        tracing::warn!(?err, "server did not confirm logout");
                        UNCONFIRMED_LOGOUT_MESSAGE.to_string()
                    }
                };

                Ok(Some(Action::LoggedOut(message)))
            }
        }
    }
}

/// Problems that can happen while running an `Effect`.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    /// We had a problem reading or writing the session, for example with
    /// permissions or a corrupt file.
    #[error("Problem with the saved session: {0}")]
    Session(#[from] session::Error),

    /// We had a problem communicating with the server, for example because it
    /// was down or sent something unexpected.
    #[error("Problem communicating with the server: {0}")]
    Server(#[from] api::Error),
}
