use crate::api::{self, login, Client};
use crate::session::{self, Storage, ROLE_KEY};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What we show when the server didn't hand back a role.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid Credentials";

/// Whether a role that is present but empty (`""`) counts as a successful
/// login.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRolePolicy {
    /// An empty role is the same as no role at all.
    #[default]
    Reject,

    /// Any role the server sends, even an empty one, means success.
    Accept,
}

impl EmptyRolePolicy {
    /// Does this policy let `role` through?
    pub fn accepts(self, role: &str) -> bool {
        match self {
            Self::Reject => !role.is_empty(),
            Self::Accept => true,
        }
    }
}

/// How a login attempt turned out.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The credentials were good and the role has been stored. Time to go to
    /// the dashboard.
    LoggedIn {
        /// The role we stored
        role: String,
    },

    /// The server didn't give us a role.
    InvalidCredentials,

    /// We couldn't complete the request at all.
    Failed(api::Error),

    /// The login worked but we couldn't remember the role.
    StorageFailed(session::Error),

    /// A newer login attempt started before this one finished, so this
    /// result was thrown away.
    Superseded,
}

impl LoginOutcome {
    /// What to show the user, if anything. Successful logins navigate away
    /// instead, and superseded attempts say nothing.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::LoggedIn { .. } | Self::Superseded => None,
            Self::InvalidCredentials => Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
            Self::Failed(err) => Some(super::failure_message(err)),
            Self::StorageFailed(err) => Some(format!("Couldn't save your session: {err}")),
        }
    }
}

/// Logs in and stores the resulting role.
///
/// Every call to [`LoginHandler::login`] is numbered when it starts. Only the
/// most recently started attempt may write to storage, so responses arriving
/// out of order can't leave a stale role behind.
#[derive(Debug)]
pub struct LoginHandler<S> {
    /// Where to send requests
    client: Client,

    /// Connection pool (and cookie jar) to send them with
    http: reqwest::Client,

    /// Where the role goes on success
    storage: Arc<Mutex<S>>,

    /// What to do about empty roles
    policy: EmptyRolePolicy,

    /// Number of the most recently started attempt
    latest: AtomicU64,
}

impl<S: Storage> LoginHandler<S> {
    /// Create a handler that stores roles in `storage`.
    pub fn new(client: Client, http: reqwest::Client, storage: Arc<Mutex<S>>) -> Self {
        Self {
            client,
            http,
            storage,
            policy: EmptyRolePolicy::default(),
            latest: AtomicU64::new(0),
        }
    }

    /// Use a different policy for empty roles.
    #[must_use]
    pub fn with_policy(mut self, policy: EmptyRolePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The storage this handler writes to.
    pub fn storage(&self) -> &Arc<Mutex<S>> {
        &self.storage
    }

    /// Send the credentials to the server and interpret the reply.
    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: &login::Req) -> LoginOutcome {
        let attempt = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(attempt, "logging in");

        let resp = match self.client.login(&self.http, req).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(attempt, ?err, "login request failed");
                return self.unless_superseded(attempt, LoginOutcome::Failed(err));
            }
        };

        let Some(role) = resp.role.filter(|role| self.policy.accepts(role)) else {
            tracing::info!(attempt, "server did not return a role");
            return self.unless_superseded(attempt, LoginOutcome::InvalidCredentials);
        };

        // Checked again under the lock so a newer attempt can't slip in
        // between the check and the write.
        let mut storage = self.storage.lock().await;

        if !self.is_latest(attempt) {
            tracing::info!(attempt, "discarding role from superseded login");
            return LoginOutcome::Superseded;
        }

        if let Err(err) = storage.set_item(ROLE_KEY, &role).await {
            tracing::error!(attempt, ?err, "could not store role");
            return LoginOutcome::StorageFailed(err);
        }

        tracing::info!(attempt, role = %role, "logged in");
        LoginOutcome::LoggedIn { role }
    }

    /// Is `attempt` still the newest one?
    fn is_latest(&self, attempt: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == attempt
    }

    /// Pass `outcome` through, unless a newer attempt has started.
    fn unless_superseded(&self, attempt: u64, outcome: LoginOutcome) -> LoginOutcome {
        if self.is_latest(attempt) {
            outcome
        } else {
            LoginOutcome::Superseded
        }
    }
}
