use campus_core::{api::client::DEFAULT_SERVER, handlers::EmptyRolePolicy};
use clap::Parser;
use std::{num::ParseIntError, path::PathBuf, time::Duration};

/// A terminal client for the campus portal
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Config {
    /// Where should we store the session and logs?
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// The portal's authentication service
    #[clap(long, env = "CAMPUS_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Treat an empty role from the server as a successful login
    #[clap(long)]
    pub accept_empty_role: bool,

    /// Give up on a request after this many seconds
    #[clap(long, env = "CAMPUS_REQUEST_TIMEOUT", default_value = "10", value_parser = duration_parser)]
    pub request_timeout: Duration,
}

fn duration_parser(s: &str) -> Result<Duration, ParseIntError> {
    s.parse().map(Duration::from_secs)
}

impl Config {
    /// Get either the configured or a default data directory. If no data
    /// directory can be found (e.g. because `$HOME` is unset) we will use the
    /// current directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("edu", "campus", "campus")
                    .map(|dirs| dirs.data_local_dir().to_owned())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Where the session role is kept between runs
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    /// How to treat empty roles
    pub fn empty_role_policy(&self) -> EmptyRolePolicy {
        if self.accept_empty_role {
            EmptyRolePolicy::Accept
        } else {
            EmptyRolePolicy::Reject
        }
    }
}
