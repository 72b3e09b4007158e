use campus_core::{
    api::records::Record,
    handlers::{LoginOutcome, RegistrationOutcome},
};
use crossterm::event::KeyEvent;

/// Things that can happen to this app
#[derive(Debug)]
pub enum Action {
    /// The user did something on the keyboard
    Key(KeyEvent),

    /// Something bad happened; display it to the user
    Problem(String),

    /// A login attempt finished, one way or another
    LoginFinished(LoginOutcome),

    /// A registration attempt finished, one way or another
    Registered(RegistrationOutcome),

    /// We got a captcha to show on the recovery form
    GotCaptcha(String),

    /// The server answered a recovery request
    Recovered(String),

    /// We read the stored role and whatever records it can see
    LoadedDashboard {
        /// The role from the last login
        role: Option<String>,

        /// Records visible to that role, if it has a records view
        records: Option<Vec<Record>>,
    },

    /// The server answered a request to add a record
    RecordAdded(String),

    /// The session is gone
    LoggedOut(String),
}
