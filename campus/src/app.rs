/// Things that can happen to this app
mod action;
pub use action::Action;

/// The records screen users land on after logging in
mod dashboard;
use dashboard::Dashboard;

/// Side effects the app asks for
mod effect;
pub use effect::{Effect, EffectContext};

/// Text input forms
pub mod form;
use form::{Field, Form};

use crate::form_fields;
use campus_core::{
    api::{login, records::Record, recover, register},
    handlers::LoginOutcome,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::Paragraph, Frame};
use std::{mem, process::ExitCode};

form_fields!(LoginField {
    Username("Username", false),
    Password("Password", true),
});

form_fields!(RegisterField {
    FullName("Full name", false),
    Username("Username", false),
    Email("Email", false),
    Password("Password", true),
    Role("Role", false),
});

form_fields!(RecoverField {
    Kind("Reset (password or username)", false),
    Username("Username", false),
    Email("Email", false),
    NewValue("New value", true),
    Confirm("Confirm new value", true),
    Captcha("Captcha", false),
});

form_fields!(RecordField {
    Username("Student username", false),
    Semester("Semester", false),
    Subject("Subject", false),
    Marks("Marks", false),
    Attendance("Attendance (%)", false),
});

/// The "functional core" of the app.
pub struct App {
    /// Messages for the user (visible at the bottom of the screen)
    status_line: Option<String>,

    /// What the user is looking at
    screen: Screen,
}

impl App {
    /// Create a new instance of the app, starting at the login form
    pub fn new() -> Self {
        Self {
            status_line: None,
            screen: Screen::login(),
        }
    }

    /// Render the app's UI to the screen
    pub fn render(&mut self, frame: &mut Frame) {
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);
        let [body_area, status_area, hints_area] = vertical.areas(frame.area());

        match &mut self.screen {
            Screen::Login(form) => form.render(None, body_area, frame),
            Screen::Register(form) => form.render(None, body_area, frame),
            Screen::Recover { form, captcha } => form.render(
                Some(captcha.as_deref().unwrap_or("fetching captcha…")),
                body_area,
                frame,
            ),
            Screen::Dashboard(dashboard) => dashboard.render(frame, body_area),
            Screen::AddRecord { form, .. } => form.render(None, body_area, frame),
            Screen::Exiting(_) => frame.render_widget(Paragraph::new("Exiting…"), body_area),
        }

        let status = Paragraph::new(self.status_line.as_deref().unwrap_or(""));
        frame.render_widget(status, status_area);

        let hints = Paragraph::new(self.screen.hints()).fg(Color::DarkGray);
        frame.render_widget(hints, hints_area);
    }

    /// Handle an `Action`, updating the app's state and producing some side effect(s)
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Key(key) => self.handle_key(key),

            Action::Problem(problem) => {
                self.status_line = Some(problem);

                // A failed load won't send `LoadedDashboard`, so stop waiting.
                if let Screen::Dashboard(dashboard) = &mut self.screen {
                    dashboard.loading = false;
                }

                vec![]
            }

            Action::LoginFinished(outcome) => {
                if let LoginOutcome::LoggedIn { role } = &outcome {
                    self.status_line = Some(format!("Logged in as {role}"));
                    self.screen = Screen::Dashboard(Dashboard::loading(Some(role.clone())));

                    vec![Effect::LoadDashboard]
                } else {
                    if let Some(message) = outcome.message() {
                        self.status_line = Some(message);
                    }

                    vec![]
                }
            }

            Action::Registered(outcome) => {
                self.status_line = Some(outcome.message());

                vec![]
            }

            Action::GotCaptcha(code) => {
                if let Screen::Recover { captcha, .. } = &mut self.screen {
                    *captcha = Some(code);
                }

                vec![]
            }

            Action::Recovered(message) | Action::RecordAdded(message) => {
                let reload = matches!(self.screen, Screen::Dashboard(_));
                self.status_line = Some(message);

                if reload {
                    vec![Effect::LoadDashboard]
                } else {
                    vec![]
                }
            }

            Action::LoadedDashboard { role, records } => {
                if let Screen::Dashboard(dashboard) = &mut self.screen {
                    dashboard.loaded(role, records);
                }

                vec![]
            }

            Action::LoggedOut(message) => {
                self.status_line = Some(message);
                self.screen = Screen::login();

                vec![]
            }
        }
    }

    /// Handle a key press on whatever screen we're on
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return vec![];
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.screen = Screen::Exiting(ExitCode::SUCCESS);
            return vec![];
        }

        match &mut self.screen {
            Screen::Login(form) => match key.code {
                KeyCode::Enter => {
                    self.status_line = Some("Logging in…".to_string());

                    vec![Effect::LogIn(login::Req {
                        username: form.value(LoginField::Username).to_string(),
                        password: form.value(LoginField::Password).to_string(),
                    })]
                }
                KeyCode::Esc => {
                    self.screen = Screen::Exiting(ExitCode::SUCCESS);
                    vec![]
                }
                KeyCode::F(2) => {
                    self.status_line = None;
                    self.screen = Screen::Register(
                        Form::new("Register").with_value(RegisterField::Role, "student"),
                    );
                    vec![]
                }
                KeyCode::F(3) => {
                    self.status_line = None;
                    self.screen = Screen::recover();
                    vec![Effect::FetchCaptcha]
                }
                _ => {
                    form.handle_event(key);
                    vec![]
                }
            },

            Screen::Register(form) => match key.code {
                KeyCode::Enter => {
                    self.status_line = Some("Registering…".to_string());

                    vec![Effect::Register(register::Req {
                        username: form.value(RegisterField::Username).to_string(),
                        password: form.value(RegisterField::Password).to_string(),
                        role: form.value(RegisterField::Role).to_string(),
                        fullname: form.optional(RegisterField::FullName),
                        email: form.optional(RegisterField::Email),
                    })]
                }
                KeyCode::Esc => {
                    self.screen = Screen::login();
                    vec![]
                }
                _ => {
                    form.handle_event(key);
                    vec![]
                }
            },

            Screen::Recover { form, captcha } => match key.code {
                KeyCode::Enter => {
                    let Some(captcha_real) = captcha.clone() else {
                        self.status_line = Some("Still waiting for a captcha".to_string());
                        return vec![];
                    };

                    match form.value(RecoverField::Kind).parse::<recover::Kind>() {
                        Ok(kind) => {
                            self.status_line = Some("Sending…".to_string());

                            vec![Effect::Recover(recover::Req {
                                kind,
                                username: form.value(RecoverField::Username).to_string(),
                                email: form.value(RecoverField::Email).to_string(),
                                new_value: form.value(RecoverField::NewValue).to_string(),
                                confirm_value: form.value(RecoverField::Confirm).to_string(),
                                captcha: form.value(RecoverField::Captcha).to_string(),
                                captcha_real,
                            })]
                        }
                        Err(problem) => {
                            self.status_line = Some(problem);
                            vec![]
                        }
                    }
                }
                KeyCode::F(5) => {
                    *captcha = None;
                    vec![Effect::FetchCaptcha]
                }
                KeyCode::Esc => {
                    self.screen = Screen::login();
                    vec![]
                }
                _ => {
                    form.handle_event(key);
                    vec![]
                }
            },

            Screen::Dashboard(dashboard) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.screen = Screen::Exiting(ExitCode::SUCCESS);
                    vec![]
                }
                KeyCode::Char('r') => {
                    dashboard.loading = true;
                    vec![Effect::LoadDashboard]
                }
                KeyCode::Char('a') if dashboard.can_add_records() => {
                    let dashboard = mem::take(dashboard);
                    self.screen = Screen::AddRecord {
                        form: Form::new("Add record"),
                        dashboard,
                    };
                    vec![]
                }
                KeyCode::Char('l') => vec![Effect::LogOut],
                KeyCode::Char('j') | KeyCode::Down => {
                    dashboard.select_next();
                    vec![]
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    dashboard.select_previous();
                    vec![]
                }
                _ => vec![],
            },

            Screen::AddRecord { form, dashboard } => match key.code {
                KeyCode::Enter => match record_from(form) {
                    Ok(record) => {
                        self.status_line = Some("Adding record…".to_string());
                        self.screen = Screen::Dashboard(mem::take(dashboard));

                        vec![Effect::AddRecord(record)]
                    }
                    Err(problem) => {
                        self.status_line = Some(problem);
                        vec![]
                    }
                },
                KeyCode::Esc => {
                    self.screen = Screen::Dashboard(mem::take(dashboard));
                    vec![]
                }
                _ => {
                    form.handle_event(key);
                    vec![]
                }
            },

            Screen::Exiting(_) => vec![],
        }
    }

    /// Let the TUI manager know whether we're all wrapped up and can exit.
    pub fn should_exit(&self) -> Option<ExitCode> {
        if let Screen::Exiting(code) = &self.screen {
            Some(*code)
        } else {
            None
        }
    }
}

/// Read a record out of the add-record form, complaining about fields that
/// should be numbers but aren't.
fn record_from(form: &Form<RecordField>) -> Result<Record, String> {
    let number = |field: RecordField| {
        form.value(field)
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{} must be a whole number", field.label()))
    };

    Ok(Record {
        username: Some(form.value(RecordField::Username).to_string()),
        semester: number(RecordField::Semester)?,
        subject: form.value(RecordField::Subject).to_string(),
        marks: number(RecordField::Marks)?,
        attendance: number(RecordField::Attendance)?,
    })
}

/// What the user is looking at
#[derive(Debug)]
enum Screen {
    /// Entering credentials
    Login(Form<LoginField>),

    /// Creating an account
    Register(Form<RegisterField>),

    /// Resetting a forgotten password or username
    Recover {
        /// The recovery form
        form: Form<RecoverField>,

        /// The captcha the server handed out, once it arrives
        captcha: Option<String>,
    },

    /// Logged in and looking at records
    Dashboard(Dashboard),

    /// Faculty adding a record. We hold on to the dashboard to go back to.
    AddRecord {
        /// The record form
        form: Form<RecordField>,

        /// Where we came from
        dashboard: Dashboard,
    },

    /// We're done and want the following exit code after final effects
    Exiting(ExitCode),
}

impl Screen {
    /// A blank login form
    fn login() -> Self {
        Self::Login(Form::new("Log in"))
    }

    /// A blank recovery form, waiting on a captcha
    fn recover() -> Self {
        Self::Recover {
            form: Form::new("Recover account").with_value(RecoverField::Kind, "password"),
            captcha: None,
        }
    }

    /// Keyboard shortcuts that work on this screen
    fn hints(&self) -> &'static str {
        match self {
            Self::Login(_) => "enter: log in · tab: next field · F2: register · F3: forgot? · esc: quit",
            Self::Register(_) | Self::AddRecord { .. } => "enter: submit · tab: next field · esc: back",
            Self::Recover { .. } => "enter: submit · tab: next field · F5: new captcha · esc: back",
            Self::Dashboard(dashboard) if dashboard.can_add_records() => {
                "r: refresh · a: add record · l: log out · q: quit"
            }
            Self::Dashboard(_) => "r: refresh · l: log out · q: quit",
            Self::Exiting(_) => "",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use campus_core::{api, handlers::RegistrationOutcome};

    fn press(code: KeyCode) -> Action {
        Action::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_on_login_sends_credentials() {
        let mut app = App::new();

        type_text(&mut app, "ada");
        app.handle(press(KeyCode::Tab));
        type_text(&mut app, "letmein");

        let effects = app.handle(press(KeyCode::Enter));

        match effects.as_slice() {
            [Effect::LogIn(req)] => {
                assert_eq!(req.username, "ada");
                assert_eq!(req.password, "letmein");
            }
            other => panic!("expected a login, got {other:?}"),
        }
    }

    #[test]
    fn successful_login_goes_to_dashboard() {
        let mut app = App::new();

        let effects = app.handle(Action::LoginFinished(LoginOutcome::LoggedIn {
            role: "faculty".to_string(),
        }));

        assert!(matches!(effects.as_slice(), [Effect::LoadDashboard]));
        assert!(matches!(app.screen, Screen::Dashboard(_)));
    }

    #[test]
    fn invalid_credentials_stay_on_login() {
        let mut app = App::new();

        let effects = app.handle(Action::LoginFinished(LoginOutcome::InvalidCredentials));

        assert!(effects.is_empty());
        assert!(matches!(app.screen, Screen::Login(_)));
        assert_eq!(app.status_line.as_deref(), Some("Invalid Credentials"));
    }

    #[test]
    fn network_failure_is_not_silent() {
        let mut app = App::new();

        app.handle(Action::LoginFinished(LoginOutcome::Failed(api::Error::Server(
            reqwest::StatusCode::BAD_GATEWAY,
        ))));

        assert_eq!(app.status_line.as_deref(), Some("Network error, try again"));
    }

    #[test]
    fn superseded_login_changes_nothing() {
        let mut app = App::new();
        app.status_line = Some("Logging in…".to_string());

        app.handle(Action::LoginFinished(LoginOutcome::Superseded));

        assert_eq!(app.status_line.as_deref(), Some("Logging in…"));
        assert!(matches!(app.screen, Screen::Login(_)));
    }

    #[test]
    fn registration_message_is_shown_verbatim() {
        let mut app = App::new();
        app.handle(press(KeyCode::F(2)));

        app.handle(Action::Registered(RegistrationOutcome::Message(
            "User created".to_string(),
        )));

        assert_eq!(app.status_line.as_deref(), Some("User created"));
        assert!(matches!(app.screen, Screen::Register(_)));
    }

    #[test]
    fn register_form_leaves_out_blank_optional_fields() {
        let mut app = App::new();
        app.handle(press(KeyCode::F(2)));

        app.handle(press(KeyCode::Tab)); // full name -> username
        type_text(&mut app, "ada");

        let effects = app.handle(press(KeyCode::Enter));

        match effects.as_slice() {
            [Effect::Register(req)] => {
                assert_eq!(req.username, "ada");
                assert_eq!(req.role, "student");
                assert_eq!(req.fullname, None);
                assert_eq!(req.email, None);
            }
            other => panic!("expected a registration, got {other:?}"),
        }
    }

    #[test]
    fn recovery_waits_for_captcha() {
        let mut app = App::new();

        let effects = app.handle(press(KeyCode::F(3)));
        assert!(matches!(effects.as_slice(), [Effect::FetchCaptcha]));

        let effects = app.handle(press(KeyCode::Enter));
        assert!(effects.is_empty());

        app.handle(Action::GotCaptcha("aB3xY".to_string()));
        let effects = app.handle(press(KeyCode::Enter));

        match effects.as_slice() {
            [Effect::Recover(req)] => {
                assert_eq!(req.kind, recover::Kind::Password);
                assert_eq!(req.captcha_real, "aB3xY");
            }
            other => panic!("expected a recovery, got {other:?}"),
        }
    }

    #[test]
    fn only_faculty_can_add_records() {
        let mut app = App::new();
        app.handle(Action::LoginFinished(LoginOutcome::LoggedIn {
            role: "student".to_string(),
        }));

        app.handle(press(KeyCode::Char('a')));

        assert!(matches!(app.screen, Screen::Dashboard(_)));
    }

    #[test]
    fn add_record_rejects_non_numbers() {
        let mut app = App::new();
        app.handle(Action::LoginFinished(LoginOutcome::LoggedIn {
            role: "faculty".to_string(),
        }));
        app.handle(press(KeyCode::Char('a')));
        assert!(matches!(app.screen, Screen::AddRecord { .. }));

        type_text(&mut app, "ada");
        app.handle(press(KeyCode::Tab));
        type_text(&mut app, "first");

        let effects = app.handle(press(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            app.status_line.as_deref(),
            Some("Semester must be a whole number")
        );
    }

    #[test]
    fn logging_out_returns_to_login() {
        let mut app = App::new();
        app.handle(Action::LoginFinished(LoginOutcome::LoggedIn {
            role: "student".to_string(),
        }));

        let effects = app.handle(press(KeyCode::Char('l')));
        assert!(matches!(effects.as_slice(), [Effect::LogOut]));

        app.handle(Action::LoggedOut("Logged out".to_string()));
        assert!(matches!(app.screen, Screen::Login(_)));
    }

    #[test]
    fn failed_dashboard_load_stops_loading() {
        let mut app = App::new();
        app.handle(Action::LoginFinished(LoginOutcome::LoggedIn {
            role: "student".to_string(),
        }));

        app.handle(Action::Problem("Problem communicating with the server".to_string()));

        match &app.screen {
            Screen::Dashboard(dashboard) => assert!(!dashboard.loading),
            _ => panic!("expected to stay on the dashboard"),
        }
        assert_eq!(
            app.status_line.as_deref(),
            Some("Problem communicating with the server")
        );

        let effects = app.handle(press(KeyCode::Char('r')));
        assert!(matches!(effects.as_slice(), [Effect::LoadDashboard]));
    }

    #[test]
    fn escape_on_login_exits() {
        let mut app = App::new();

        app.handle(press(KeyCode::Esc));

        assert_eq!(app.should_exit(), Some(ExitCode::SUCCESS));
    }
}
