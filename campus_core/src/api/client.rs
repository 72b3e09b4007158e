use super::error::{self, Error};
use super::{captcha, login, logout, records, recover, register, MessageResp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The address the portal's authentication service listens on unless told
/// otherwise.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// How long a request may take, start to finish, before we give up on it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the portal API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Client {
    /// The server to connect to. Should only be the protocol, host, and
    /// port, e.g. `http://127.0.0.1:5000`.
    pub server: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER.to_string())
    }
}

impl Client {
    /// Construct a new client
    pub fn new(server: String) -> Self {
        Self { server }
    }

    /// Build the HTTP client all requests should share. The server keeps
    /// track of who is logged in with a cookie, so we need a cookie store for
    /// the dashboard endpoints to work after logging in.
    ///
    /// Requests that take longer than `timeout` fail with [`Error::Http`].
    ///
    /// ## Errors
    ///
    /// If the TLS backend can't be initialized.
    pub fn http(timeout: Duration) -> error::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?)
    }

    /// Where a given endpoint lives on this server.
    ///
    /// ## Errors
    ///
    /// If `server` isn't a valid base URL.
    pub fn url(&self, path: &str) -> error::Result<Url> {
        Ok(Url::parse(&self.server)?.join(path)?)
    }

    /// Register with the server.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn register(
        &self,
        http: &reqwest::Client,
        req: &register::Req,
    ) -> error::Result<register::Resp> {
        let url = self.url(register::PATH)?;

        Self::handle_response(http.post(url).json(req)).await
    }

    /// Log into the server.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn login(
        &self,
        http: &reqwest::Client,
        req: &login::Req,
    ) -> error::Result<login::Resp> {
        let url = self.url(login::PATH)?;

        Self::handle_response(http.post(url).json(req)).await
    }

    /// End the server-side session.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn logout(&self, http: &reqwest::Client) -> error::Result<logout::Resp> {
        let url = self.url(logout::PATH)?;

        Self::handle_response(http.get(url)).await
    }

    /// Get a captcha to solve before recovering an account.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn captcha(&self, http: &reqwest::Client) -> error::Result<captcha::Resp> {
        let url = self.url(captcha::PATH)?;

        Self::handle_response(http.get(url)).await
    }

    /// Reset a forgotten password or username.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn recover(
        &self,
        http: &reqwest::Client,
        req: &recover::Req,
    ) -> error::Result<recover::Resp> {
        let url = self.url(recover::PATH)?;

        Self::handle_response(http.post(url).json(req)).await
    }

    /// Get the academic records visible to `role`. Returns `None` without
    /// talking to the server if the role has no records view.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn records(
        &self,
        http: &reqwest::Client,
        role: &str,
    ) -> error::Result<Option<records::Resp>> {
        let Some(path) = records::path_for_role(role) else {
            return Ok(None);
        };

        let url = self.url(path)?;

        Self::handle_response(http.get(url)).await.map(Some)
    }

    /// Add an academic record (faculty only.)
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn add_record(
        &self,
        http: &reqwest::Client,
        record: &records::Record,
    ) -> error::Result<records::AddResp> {
        let url = self.url(records::ADD_PATH)?;

        Self::handle_response(http.post(url).json(record)).await
    }

    /// Convert an HTTP response into a result, interpreting errors in a
    /// standard way.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` if the server returned a success (2xx) with a body we
    ///   could decode
    /// - `Error::Http` if the request never completed or the body was not the
    ///   JSON we expected
    /// - `Error::Client` if the server returned a client error (4xx) with a
    ///   message
    /// - `Error::Server` if the server returned a server error (5xx)
    /// - `Error::Unexpected` if the server returned something else, including
    ///   a 4xx without a message we can read
    async fn handle_response<T>(req: reqwest::RequestBuilder) -> error::Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = req.send().await?;

        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else if status.is_client_error() {
            let body = resp.bytes().await?;

            match serde_json::from_slice::<MessageResp>(&body) {
                Ok(err) => Err(Error::Client(err.message)),
                Err(_) => Err(Error::Unexpected(status)),
            }
        } else if status.is_server_error() {
            Err(Error::Server(status))
        } else {
            Err(Error::Unexpected(status))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        Client::new(server.uri())
    }

    #[test]
    fn joins_paths_onto_base() {
        let client = Client::new("http://127.0.0.1:5000".to_string());

        assert_eq!(
            client.url(login::PATH).unwrap().as_str(),
            "http://127.0.0.1:5000/login"
        );
    }

    #[tokio::test]
    async fn bad_base_url_is_an_error() {
        let client = Client::new("not a url".to_string());

        let err = client.logout(&Client::http(DEFAULT_TIMEOUT).unwrap()).await.unwrap_err();

        assert!(matches!(err, Error::UrlParse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn login_posts_json_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "username": "ada", "password": "hunter2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login Success",
                "role": "student",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .login(
                &Client::http(DEFAULT_TIMEOUT).unwrap(),
                &login::Req {
                    username: "ada".to_string(),
                    password: "hunter2".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(resp.role.as_deref(), Some("student"));
    }

    #[tokio::test]
    async fn client_error_with_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/captcha"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "message": "slow down" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .captcha(&Client::http(DEFAULT_TIMEOUT).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Client(ref msg) if msg == "slow down"), "{err:?}");
    }

    #[tokio::test]
    async fn client_error_without_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/captcha"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .captcha(&Client::http(DEFAULT_TIMEOUT).unwrap())
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Unexpected(status) if status.as_u16() == 404),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .logout(&Client::http(DEFAULT_TIMEOUT).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Server(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Logged out"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .logout(&Client::http(DEFAULT_TIMEOUT).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)), "{err:?}");
    }

    #[tokio::test]
    async fn records_for_role_without_view_skip_the_server() {
        let server = MockServer::start().await;

        let records = client_for(&server)
            .records(&Client::http(DEFAULT_TIMEOUT).unwrap(), "admin")
            .await
            .unwrap();

        assert_eq!(records, None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn faculty_records() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/faculty/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "username": "ada", "semester": 1, "subject": "Math", "marks": 90, "attendance": 88 },
            ])))
            .mount(&server)
            .await;

        let records = client_for(&server)
            .records(&Client::http(DEFAULT_TIMEOUT).unwrap(), "faculty")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn session_cookie_is_carried_to_later_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc123; Path=/")
                    .set_body_json(json!({ "role": "student" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/student/data"))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let http = Client::http(DEFAULT_TIMEOUT).unwrap();
        let client = client_for(&server);

        client
            .login(
                &http,
                &login::Req {
                    username: "ada".to_string(),
                    password: "hunter2".to_string(),
                },
            )
            .await
            .unwrap();

        let records = client.records(&http, "student").await.unwrap();

        assert_eq!(records, Some(Vec::new()));
    }

    #[tokio::test]
    async fn add_record_posts_record() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/faculty/update"))
            .and(body_json(json!({
                "username": "ada",
                "semester": 2,
                "subject": "Chemistry",
                "marks": 75,
                "attendance": 95,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Record added Successfully",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .add_record(
                &Client::http(DEFAULT_TIMEOUT).unwrap(),
                &records::Record {
                    username: Some("ada".to_string()),
                    semester: 2,
                    subject: "Chemistry".to_string(),
                    marks: 75,
                    attendance: 95,
                },
            )
            .await
            .unwrap();

        assert_eq!(resp.message, "Record added Successfully");
    }
}
