//! Login API.
//!
//! Endpoint: `POST /user/login?app_id=&email=&password=`
//!
//! Response:
//! ```json
//! {
//!   "user": { "id": 123, "email": "...", "display_name": "...", ... },
//!   "user_auth_token": "AbCdEf..."
//! }
//! ```
//!
//! A 2xx response that lacks either the user object or a non-empty token is
//! still a failed login.

use crate::client::QobuzClient;
use crate::error::{QobuzError, Result};
use crate::types::User;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: Option<User>,
    #[serde(default)]
    user_auth_token: Option<String>,
}

impl QobuzClient {
    /// Log in with email and password, storing the session auth token and
    /// user profile on success.
    ///
    /// # Errors
    ///
    /// - [`QobuzError::AlreadyLoggedIn`] — the session already holds a
    ///   login; no request is issued.
    /// - [`QobuzError::LoginRejected`] — non-2xx response, carrying the
    ///   status code.
    /// - [`QobuzError::LoginIncomplete`] — 2xx response missing the user
    ///   or the auth token.
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        if self.logged_in {
            return Err(QobuzError::AlreadyLoggedIn);
        }

        let url = format!("{}/user/login", self.api_base);
        debug!("POST /user/login for {email}");
        let resp = self
            .http
            .post(&url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("email", email),
                ("password", password),
            ])
            .header("Content-Type", "application/json")
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QobuzError::LoginRejected {
                code: status.as_u16(),
            });
        }

        let body = resp.text()?;
        let login: LoginResponse = serde_json::from_str(&body)?;
        let token = login.user_auth_token.filter(|t| !t.is_empty());
        let (Some(user), Some(token)) = (login.user, token) else {
            return Err(QobuzError::LoginIncomplete);
        };

        self.auth_token = Some(token);
        self.user = Some(user);
        self.logged_in = true;
        Ok(())
    }
}
