//! HTTP client for the Qobuz API.
//!
//! All catalog and stream calls are GETs against
//! `https://www.qobuz.com/api.json/0.2` carrying the `X-App-Id` header and,
//! once a session token exists, `X-User-Auth-Token`. Login is a POST with
//! credentials in the query string. Responses are plain JSON; non-2xx
//! statuses are mapped to [`QobuzError::Status`] before decoding.
//!
//! App credentials are scraped from the public web player at construction
//! time (see [`crate::credentials`]) and treated as valid for the process
//! lifetime. The session is mutated only by construction and
//! [`login`](QobuzClient::login); afterwards it is effectively immutable, so
//! `&self` methods never need synchronization.

use crate::credentials::{self, AppCredentials};
use crate::download::DownloadRegistry;
use crate::error::{QobuzError, Result};
use crate::types::User;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://www.qobuz.com/api.json/0.2";

/// User agent the backend expects from API traffic.
const USER_AGENT: &str = "Qobuz/5.2.0 Android/29";

/// Blocking client for the Qobuz API.
///
/// Owns the scraped app id/secret, the session auth token, and one
/// [`reqwest::blocking::Client`]. API operations are implemented in
/// separate modules (`auth`, `search`, `album`, `track`, `download`) as
/// `impl QobuzClient` blocks.
pub struct QobuzClient {
    pub(crate) http: Client,
    pub(crate) api_base: String,
    pub(crate) app_id: String,
    pub(crate) secret: String,
    pub(crate) auth_token: Option<String>,
    pub(crate) logged_in: bool,
    pub(crate) user: Option<User>,
    pub(crate) downloads: DownloadRegistry,
}

impl QobuzClient {
    /// Scrape app credentials, then log in with email and password.
    pub fn from_credentials(email: &str, password: &str) -> Result<Self> {
        let mut client = Self::bootstrap(None)?;
        client.login(email, password)?;
        Ok(client)
    }

    /// Scrape app credentials and use a pre-issued auth token, skipping
    /// the login call entirely.
    pub fn from_auth_token(auth_token: impl Into<String>) -> Result<Self> {
        Self::bootstrap(Some(auth_token.into()))
    }

    /// Build a client from already-known app credentials, without touching
    /// the network. Useful when the extraction result is cached, and for
    /// pointing the client at a test server.
    pub fn with_app_credentials(
        credentials: AppCredentials,
        auth_token: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            api_base: API_BASE.to_owned(),
            app_id: credentials.app_id,
            secret: credentials.secret,
            auth_token,
            logged_in: false,
            user: None,
            downloads: DownloadRegistry::default(),
        })
    }

    fn bootstrap(auth_token: Option<String>) -> Result<Self> {
        let http = build_http()?;
        let creds = credentials::fetch_app_credentials(&http, credentials::PORTAL_BASE)?;
        Ok(Self {
            http,
            api_base: API_BASE.to_owned(),
            app_id: creds.app_id,
            secret: creds.secret,
            auth_token,
            logged_in: false,
            user: None,
            downloads: DownloadRegistry::default(),
        })
    }

    /// The scraped 9-digit application id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The session auth token, once logged in or injected.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Whether [`login`](Self::login) has completed on this session.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// The account profile returned by login, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Override the API base URL (tests, proxies). The default is the
    /// public production endpoint.
    pub fn set_api_base(&mut self, base: impl Into<String>) {
        self.api_base = base.into();
    }

    /// Issue an authenticated GET and decode the JSON body into `T`.
    ///
    /// Sends `X-App-Id` always and `X-User-Auth-Token` when a token is
    /// present. Non-2xx responses become [`QobuzError::Status`]; malformed
    /// bodies become [`QobuzError::Json`].
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.api_base);
        debug!("GET {endpoint} ({} params)", params.len());

        let mut request = self
            .http
            .get(&url)
            .query(params)
            .header("X-App-Id", &self.app_id);
        if let Some(token) = &self.auth_token {
            request = request.header("X-User-Auth-Token", token);
        }

        let resp = request.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QobuzError::Status {
                code: status.as_u16(),
                url,
            });
        }
        let body = resp.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Shared HTTP client configuration.
///
/// Downloads run over the same client and can take minutes, so only the
/// connection phase is bounded; there is no total-request timeout.
fn build_http() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .timeout(None)
        .build()?)
}
