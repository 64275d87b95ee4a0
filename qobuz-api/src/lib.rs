//! Qobuz API client library.
//!
//! Provides authenticated access to the Qobuz streaming API: catalog
//! search, album detail, signed stream-URL resolution, and streaming
//! download with progress reporting.
//!
//! # Authentication
//!
//! Qobuz has no documented client registration. The app id and signing
//! secret are scraped from the public web player bundle when a client is
//! constructed (see [`credentials`]), then paired with a user auth token,
//! either obtained by logging in with email/password or supplied directly:
//!
//! ```no_run
//! use qobuz_api::QobuzClient;
//! use qobuz_api::types::Quality;
//!
//! // Email/password login (scrapes app credentials, then logs in)
//! let client = QobuzClient::from_credentials("me@example.com", "hunter2").unwrap();
//!
//! // Or reuse a pre-issued token and skip login entirely
//! let client = QobuzClient::from_auth_token("AbCdEf...").unwrap();
//!
//! let results = client.search("daft punk").unwrap();
//! let grant = client.wait_stream_url(5_966_783, Quality::HiRes192).unwrap();
//! ```
//!
//! # API endpoint mapping
//!
//! | Method                          | Endpoint               | Description                |
//! |---------------------------------|------------------------|----------------------------|
//! | [`QobuzClient::login`]          | `/user/login`          | Email/password login       |
//! | [`QobuzClient::search`]         | `/catalog/search`      | Catalog search             |
//! | [`QobuzClient::album`]          | `/album/get`           | Album detail + tracks      |
//! | [`QobuzClient::stream_url`]     | `/track/getFileUrl`    | Signed stream-URL grant    |
//! | [`QobuzClient::wait_stream_url`]| (retries `getFileUrl`) | Waits out not-ready grants |
//! | [`QobuzClient::download`]       | (grant URL)            | Streamed download to disk  |
//!
//! # Signatures
//!
//! `track/getFileUrl` requires an MD5 signature over a fixed concatenation
//! of operation name, parameters, timestamp, and the scraped secret. See
//! [`signing`](crate::signing) (internal).

mod album;
mod auth;
pub mod client;
pub mod credentials;
mod download;
pub mod error;
mod search;
mod signing;
mod track;
pub mod types;

pub use client::QobuzClient;
pub use error::{QobuzError, Result};
pub use track::resolve_until_ready;
