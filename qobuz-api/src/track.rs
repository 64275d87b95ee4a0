//! Stream-URL resolution and track download.
//!
//! # Endpoint
//!
//! `GET /track/getFileUrl?request_ts=&request_sig=&track_id=&format_id=&intent=stream`
//!
//! The request must carry an MD5 signature over the operation name,
//! parameters, timestamp, and app secret (see [`crate::signing`]).
//!
//! Response:
//! ```json
//! {
//!   "track_id": 5966783,
//!   "duration": 254,
//!   "url": "https://streaming-qobuz-std.akamaized.net/file?...",
//!   "format_id": 27,
//!   "mime_type": "audio/flac",
//!   "sampling_rate": 192.0,
//!   "bit_depth": 24
//! }
//! ```
//!
//! An **empty `url`** is a structurally valid response meaning the backend
//! has not finished preparing the file. Callers retry after a short pause;
//! [`resolve_until_ready`] is the structured form of that loop. A rejected
//! signature is observed the same way, as an empty or invalid URL rather
//! than an HTTP error.

use crate::client::QobuzClient;
use crate::error::Result;
use crate::signing;
use crate::types::{Progress, Quality, StreamGrant};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Pause between not-ready re-resolutions.
const NOT_READY_BACKOFF: Duration = Duration::from_secs(1);

impl QobuzClient {
    /// Resolve a signed stream URL for one track at one quality tier.
    ///
    /// A grant with an empty URL is returned as `Ok`: it means "not ready
    /// yet", and retrying is the caller's decision (see
    /// [`wait_stream_url`](Self::wait_stream_url)). The quality tier is
    /// passed through unvalidated; the backend rejects unknown tiers.
    pub fn stream_url(&self, track_id: u64, quality: Quality) -> Result<StreamGrant> {
        let timestamp = signing::unix_timestamp();
        let format_id = quality.format_id().to_string();
        let track = track_id.to_string();
        let signature =
            signing::sign_track_file_url(&format_id, "stream", &track, &timestamp, &self.secret);

        self.get_json(
            "/track/getFileUrl",
            &[
                ("request_ts", timestamp.as_str()),
                ("request_sig", signature.as_str()),
                ("track_id", track.as_str()),
                ("format_id", format_id.as_str()),
                ("intent", "stream"),
            ],
        )
    }

    /// Resolve a stream URL, re-resolving every second until the backend
    /// produces a non-empty URL.
    ///
    /// The loop is deliberately unbounded: the backend is trusted to
    /// eventually finish preparing the file. Errors other than "not ready"
    /// abort immediately.
    pub fn wait_stream_url(&self, track_id: u64, quality: Quality) -> Result<StreamGrant> {
        resolve_until_ready(
            || self.stream_url(track_id, quality),
            || thread::sleep(NOT_READY_BACKOFF),
        )
    }

    /// Resolve a track's stream URL (waiting out not-ready responses) and
    /// stream the payload to `dest`, reporting progress through the sink.
    ///
    /// Returns the grant so callers can surface format metadata.
    pub fn download_track(
        &self,
        track_id: u64,
        quality: Quality,
        dest: &Path,
        on_progress: impl FnMut(Progress),
    ) -> Result<StreamGrant> {
        let grant = self.wait_stream_url(track_id, quality)?;
        self.download(&grant.url, dest, on_progress)?;
        Ok(grant)
    }
}

/// Re-invoke `resolve` until it yields a ready grant, calling `sleep`
/// between attempts.
///
/// The exit condition is a non-empty URL; resolution errors propagate
/// immediately. `sleep` is injected so tests (and alternative frontends)
/// can supply their own pacing.
pub fn resolve_until_ready(
    mut resolve: impl FnMut() -> Result<StreamGrant>,
    mut sleep: impl FnMut(),
) -> Result<StreamGrant> {
    loop {
        let grant = resolve()?;
        if grant.is_ready() {
            return Ok(grant);
        }
        debug!("stream URL for track {} not ready, retrying", grant.track_id);
        sleep();
    }
}
