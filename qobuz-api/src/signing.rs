//! Request signatures for the sensitive API endpoints.
//!
//! `track/getFileUrl` requires an MD5 signature over a fixed concatenation
//! of the operation name, parameter-name tokens, parameter values, the
//! request timestamp, and the scraped app secret:
//!
//! ```text
//! trackgetFileUrlformat_id{format_id}intent{intent}track_id{track_id}{ts}{secret}
//! ```
//!
//! The backend validates the digest byte-for-byte; any deviation in field
//! order or literal text is observed as an empty or invalid stream URL
//! rather than an HTTP error. MD5 here is the backend's own legacy scheme,
//! not an attacker-facing primitive.

use md5::{Digest, Md5};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds, formatted for the `request_ts` parameter.
pub(crate) fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}

/// Sign a `track/getFileUrl` request.
///
/// Deterministic: the same inputs always produce the same hex digest.
pub(crate) fn sign_track_file_url(
    format_id: &str,
    intent: &str,
    track_id: &str,
    timestamp: &str,
    secret: &str,
) -> String {
    let mut hasher = Md5::new();
    hasher.update(b"trackgetFileUrlformat_id");
    hasher.update(format_id.as_bytes());
    hasher.update(b"intent");
    hasher.update(intent.as_bytes());
    hasher.update(b"track_id");
    hasher.update(track_id.as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference digests computed over the exact concatenation
    // "trackgetFileUrlformat_id{f}intent{i}track_id{t}{ts}{secret}".
    #[test]
    fn golden_vector_hires() {
        let sig = sign_track_file_url(
            "27",
            "stream",
            "5966783",
            "1692957750",
            "4d8f6e2b90a13c5d7e8f9a0b1c2d3e4f",
        );
        assert_eq!(sig, "b96b84739f6caaa8f678ba8f07a45ab7");
    }

    #[test]
    fn golden_vector_cd() {
        let sig = sign_track_file_url(
            "6",
            "stream",
            "19512574",
            "1700000000",
            "abcd1234abcd1234abcd1234abcd1234",
        );
        assert_eq!(sig, "bbdde11f2bea83e86ba29e4a18e67ca6");
    }

    #[test]
    fn signature_is_deterministic_and_input_sensitive() {
        let sig1 = sign_track_file_url("27", "stream", "123", "100", "secret");
        let sig2 = sign_track_file_url("27", "stream", "123", "100", "secret");
        assert_eq!(sig1, sig2);

        let sig3 = sign_track_file_url("6", "stream", "123", "100", "secret");
        assert_ne!(sig1, sig3);
    }

    #[test]
    fn timestamp_is_integral_seconds() {
        let ts = unix_timestamp();
        assert!(ts.parse::<u64>().is_ok());
    }
}
