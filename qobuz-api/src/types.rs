//! Data types for Qobuz API responses.
//!
//! These are read-only snapshots deserialized from the raw JSON the API
//! returns. Field names follow Rust conventions; the wire format is
//! `snake_case` already, so almost no renaming is needed.

use serde::{Deserialize, Serialize};

/// Audio quality tier, mapped to the API `format_id` parameter.
///
/// The enumeration is closed; the server treats unknown tiers as an error
/// and answers with an empty grant or a decode failure.
///
/// | Variant    | `format_id` | Encoding              |
/// |------------|-------------|-----------------------|
/// | `Mp3`      | 5           | 320 kbps MP3          |
/// | `Cd`       | 6           | 16-bit/44.1kHz FLAC   |
/// | `HiRes96`  | 7           | 24-bit ≤96kHz FLAC    |
/// | `HiRes192` | 27          | 24-bit ≤192kHz FLAC   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// 320 kbps lossy MP3.
    Mp3,
    /// CD-quality lossless (16-bit / 44.1 kHz).
    Cd,
    /// Hi-Res lossless up to 96 kHz.
    HiRes96,
    /// Hi-Res lossless up to 192 kHz.
    HiRes192,
}

impl Quality {
    /// Return the numeric `format_id` sent to the API.
    pub fn format_id(self) -> u32 {
        match self {
            Self::Mp3 => 5,
            Self::Cd => 6,
            Self::HiRes96 => 7,
            Self::HiRes192 => 27,
        }
    }
}

/// An artist or performer reference embedded in tracks and albums.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    /// Qobuz artist ID.
    #[serde(default)]
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Album artist with catalog metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub albums_count: u64,
    #[serde(default)]
    pub slug: String,
}

/// Cover art URLs at the standard Qobuz sizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub large: String,
}

/// Genre classification attached to albums.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Record label reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A music track.
///
/// Returned inside search results and [`FullAlbum::tracks`]. Note that
/// Qobuz track IDs are numeric while album IDs are strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Qobuz track ID (used for stream-URL resolution).
    #[serde(default)]
    pub id: u64,
    /// Track title.
    #[serde(default)]
    pub title: String,
    /// Optional version qualifier (e.g. "Remastered 2009").
    #[serde(default)]
    pub version: Option<String>,
    /// Main performer.
    #[serde(default)]
    pub performer: Person,
    /// Composer, when credited.
    #[serde(default)]
    pub composer: Option<Person>,
    /// Free-form performer credits line.
    #[serde(default)]
    pub performers: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u64,
    /// Position within the disc.
    #[serde(default)]
    pub track_number: u32,
    /// Disc number for multi-disc releases.
    #[serde(default)]
    pub media_number: u32,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub maximum_bit_depth: u32,
    #[serde(default)]
    pub maximum_sampling_rate: f64,
    #[serde(default)]
    pub parental_warning: bool,
    #[serde(default)]
    pub streamable: bool,
    #[serde(default)]
    pub downloadable: bool,
    #[serde(default)]
    pub hires: bool,
    /// Album the track belongs to. Present in search results, absent
    /// inside [`FullAlbum::tracks`] (the enclosing album is implied).
    #[serde(default)]
    pub album: Option<Album>,
}

/// An album as returned by catalog search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Album {
    /// Qobuz album ID. Unlike track IDs these are strings.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub artist: Artist,
    #[serde(default)]
    pub image: Image,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default)]
    pub label: Label,
    #[serde(default)]
    pub upc: String,
    /// Release timestamp (unix seconds).
    #[serde(default)]
    pub released_at: i64,
    #[serde(default)]
    pub release_date_original: Option<String>,
    /// Total duration in seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub tracks_count: u32,
    #[serde(default)]
    pub media_count: u32,
    #[serde(default)]
    pub popularity: u64,
    #[serde(default)]
    pub maximum_bit_depth: u32,
    #[serde(default)]
    pub maximum_sampling_rate: f64,
    #[serde(default)]
    pub parental_warning: bool,
    #[serde(default)]
    pub streamable: bool,
    #[serde(default)]
    pub downloadable: bool,
    #[serde(default)]
    pub hires: bool,
}

/// An album fetched through `/album/get`, with the track list and the
/// `track_ids` / `albumsFromSameArtist` extras.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullAlbum {
    /// Catalog fields shared with the search representation.
    #[serde(flatten)]
    pub album: Album,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    /// IDs of every track, in disc order (the `track_ids` extra).
    #[serde(default)]
    pub track_ids: Vec<u64>,
    /// The album's tracks, paginated by the request's offset/limit.
    #[serde(default)]
    pub tracks: Paged<Track>,
    /// Other albums by the same artist (the `albumsFromSameArtist` extra).
    #[serde(default)]
    pub albums_same_artist: Paged<Album>,
}

/// One paginated section of an API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            limit: 0,
            offset: 0,
            total: 0,
            items: Vec::new(),
        }
    }
}

/// Catalog search results.
///
/// Albums and tracks are fully typed. Artists, playlists, and stories are
/// carried as opaque JSON values: the upstream service returns them but
/// this client does not consume them further.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub albums: Paged<Album>,
    #[serde(default)]
    pub tracks: Paged<Track>,
    #[serde(default)]
    pub artists: Paged<serde_json::Value>,
    #[serde(default)]
    pub playlists: Paged<serde_json::Value>,
    #[serde(default)]
    pub stories: Paged<serde_json::Value>,
}

/// A playback restriction attached to a stream grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Restriction {
    #[serde(default)]
    pub code: String,
}

/// A resolved, time-limited stream URL for one track at one quality tier.
///
/// The backend answers `200 OK` with an **empty `url`** while the file is
/// still being prepared. That is a valid, retryable state, not an error;
/// see [`QobuzClient::wait_stream_url`](crate::QobuzClient::wait_stream_url).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamGrant {
    #[serde(default)]
    pub track_id: u64,
    /// Track duration in seconds.
    #[serde(default)]
    pub duration: u64,
    /// Signed CDN URL. Empty means "not ready yet, try again shortly".
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub format_id: u32,
    /// MIME type of the payload, e.g. `audio/flac`.
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub sampling_rate: f64,
    #[serde(default)]
    pub bit_depth: u32,
}

impl StreamGrant {
    /// Whether the backend has finished preparing the stream URL.
    pub fn is_ready(&self) -> bool {
        !self.url.is_empty()
    }

    /// File extension derived from the MIME subtype
    /// (`audio/flac` → `flac`). Falls back to `"bin"` when the grant
    /// carries no usable MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.split('/').nth(1) {
            Some(ext) if !ext.is_empty() => ext,
            _ => "bin",
        }
    }
}

/// Byte-level progress of an in-flight download.
///
/// Recomputed and emitted through the progress sink on every chunk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Total payload size as declared by the server.
    pub total: u64,
    /// Bytes written to disk so far.
    pub transferred: u64,
}

impl Progress {
    /// Completion ratio in `[0.0, 1.0]`. Only meaningful when `total > 0`,
    /// which the downloader guarantees before emitting any progress.
    pub fn ratio(&self) -> f64 {
        self.transferred as f64 / self.total as f64
    }
}

/// The logged-in user's account profile, as returned by `/user/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    #[serde(default)]
    pub credential: Option<Credential>,
}

/// Subscription details embedded in [`User`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub periodicity: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub is_canceled: bool,
}

/// Streaming entitlements embedded in [`User`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_format_ids() {
        assert_eq!(Quality::Mp3.format_id(), 5);
        assert_eq!(Quality::Cd.format_id(), 6);
        assert_eq!(Quality::HiRes96.format_id(), 7);
        assert_eq!(Quality::HiRes192.format_id(), 27);
    }

    #[test]
    fn grant_readiness_tracks_url() {
        let mut grant = StreamGrant::default();
        assert!(!grant.is_ready());
        grant.url = "https://streaming.example/file.flac".to_owned();
        assert!(grant.is_ready());
    }

    #[test]
    fn grant_extension_from_mime_subtype() {
        let grant = StreamGrant {
            mime_type: "audio/flac".to_owned(),
            ..StreamGrant::default()
        };
        assert_eq!(grant.extension(), "flac");

        let missing = StreamGrant::default();
        assert_eq!(missing.extension(), "bin");
    }

    #[test]
    fn progress_ratio() {
        let p = Progress {
            total: 200,
            transferred: 50,
        };
        assert!((p.ratio() - 0.25).abs() < f64::EPSILON);
    }
}
