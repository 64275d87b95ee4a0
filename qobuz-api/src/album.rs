//! Album detail API.
//!
//! Endpoint: `GET /album/get?album_id=&offset=0&limit=50&extras=track_ids,albumsFromSameArtist`
//!
//! Returns the full nested album schema: catalog metadata, the paginated
//! track list, the flat `track_ids` array, and sibling albums by the same
//! artist.

use crate::client::QobuzClient;
use crate::error::Result;
use crate::types::FullAlbum;

impl QobuzClient {
    /// Fetch an album with its track list and extras.
    ///
    /// The first 50 tracks are returned; that covers every album the
    /// download flow targets.
    pub fn album(&self, album_id: &str) -> Result<FullAlbum> {
        self.get_json(
            "/album/get",
            &[
                ("album_id", album_id),
                ("offset", "0"),
                ("limit", "50"),
                ("extras", "track_ids,albumsFromSameArtist"),
            ],
        )
    }
}
