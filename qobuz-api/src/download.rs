//! Streaming download with live progress.
//!
//! The payload is copied from the HTTP response to the destination file in
//! fixed-size chunks, so memory use is bounded and independent of file size.
//! Every chunk written to disk emits a [`Progress`] through the injected
//! sink; on success the sink sees a final ratio of exactly 1.0 once.
//!
//! Failure leaves the partially written file on disk so the caller can
//! inspect it; there is no automatic cleanup.

use crate::client::QobuzClient;
use crate::error::{QobuzError, Result};
use crate::types::Progress;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

impl QobuzClient {
    /// Stream `url` to `dest`, reporting progress through `on_progress`.
    ///
    /// The destination is created (or truncated) only after the response
    /// passes its preconditions. The progress sink is called inline after
    /// every chunk write; it must not block for long, or it will stall the
    /// copy loop.
    ///
    /// # Errors
    ///
    /// - [`QobuzError::DownloadInProgress`] — another download already owns
    ///   `dest`.
    /// - [`QobuzError::Http`] — the request failed at the transport level.
    /// - [`QobuzError::Status`] — the response status was not 200.
    /// - [`QobuzError::ContentLengthUnknown`] — the response declared no
    ///   positive content length; progress needs a known total.
    /// - [`QobuzError::Io`] — writing the file failed.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<u64> {
        let _claim = self.downloads.claim(dest)?;

        debug!("downloading {url} -> {}", dest.display());
        let mut resp = self.http.get(url).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(QobuzError::Status {
                code: status.as_u16(),
                url: url.to_owned(),
            });
        }
        let total = resp
            .content_length()
            .filter(|len| *len > 0)
            .ok_or(QobuzError::ContentLengthUnknown)?;

        let file = File::create(dest)?;
        let mut writer = ProgressWriter {
            inner: BufWriter::new(file),
            total,
            transferred: 0,
            on_progress: &mut on_progress,
        };
        let written = io::copy(&mut resp, &mut writer)?;
        writer.inner.flush()?;
        debug!("wrote {written} of {total} bytes to {}", dest.display());
        Ok(written)
    }
}

/// Counting writer that taps every write and reports the running total.
struct ProgressWriter<W, F> {
    inner: W,
    total: u64,
    transferred: u64,
    on_progress: F,
}

impl<W: Write, F: FnMut(Progress)> Write for ProgressWriter<W, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.transferred += n as u64;
        (self.on_progress)(Progress {
            total: self.total,
            transferred: self.transferred,
        });
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Tracks destinations with an in-flight download, so two transfers can
/// never write to the same path at once.
#[derive(Debug, Default)]
pub(crate) struct DownloadRegistry {
    active: Mutex<HashSet<PathBuf>>,
}

impl DownloadRegistry {
    /// Claim exclusive ownership of `dest` for the duration of a download.
    /// The claim is released when the returned guard drops.
    fn claim(&self, dest: &Path) -> Result<DownloadClaim<'_>> {
        let path = dest.to_path_buf();
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !active.insert(path.clone()) {
            return Err(QobuzError::DownloadInProgress(path));
        }
        Ok(DownloadClaim {
            registry: self,
            path,
        })
    }
}

#[derive(Debug)]
struct DownloadClaim<'a> {
    registry: &'a DownloadRegistry,
    path: PathBuf,
}

impl Drop for DownloadClaim<'_> {
    fn drop(&mut self) {
        self.registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_writer_reports_running_ratio() {
        let mut ratios = Vec::new();
        let mut sink = Vec::new();
        {
            let mut writer = ProgressWriter {
                inner: &mut sink,
                total: 10,
                transferred: 0,
                on_progress: |p: Progress| ratios.push(p.ratio()),
            };
            writer.write_all(b"01234").unwrap();
            writer.write_all(b"56789").unwrap();
        }
        assert_eq!(sink.len(), 10);
        assert_eq!(ratios, [0.5, 1.0]);
    }

    #[test]
    fn claim_is_exclusive_until_dropped() {
        let registry = DownloadRegistry::default();
        let dest = Path::new("downloads/track.flac");

        let claim = registry.claim(dest).unwrap();
        let err = registry.claim(dest).unwrap_err();
        assert!(matches!(err, QobuzError::DownloadInProgress(_)));

        drop(claim);
        assert!(registry.claim(dest).is_ok());
    }

    #[test]
    fn distinct_destinations_claim_independently() {
        let registry = DownloadRegistry::default();
        let _a = registry.claim(Path::new("a.flac")).unwrap();
        let _b = registry.claim(Path::new("b.flac")).unwrap();
    }
}
