//! Exclusive-create artifact writer.
//!
//! The destination is opened with `create_new`, which fails atomically when
//! the file exists. There is no separate existence check: two workers racing
//! for the same path resolve to exactly one writer and one
//! [`DownloadError::AlreadyExists`].

use std::io::ErrorKind;
use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::client::HttpClient;
use super::error::DownloadError;

/// Fetches `url` and writes the body to a newly created file at `path`.
///
/// The GET happens first; a failed request leaves nothing on disk. If
/// streaming fails after the file was created, the partial file stays where
/// it is and the error is returned.
///
/// # Returns
///
/// The number of bytes written.
///
/// # Errors
///
/// - [`DownloadError::AlreadyExists`] if `path` is already present
/// - a transport error (see [`DownloadError::is_transport`]) if the request
///   or the body transfer fails
/// - [`DownloadError::Io`] if the file cannot be created or written
#[instrument(skip(client), fields(path = %path.display()))]
pub async fn write_exclusive(
    client: &HttpClient,
    path: &Path,
    url: &str,
) -> Result<u64, DownloadError> {
    let response = client.get(url).await?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                DownloadError::already_exists(path)
            } else {
                DownloadError::io(path, e)
            }
        })?;

    let bytes = stream_to_file(&mut file, response, url, path).await?;
    debug!(bytes, "artifact written");
    Ok(bytes)
}

/// Streams response body to file, returning bytes written.
///
/// Bytes received before a transfer error are flushed to disk before the
/// error is returned.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = match chunk_result {
            Ok(chunk) => chunk,
            Err(e) => {
                if let Err(flush_err) = writer.flush().await {
                    debug!(error = %flush_err, "failed to flush partial artifact");
                }
                debug!(bytes_written, "transfer interrupted, keeping partial file");
                return Err(DownloadError::network(url, e));
            }
        };

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}
