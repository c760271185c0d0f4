use std::io::Write;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::byte_range::ByteRange;
use crate::config::RunConfig;
use crate::error::{FetchError, Result};
use crate::metadata::ObjectMetadata;

/// An open read of object bytes.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// The two storage operations a run needs.
pub trait ObjectStore {
    /// Metadata-only query, never range restricted.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Open a read of the object, restricted to `range` when given.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&ByteRange>,
    ) -> Result<ObjectReader>;
}

/// Copy the whole stream into memory. The reader is owned here, so it is
/// dropped exactly once whether the copy succeeds or fails.
pub async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    // Read the stream into the vec
    reader
        .read_to_end(&mut data)
        .await
        .map_err(FetchError::StreamCopy)?;
    Ok(data)
}

/// Summary line printed once the object has been read.
pub fn summary_line(bytes_read: usize, range: Option<&ByteRange>) -> String {
    match range {
        Some(range) => format!(
            "Read {} bytes from object within range {}",
            bytes_read, range
        ),
        None => format!("Read {} bytes from object", bytes_read),
    }
}

/// Stat the object, print its metadata, read it (or the requested range) and
/// print how many bytes came back. Returns the number of bytes read.
pub async fn fetch<S, W>(store: &S, config: &RunConfig, out: &mut W) -> Result<usize>
where
    S: ObjectStore,
    W: Write,
{
    let metadata = store.stat_object(&config.bucket, &config.object).await?;
    let rendered = metadata.to_pretty_json()?;
    writeln!(out, "Object Metadata:\n{}", rendered).map_err(FetchError::Output)?;

    let range = config.range.as_ref();
    let reader = store
        .get_object(&config.bucket, &config.object, range)
        .await?;
    let data = drain(reader).await?;

    if let Some(expected) = range.and_then(ByteRange::expected_len) {
        if (data.len() as u64) < expected {
            debug!(
                "range starting at {} returned {} of {} requested bytes",
                range.map_or(0, ByteRange::start),
                data.len(),
                expected
            );
        }
    }

    writeln!(out, "{}", summary_line(data.len(), range)).map_err(FetchError::Output)?;
    Ok(data.len())
}
