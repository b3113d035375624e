//! Readable handle returned by `open`.

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};

/// Forward-only byte stream over an opened file or object.
///
/// No seeking is offered: object-store bodies are streamed once, front to back.
pub struct MediaFile {
    name: String,
    size: Option<u64>,
    stream: BoxStream<'static, std::io::Result<Bytes>>,
}

impl MediaFile {
    /// Wrap a byte stream.
    pub fn new(
        name: impl Into<String>,
        size: Option<u64>,
        stream: BoxStream<'static, std::io::Result<Bytes>>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            stream,
        }
    }

    /// Path or key the file was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length, when the backend reported it.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Consume the handle into its byte stream.
    pub fn into_stream(self) -> BoxStream<'static, std::io::Result<Bytes>> {
        self.stream
    }

    /// Drain the stream into memory.
    pub async fn read_to_end(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size.unwrap_or(0) as usize);
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf)
    }
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
