//! Byte-counting stream wrapper for the upload body.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

/// Callback invoked with the cumulative number of bytes handed to the
/// transport.
pub type ByteCountCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Wraps the archive's byte stream and reports how much of the body has
/// been sent so far.
pub struct CountingStream<S> {
    inner: S,
    bytes_sent: u64,
    callback: ByteCountCallback,
}

impl<S> CountingStream<S> {
    pub fn new(inner: S, callback: ByteCountCallback) -> Self {
        Self {
            inner,
            bytes_sent: 0,
            callback,
        }
    }
}

impl<S> Stream for CountingStream<S>
where
    S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
{
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.bytes_sent += chunk.len() as u64;
                (self.callback)(self.bytes_sent);
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}
