//! Pull-based stream of generated text fragments

use futures::stream::{self, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{Error, Result};

type BoxedFragments = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Ordered, finite stream of text fragments with a terminal error signal
///
/// Empty fragments are skipped. The first `Err` item is the last item.
/// Dropping the stream drops the underlying provider response, so no
/// further provider reads happen once the consumer goes away.
pub struct TextStream {
    inner: BoxedFragments,
    finished: bool,
}

/// Everything a stream produced: the concatenated text and how it ended
#[derive(Debug)]
pub struct StreamOutcome {
    pub text: String,
    /// Set when the stream stopped early; `text` holds what arrived before
    pub error: Option<Error>,
}

impl StreamOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

impl TextStream {
    /// Wrap any fragment stream
    pub fn new<S>(fragments: S) -> Self
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        Self {
            inner: Box::pin(fragments),
            finished: false,
        }
    }

    /// A stream yielding fixed fragments, then ending normally
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(fragments.into_iter().map(Ok)))
    }

    /// A stream with no fragments
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Wait for the first item so an immediate failure surfaces as `Err`
    ///
    /// On success the first fragment is put back in front of the rest.
    pub async fn primed(mut self) -> Result<Self> {
        match self.next().await {
            Some(Err(e)) => Err(e),
            Some(Ok(first)) => Ok(Self::new(stream::iter([Ok(first)]).chain(self))),
            None => Ok(Self::empty()),
        }
    }

    /// Drain the stream, keeping partial text if it ends with an error
    pub async fn collect_text(mut self) -> StreamOutcome {
        let mut text = String::new();
        while let Some(item) = self.next().await {
            match item {
                Ok(fragment) => text.push_str(&fragment),
                Err(e) => {
                    return StreamOutcome {
                        text,
                        error: Some(e),
                    }
                }
            }
        }
        StreamOutcome { text, error: None }
    }
}

impl Stream for TextStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(fragment))) if fragment.is_empty() => continue,
                Poll::Ready(Some(Ok(fragment))) => return Poll::Ready(Some(Ok(fragment))),
                Poll::Ready(Some(Err(e))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl fmt::Debug for TextStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStream")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
