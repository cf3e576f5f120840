//! Newline-delimited JSON bodies for streamed answers

use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;

use crate::generation::TextStream;
use crate::types::StreamEvent;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Map fragments to `delta` events, ending with exactly one `done` or `error`
pub fn fragment_events(fragments: TextStream) -> impl Stream<Item = StreamEvent> + Send {
    stream::unfold(Some(fragments), |state| async move {
        let Some(mut fragments) = state else {
            return None;
        };
        match fragments.next().await {
            Some(Ok(text)) => Some((StreamEvent::Delta { text }, Some(fragments))),
            Some(Err(e)) => {
                tracing::warn!("Stream ended early: {}", e);
                let event = StreamEvent::Error {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                };
                Some((event, None))
            }
            None => Some((StreamEvent::Done, None)),
        }
    })
}

/// Streaming response; the body is pulled only as fast as the client reads
///
/// When the client disconnects the body is dropped, which drops the
/// provider stream behind it.
pub fn ndjson_response(lead: Option<StreamEvent>, fragments: TextStream) -> Response {
    let lines = stream::iter(lead)
        .chain(fragment_events(fragments))
        .map(|event| Ok::<_, Infallible>(Bytes::from(event.to_line())));

    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}
