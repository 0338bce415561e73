//! Reduce an NDJSON run body to thread id, run id and content.

use std::ops::ControlFlow;

use tracing::trace;

use super::events::{EventPayload, StreamEvent};

/// Output of decoding one run body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRun {
    pub thread_id: Option<String>,
    pub run_id: Option<String>,
    pub content: String,
}

/// Line-at-a-time fold over stream events.
///
/// Decoding is total: malformed lines are skipped and an unrecognized
/// body falls back to the raw text as content.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    thread_id: Option<String>,
    run_id: Option<String>,
    content: String,
    extracted: bool,
    completed: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a complete body.
    pub fn decode(body: &str) -> DecodedRun {
        let mut decoder = Self::new();
        for line in body.lines() {
            if decoder.feed_line(line).is_break() {
                break;
            }
        }
        decoder.finish(body)
    }

    /// Feed one line. Breaks once a completed event has fixed the content.
    pub fn feed_line(&mut self, line: &str) -> ControlFlow<()> {
        if self.completed {
            return ControlFlow::Break(());
        }
        match StreamEvent::parse_line(line) {
            Ok(event) => self.apply(event),
            Err(skip) => {
                trace!(?skip, "skipping stream line");
                ControlFlow::Continue(())
            }
        }
    }

    /// Fold one event into the decoder state.
    pub fn apply(&mut self, event: StreamEvent) -> ControlFlow<()> {
        if event.ids.thread_id.is_some() {
            self.thread_id = event.ids.thread_id;
        }
        if event.ids.run_id.is_some() {
            self.run_id = event.ids.run_id;
        }

        match event.payload {
            EventPayload::MessageDelta {
                fragment: Some(fragment),
            } => {
                self.content.push_str(&fragment);
                self.extracted = true;
            }
            EventPayload::MessageCompleted {
                content: Some(content),
            } => {
                self.content = content;
                self.extracted = true;
                self.completed = true;
                return ControlFlow::Break(());
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    /// Whether a completed event has fixed the content.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Finish decoding. `raw` is used as content when nothing was extracted.
    pub fn finish(self, raw: &str) -> DecodedRun {
        let content = if self.extracted {
            self.content
        } else {
            raw.to_string()
        };
        DecodedRun {
            thread_id: self.thread_id,
            run_id: self.run_id,
            content,
        }
    }
}
