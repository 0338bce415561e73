//! Typed view of the NDJSON lines emitted by the run endpoint.

use serde_json::Value;
use strum::EnumString;

/// Discriminator carried in the `event` key.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum EventKind {
    #[strum(serialize = "run.started")]
    RunStarted,
    #[strum(serialize = "message.delta")]
    MessageDelta,
    #[strum(serialize = "message.completed")]
    MessageCompleted,
    #[strum(default)]
    Other(String),
}

/// Thread and run ids seen on a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunIds {
    pub thread_id: Option<String>,
    pub run_id: Option<String>,
}

/// Payload of a recognized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    RunStarted,
    /// Incremental content. `None` when the line carried no text.
    MessageDelta { fragment: Option<String> },
    /// Final content. `None` when the line carried no text.
    MessageCompleted { content: Option<String> },
    /// Valid JSON with an unrecognized shape.
    Other { event: Option<String> },
}

/// One decoded stream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub ids: RunIds,
    pub payload: EventPayload,
}

/// Why a line produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseSkip {
    Blank,
    NotJson(String),
    NotAnObject,
}

impl StreamEvent {
    /// Parse one line. Never panics; garbage yields a [`ParseSkip`].
    pub fn parse_line(line: &str) -> Result<Self, ParseSkip> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseSkip::Blank);
        }
        let value: Value =
            serde_json::from_str(line).map_err(|err| ParseSkip::NotJson(err.to_string()))?;
        Self::from_value(&value)
    }

    /// Classify an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ParseSkip> {
        let object = value.as_object().ok_or(ParseSkip::NotAnObject)?;
        // Fields live under `data` when present, otherwise at the top level.
        let scope = object.get("data").filter(|d| d.is_object()).unwrap_or(value);

        let kind = match object.get("event").and_then(Value::as_str) {
            Some(tag) => tag
                .parse::<EventKind>()
                .unwrap_or_else(|_| EventKind::Other(tag.to_string())),
            None => infer_kind(scope),
        };

        let payload = match kind {
            EventKind::RunStarted => EventPayload::RunStarted,
            EventKind::MessageDelta => EventPayload::MessageDelta {
                fragment: delta_fragment(scope),
            },
            EventKind::MessageCompleted => EventPayload::MessageCompleted {
                content: completed_content(scope),
            },
            EventKind::Other(tag) => EventPayload::Other {
                event: (!tag.is_empty()).then_some(tag),
            },
        };

        let ids = RunIds {
            thread_id: id_field(scope, value, "thread_id"),
            run_id: id_field(scope, value, "run_id"),
        };

        Ok(Self { ids, payload })
    }
}

fn infer_kind(scope: &Value) -> EventKind {
    if scope.get("delta").is_some() {
        EventKind::MessageDelta
    } else if scope.get("run_id").is_some() {
        EventKind::RunStarted
    } else {
        EventKind::Other(String::new())
    }
}

fn id_field(scope: &Value, root: &Value, key: &str) -> Option<String> {
    let read = |v: &Value| {
        v.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    read(scope).or_else(|| read(root))
}

/// `content`, then `delta.content`, then `text`; the first that yields text wins.
fn delta_fragment(scope: &Value) -> Option<String> {
    scope
        .get("content")
        .and_then(content_text)
        .or_else(|| {
            scope
                .get("delta")
                .and_then(|delta| delta.get("content"))
                .and_then(content_text)
        })
        .or_else(|| scope.get("text").and_then(content_text))
}

fn completed_content(scope: &Value) -> Option<String> {
    scope.get("content").and_then(content_text).or_else(|| {
        scope
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(content_text)
    })
}

/// Text of a content value: a plain string, an item with `text`, or an
/// array of either (concatenated in order).
fn content_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(item) => item.get("text").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(content_text).collect();
            (!parts.is_empty()).then(|| parts.concat())
        }
        _ => None,
    }
}
