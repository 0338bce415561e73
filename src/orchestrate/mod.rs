//! Agent runs against the orchestration API: wire helpers, stream
//! decoding and the runner that composes them.

pub mod decoder;
pub mod events;
pub mod http;
pub mod result;
pub mod runner;
pub mod threads;

pub use decoder::{DecodedRun, StreamDecoder};
pub use events::{EventKind, EventPayload, ParseSkip, RunIds, StreamEvent};
pub use result::RunResult;
pub use runner::{AgentRunner, RunRequest};
pub use threads::ThreadRegistry;
