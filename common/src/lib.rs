//! Wire types shared by the gateway, pipeline and ingest services.
//!
//! Every service talks to the others over HTTP/JSON — there is no shared
//! mutable state between processes — so this crate is the single source of
//! truth for what goes over the wire.

pub mod context;
pub mod job;
pub mod pii;
pub mod profile;
pub mod segment;
pub mod session;

pub use context::{ContextProfile, ContextProfileName};
pub use job::{JobRecord, JobStatus, PipelineStep};
pub use pii::PiiFlag;
pub use profile::{Backend, TranscriptionProfile};
pub use segment::{Segment, Word};
pub use session::SessionMetadata;
