//! # tingxie-core
//!
//! Shared vocabulary for the tingxie transcription workspace.
//!
//! - **Types**: [`Credential`], [`AudioChunk`], [`Segment`], [`RecognitionResult`],
//!   [`ChunkOutcome`], [`Transcript`]
//! - **Errors**: [`RecognitionError`] and the [`FailureClass`] it is classified into
//! - **Retry**: [`retry::parse_retry_after`] and the [`RetryPolicy`] timings
//! - **Script routing**: [`script::classify`] decides normalize vs. translate
//! - **Logging**: subscriber setup and an in-memory capture helper for tests

#![deny(unsafe_code)]

pub mod errors;
pub mod logging;
pub mod retry;
pub mod script;
pub mod types;

pub use errors::{FailureClass, RecognitionError};
pub use retry::RetryPolicy;
pub use script::ScriptRoute;
pub use types::{
    AudioChunk, ChunkOutcome, Credential, RecognitionResult, Segment, Transcript,
    UNKNOWN_LANGUAGE,
};
