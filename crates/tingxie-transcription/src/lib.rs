//! # tingxie-transcription
//!
//! Resilient chunked transcription against a rate-limited provider.
//!
//! - **Planner** ([`ChunkPlanner`]): splits sources over the upload limit into
//!   fixed-length WAV slices via a [`MediaTool`]
//! - **Pool** ([`CredentialPool`]): circular set of API keys shared by drivers
//! - **Driver** ([`ChunkDriver`]): per-chunk retry loop with key rotation,
//!   hint-based backoff and script routing
//! - **Assembler** ([`assemble`]): time-ordered merge of chunk outcomes
//! - **Session** ([`TranscriptionSession`]): ties the above together for one
//!   source, with cancellation and work-directory cleanup
//!
//! Providers are reached only through the [`Recognizer`], [`TextNormalizer`]
//! and [`MediaTool`] traits.

#![deny(unsafe_code)]

pub mod assembler;
pub mod driver;
pub mod errors;
pub mod ffmpeg;
pub mod planner;
pub mod pool;
pub mod ports;
pub mod session;
pub mod sleeper;

pub use assembler::{assemble, assemble_indexed};
pub use driver::ChunkDriver;
pub use errors::{DriverError, MediaError, PoolEmpty, SessionError};
pub use ffmpeg::FfmpegMediaTool;
pub use planner::ChunkPlanner;
pub use pool::CredentialPool;
pub use ports::{MediaTool, RecognitionRequest, Recognizer, TextNormalizer};
pub use session::{Collaborators, TranscriptionSession};
pub use sleeper::{Sleeper, TokioSleeper};
