//! # tingxie-groq
//!
//! Boundary adapters for Groq's OpenAI-compatible API.
//!
//! - [`GroqRecognizer`]: Whisper transcription (`verbose_json`) as a
//!   [`Recognizer`](tingxie_transcription::Recognizer)
//! - [`GroqTranslator`]: chat-completions translation into Taiwan Traditional Chinese
//! - [`ScriptConverter`]: local Simplified→Traditional conversion
//! - [`GroqTextNormalizer`]: the two above as a
//!   [`TextNormalizer`](tingxie_transcription::TextNormalizer)

#![deny(unsafe_code)]

pub mod client;
pub mod error_parsing;
pub mod errors;
pub mod normalizer;
pub mod recognizer;
pub mod script;
pub mod translator;

pub use client::GroqClient;
pub use errors::GroqError;
pub use normalizer::GroqTextNormalizer;
pub use recognizer::GroqRecognizer;
pub use script::ScriptConverter;
pub use translator::GroqTranslator;
