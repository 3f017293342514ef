//! # tingxie-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TingxieSettings::default()`]
//! 2. **Settings file**: `~/.tingxie/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `GROQ_API_KEY(S)` and `TINGXIE_*` overrides
//!
//! The loaded value is passed explicitly to whatever needs it; the CLI loads
//! it once at startup.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    RejectedOverride, apply_env_overrides, apply_overrides, deep_merge, load_settings,
    load_settings_from_path, load_settings_with_report, settings_path,
};
pub use types::*;
