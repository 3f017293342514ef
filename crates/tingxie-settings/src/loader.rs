//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TingxieSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::TingxieSettings;

/// Resolve the default settings file (`~/.tingxie/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tingxie").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TingxieSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error. The result is
/// validated before it is returned. Rejected env overrides are logged here;
/// use [`load_settings_with_report`] to log them later instead.
pub fn load_settings_from_path(path: &Path) -> Result<TingxieSettings> {
    let (settings, rejected) = load_settings_with_report(path)?;
    for r in &rejected {
        r.log();
    }
    Ok(settings)
}

/// Like [`load_settings_from_path`], but returns the rejected env overrides
/// instead of logging them.
///
/// The binary loads settings before its subscriber exists, so it reports
/// these once logging is up.
pub fn load_settings_with_report(path: &Path) -> Result<(TingxieSettings, Vec<RejectedOverride>)> {
    let defaults = serde_json::to_value(TingxieSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: TingxieSettings = serde_json::from_value(merged)?;
    let rejected = apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok((settings, rejected))
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// An env override that was set but could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedOverride {
    /// Variable name.
    pub name: String,
    /// Raw value as found.
    pub value: String,
    /// What the variable accepts, e.g. `integer in 1..=64`.
    pub expected: String,
}

impl RejectedOverride {
    /// Emit the warning for this override.
    pub fn log(&self) {
        warn!(
            key = %self.name,
            value = %self.value,
            expected = %self.expected,
            "invalid env var, ignoring"
        );
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(settings: &mut TingxieSettings) -> Vec<RejectedOverride> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Apply overrides from any variable source.
///
/// Invalid values leave the file/default value in place and are returned.
/// `GROQ_API_KEYS` (comma-separated) replaces the configured key list;
/// `GROQ_API_KEY` is then placed first if it is not already present.
pub fn apply_overrides<F>(settings: &mut TingxieSettings, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvReader {
        lookup,
        rejected: Vec::new(),
    };

    // ── Credentials ─────────────────────────────────────────────────
    if let Some(list) = env.string("GROQ_API_KEYS") {
        settings.groq.api_keys = split_keys(&list);
    }
    if let Some(key) = env.string("GROQ_API_KEY") {
        let key = key.trim().to_string();
        if !settings.groq.api_keys.iter().any(|k| k.trim() == key) {
            settings.groq.api_keys.insert(0, key);
        }
    }

    // ── Provider ────────────────────────────────────────────────────
    if let Some(v) = env.string("TINGXIE_GROQ_BASE_URL") {
        settings.groq.base_url = v;
    }
    if let Some(v) = env.string("TINGXIE_WHISPER_MODEL") {
        settings.groq.whisper_model = v;
    }
    if let Some(v) = env.string("TINGXIE_TRANSLATION_MODEL") {
        settings.groq.translation_model = v;
    }

    // ── Transcription ───────────────────────────────────────────────
    let t = &mut settings.transcription;
    if let Some(v) = env.u64("TINGXIE_MAX_UPLOAD_BYTES", 1024, 10 * 1024 * 1024 * 1024) {
        t.max_upload_bytes = v;
    }
    if let Some(v) = env.u64("TINGXIE_CHUNK_SECS", 1, 24 * 3600) {
        t.chunk_duration_secs = v;
    }
    if let Some(v) = env.u64("TINGXIE_MAX_ATTEMPTS", 1, 1000) {
        t.max_attempts = v as u32;
    }
    if let Some(v) = env.u64("TINGXIE_CONCURRENCY", 1, 64) {
        t.concurrency = v as usize;
    }
    if let Some(v) = env.bool("TINGXIE_TRANSLATE_SEGMENTS") {
        t.translate_segments = v;
    }
    if let Some(v) = env.string("TINGXIE_FFMPEG") {
        t.ffmpeg_path = v;
    }
    if let Some(v) = env.string("TINGXIE_FFPROBE") {
        t.ffprobe_path = v;
    }
    if let Some(v) = env.string("TINGXIE_TEMP_DIR") {
        t.temp_dir = Some(PathBuf::from(v));
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("TINGXIE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("TINGXIE_LOG_JSON") {
        settings.logging.json = v;
    }

    env.rejected
}

fn split_keys(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Variable readers ────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
    rejected: Vec<RejectedOverride>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn bool(&mut self, name: &str) -> Option<bool> {
        let val = self.string(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            self.reject(name, val, "boolean".to_string());
        }
        result
    }

    fn u64(&mut self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            self.reject(name, val, format!("integer in {min}..={max}"));
        }
        result
    }

    fn reject(&mut self, name: &str, value: String, expected: String) {
        self.rejected.push(RejectedOverride {
            name: name.to_string(),
            value,
            expected,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn apply(
        settings: &mut TingxieSettings,
        env: &HashMap<String, String>,
    ) -> Vec<RejectedOverride> {
        apply_overrides(settings, |k| env.get(k).cloned())
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"groq": {"baseUrl": "a", "whisperModel": "m"}});
        let source = serde_json::json!({"groq": {"baseUrl": "b"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["groq"]["baseUrl"], "b");
        assert_eq!(merged["groq"]["whisperModel"], "m");
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"keys": [1, 2, 3]});
        let source = serde_json::json!({"keys": [4]});
        assert_eq!(deep_merge(target, source)["keys"], serde_json::json!([4]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null});
        assert_eq!(deep_merge(target, source)["a"], 1);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.transcription.chunk_duration_secs, 600);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"transcription": {"chunkDurationSecs": 300, "tempDir": "/scratch"}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.transcription.chunk_duration_secs, 300);
        assert_eq!(
            settings.transcription.temp_dir.as_deref(),
            Some(Path::new("/scratch"))
        );
        assert_eq!(settings.transcription.max_attempts, 10);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn unreadable_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let err = load_settings_from_path(dir.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Read { ref path, .. } if path == dir.path()));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"transcription": {"maxAttempts": 0}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue { field: "transcription.maxAttempts", .. }
        ));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn key_list_replaces_file_keys() {
        let mut s = TingxieSettings::default();
        s.groq.api_keys = vec!["from_file".into()];
        let _ = apply(&mut s, &vars(&[("GROQ_API_KEYS", "k1, k2,,k3")]));
        assert_eq!(s.groq.api_keys, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn single_key_goes_first() {
        let mut s = TingxieSettings::default();
        s.groq.api_keys = vec!["k2".into()];
        let _ = apply(&mut s, &vars(&[("GROQ_API_KEY", "k1")]));
        assert_eq!(s.groq.api_keys, vec!["k1", "k2"]);
    }

    #[test]
    fn single_key_not_duplicated() {
        let mut s = TingxieSettings::default();
        let _ = apply(
            &mut s,
            &vars(&[("GROQ_API_KEYS", "k1,k2"), ("GROQ_API_KEY", "k2")]),
        );
        assert_eq!(s.groq.api_keys, vec!["k1", "k2"]);
    }

    #[test]
    fn numeric_and_bool_overrides() {
        let mut s = TingxieSettings::default();
        let _ = apply(
            &mut s,
            &vars(&[
                ("TINGXIE_CHUNK_SECS", "120"),
                ("TINGXIE_CONCURRENCY", "4"),
                ("TINGXIE_TRANSLATE_SEGMENTS", "yes"),
                ("TINGXIE_LOG_JSON", "on"),
            ]),
        );
        assert_eq!(s.transcription.chunk_duration_secs, 120);
        assert_eq!(s.transcription.concurrency, 4);
        assert!(s.transcription.translate_segments);
        assert!(s.logging.json);
    }

    #[test]
    fn invalid_values_are_ignored_and_reported() {
        let mut s = TingxieSettings::default();
        let rejected = apply(
            &mut s,
            &vars(&[
                ("TINGXIE_CHUNK_SECS", "0"),
                ("TINGXIE_MAX_ATTEMPTS", "lots"),
                ("TINGXIE_LOG_JSON", "maybe"),
            ]),
        );
        assert_eq!(s.transcription.chunk_duration_secs, 600);
        assert_eq!(s.transcription.max_attempts, 10);
        assert!(!s.logging.json);

        let names: Vec<&str> = rejected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["TINGXIE_CHUNK_SECS", "TINGXIE_MAX_ATTEMPTS", "TINGXIE_LOG_JSON"]
        );
        assert_eq!(rejected[0].value, "0");
        assert_eq!(rejected[0].expected, "integer in 1..=86400");
        assert_eq!(rejected[2].expected, "boolean");
    }

    #[test]
    fn valid_overrides_report_nothing() {
        let mut s = TingxieSettings::default();
        let rejected = apply(&mut s, &vars(&[("TINGXIE_CONCURRENCY", "8")]));
        assert!(rejected.is_empty());
    }

    #[test]
    fn rejected_override_logs_warning() {
        let (logs, _guard) = tingxie_core::logging::capture_logs();
        RejectedOverride {
            name: "TINGXIE_CONCURRENCY".into(),
            value: "999".into(),
            expected: "integer in 1..=64".into(),
        }
        .log();

        assert!(logs.has_event(tracing::Level::WARN, "invalid env var, ignoring"));
        let event = &logs.events()[0];
        assert_eq!(event.field("key"), Some("TINGXIE_CONCURRENCY"));
        assert_eq!(event.field("value"), Some("999"));
    }

    #[test]
    fn blank_strings_are_ignored() {
        let mut s = TingxieSettings::default();
        let _ = apply(&mut s, &vars(&[("TINGXIE_FFMPEG", "  ")]));
        assert_eq!(s.transcription.ffmpeg_path, "ffmpeg");
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in ["true", "1", "yes", "ON"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn parse_u64_bounds() {
        assert_eq!(parse_u64_range("10", 1, 10), Some(10));
        assert_eq!(parse_u64_range("0", 1, 10), None);
        assert_eq!(parse_u64_range("11", 1, 10), None);
        assert_eq!(parse_u64_range("x", 1, 10), None);
    }
}
