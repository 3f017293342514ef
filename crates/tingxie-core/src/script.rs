//! Script routing: normalize Chinese text, translate everything else.

/// Which text transform a recognized chunk goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptRoute {
    /// Already Chinese: convert between script variants (simplified → traditional).
    Normalize,
    /// Foreign language: translate into the target script.
    Translate,
}

/// Whether `text` contains at least one CJK Unified Ideograph (U+4E00–U+9FFF).
pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Whether a detected-language tag names Chinese.
///
/// Accepts `zh`, `chinese`, and regional tags such as `zh-TW` or `zh_CN`,
/// case-insensitively.
pub fn is_chinese_language(language: &str) -> bool {
    let lower = language.trim().to_ascii_lowercase();
    lower == "zh"
        || lower == "chinese"
        || lower.starts_with("zh-")
        || lower.starts_with("zh_")
}

/// Pick the route for a recognized chunk.
///
/// Either signal is enough: the provider's language tag, or Chinese
/// characters in the text (providers often report `unknown` for short clips).
pub fn classify(language: &str, text: &str) -> ScriptRoute {
    if is_chinese_language(language) || contains_chinese(text) {
        ScriptRoute::Normalize
    } else {
        ScriptRoute::Translate
    }
}
