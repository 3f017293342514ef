//! Simplified→Traditional script conversion.

use tracing::warn;
use zhconv::{Variant, zhconv};

/// Converts Chinese text into one target script variant.
#[derive(Clone, Debug)]
pub struct ScriptConverter {
    target: Variant,
}

impl ScriptConverter {
    /// Target a variant by tag (`zh-TW`, `zh-HK`, `zh-Hant`, ...).
    ///
    /// Unknown tags fall back to `zh-TW`.
    pub fn new(target: &str) -> Self {
        let target = target.parse::<Variant>().unwrap_or_else(|_| {
            warn!(variant = target, "unknown script variant, using zh-TW");
            Variant::ZhTW
        });
        Self { target }
    }

    /// Convert `text`; characters with no mapping pass through unchanged.
    pub fn convert(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        zhconv(text, self.target)
    }
}

impl Default for ScriptConverter {
    fn default() -> Self {
        Self {
            target: Variant::ZhTW,
        }
    }
}
