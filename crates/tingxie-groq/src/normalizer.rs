//! [`TextNormalizer`] combining local script conversion and Groq translation.

use async_trait::async_trait;
use tingxie_transcription::TextNormalizer;
use tracing::warn;

use crate::script::ScriptConverter;
use crate::translator::GroqTranslator;

/// Converts Chinese locally and translates everything else through Groq.
///
/// Translations are passed through the converter as well, so Simplified
/// characters in model output still end up in the target script.
pub struct GroqTextNormalizer {
    converter: ScriptConverter,
    translator: GroqTranslator,
}

impl GroqTextNormalizer {
    /// Combine a converter and a translator.
    pub fn new(converter: ScriptConverter, translator: GroqTranslator) -> Self {
        Self {
            converter,
            translator,
        }
    }
}

#[async_trait]
impl TextNormalizer for GroqTextNormalizer {
    fn to_target_script(&self, text: &str) -> String {
        self.converter.convert(text)
    }

    async fn translate_to_target_script(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        match self.translator.translate(text).await {
            Ok(translated) => self.converter.convert(&translated),
            Err(error) => {
                warn!(%error, "translation failed, keeping original text");
                text.to_string()
            }
        }
    }
}
