use agent_playground_macros::tool;
use serde::Deserialize;

/// Phrase -> (language code, translation)
const TRANSLATIONS: &[(&str, &[(&str, &str)])] = &[
    ("مرحبا", &[("en", "Hello"), ("fr", "Bonjour"), ("es", "Hola")]),
    ("شكرا", &[("en", "Thank you"), ("fr", "Merci"), ("es", "Gracias")]),
    ("وداعا", &[("en", "Goodbye"), ("fr", "Au revoir"), ("es", "Adiós")]),
];

/// Translate one of a handful of known phrases.
///
/// Both the phrase and the language code must match exactly; anything else
/// returns the fallback message.
pub fn translate(text: &str, target_lang: &str) -> String {
    TRANSLATIONS
        .iter()
        .find(|(phrase, _)| *phrase == text)
        .and_then(|(_, targets)| targets.iter().find(|(lang, _)| *lang == target_lang))
        .map(|(_, translation)| translation.to_string())
        .unwrap_or_else(|| {
            format!(
                "Translation not available for '{}' to {}",
                text, target_lang
            )
        })
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TranslateParams {
    /// The text to translate
    pub text: String,
    /// Target language code (en, ar, fr, es)
    pub target_lang: String,
}

tool!(
    name = "simple_translate",
    description = "Simple phrase translation from a small built-in dictionary",
    params = TranslateParams,
    |params: TranslateParams| async move {
        Ok(serde_json::Value::String(translate(
            &params.text,
            &params.target_lang,
        )))
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_phrases_translate() {
        assert_eq!(translate("مرحبا", "en"), "Hello");
        assert_eq!(translate("شكرا", "fr"), "Merci");
        assert_eq!(translate("وداعا", "es"), "Adiós");
    }

    #[test]
    fn misses_fall_back() {
        assert_eq!(
            translate("مرحبا", "de"),
            "Translation not available for 'مرحبا' to de"
        );
        assert_eq!(
            translate("hello", "en"),
            "Translation not available for 'hello' to en"
        );
    }
}
