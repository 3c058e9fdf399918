//! Static mapping between language codes, display names and speech locales.
//!
//! Both the short ISO codes and the FLORES-200 codes used by the NLLB
//! backends are covered. Lookups never fail: unknown codes map to themselves
//! (names) or to English (speech locales).

/// Sentinel selection asking the backend to detect the source language
pub const AUTO_DETECT: &str = "auto";

/// Locale used for speech synthesis when a code is unknown
pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub speech_locale: &'static str,
}

const fn lang(code: &'static str, name: &'static str, speech_locale: &'static str) -> Language {
    Language { code, name, speech_locale }
}

static LANGUAGES: &[Language] = &[
    lang(AUTO_DETECT, "Auto-detect", DEFAULT_SPEECH_LOCALE),
    // Primary pair
    lang("en", "English", "en-US"),
    lang("de", "German", "de-DE"),
    lang("eng_Latn", "English", "en-US"),
    lang("deu_Latn", "German", "de-DE"),
    // FLORES-200 codes served by the NLLB models
    lang("fra_Latn", "French", "fr-FR"),
    lang("spa_Latn", "Spanish", "es-ES"),
    lang("ita_Latn", "Italian", "it-IT"),
    lang("por_Latn", "Portuguese", "pt-PT"),
    lang("rus_Cyrl", "Russian", "ru-RU"),
    lang("jpn_Jpan", "Japanese", "ja-JP"),
    lang("kor_Hang", "Korean", "ko-KR"),
    lang("zho_Hans", "Chinese (Simplified)", "zh-CN"),
    // Short codes
    lang("fr", "French", "fr-FR"),
    lang("es", "Spanish", "es-ES"),
    lang("it", "Italian", "it-IT"),
    lang("pt", "Portuguese", "pt-PT"),
    lang("ru", "Russian", "ru-RU"),
    lang("ja", "Japanese", "ja-JP"),
    lang("ko", "Korean", "ko-KR"),
    lang("zh", "Chinese (Simplified)", "zh-CN"),
    lang("nl", "Dutch", "nl-NL"),
    lang("pl", "Polish", "pl-PL"),
    lang("tr", "Turkish", "tr-TR"),
    lang("ar", "Arabic", "ar-SA"),
    lang("hi", "Hindi", "hi-IN"),
    lang("sv", "Swedish", "sv-SE"),
];

pub struct LanguageCatalog;

impl LanguageCatalog {
    /// Every known entry, auto sentinel first
    pub fn all() -> &'static [Language] {
        LANGUAGES
    }

    pub fn lookup(code: &str) -> Option<&'static Language> {
        LANGUAGES.iter().find(|l| l.code == code)
    }

    /// Empty selections count as auto-detect
    pub fn is_auto(code: &str) -> bool {
        let code = code.trim();
        code.is_empty() || code.eq_ignore_ascii_case(AUTO_DETECT)
    }

    /// Display name for a code; unknown codes come back unchanged
    pub fn name_of(code: &str) -> String {
        match Self::lookup(code) {
            Some(language) => language.name.to_string(),
            None => code.to_string(),
        }
    }

    /// BCP-47 tag for speech synthesis; unknown codes get English
    pub fn speech_locale_of(code: &str) -> &'static str {
        Self::lookup(code)
            .map(|l| l.speech_locale)
            .unwrap_or(DEFAULT_SPEECH_LOCALE)
    }

    /// Accept a code or a display name (case-insensitive) and return the
    /// canonical code. Display names resolve to the short code.
    pub fn resolve(input: &str) -> Option<&'static str> {
        let input = input.trim();
        if Self::is_auto(input) {
            return Some(AUTO_DETECT);
        }
        LANGUAGES
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(input))
            .or_else(|| LANGUAGES.iter().find(|l| l.name.eq_ignore_ascii_case(input)))
            .map(|l| l.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_of_known_codes() {
        assert_eq!(LanguageCatalog::name_of("de"), "German");
        assert_eq!(LanguageCatalog::name_of("deu_Latn"), "German");
        assert_eq!(LanguageCatalog::name_of("eng_Latn"), "English");
        assert_eq!(LanguageCatalog::name_of("auto"), "Auto-detect");
    }

    #[test]
    fn test_name_of_is_total() {
        for code in ["", "xx", "klingon", "ÄÖÜ", "en-GB", "   "] {
            assert_eq!(LanguageCatalog::name_of(code), code);
        }
    }

    #[test]
    fn test_speech_locale_falls_back_to_english() {
        assert_eq!(LanguageCatalog::speech_locale_of("de"), "de-DE");
        assert_eq!(LanguageCatalog::speech_locale_of("zho_Hans"), "zh-CN");
        assert_eq!(LanguageCatalog::speech_locale_of("tlh"), DEFAULT_SPEECH_LOCALE);
        assert_eq!(LanguageCatalog::speech_locale_of(""), DEFAULT_SPEECH_LOCALE);
    }

    #[test]
    fn test_is_auto() {
        assert!(LanguageCatalog::is_auto(""));
        assert!(LanguageCatalog::is_auto("  "));
        assert!(LanguageCatalog::is_auto("AUTO"));
        assert!(!LanguageCatalog::is_auto("en"));
    }

    #[test]
    fn test_resolve_accepts_names_and_codes() {
        assert_eq!(LanguageCatalog::resolve("German"), Some("de"));
        assert_eq!(LanguageCatalog::resolve("german"), Some("de"));
        assert_eq!(LanguageCatalog::resolve("DEU_LATN"), Some("deu_Latn"));
        assert_eq!(LanguageCatalog::resolve(""), Some(AUTO_DETECT));
        assert_eq!(LanguageCatalog::resolve("Elvish"), None);
    }
}
