//! The fixed language catalog and the selection keyboard layout.

/// Namespace prefix for language selection callback tokens, so other button
/// types the transport might deliver are never mistaken for a selection.
pub const SELECTION_PREFIX: &str = "lang_";

/// Prompt shown above the language keyboard.
pub const MENU_PROMPT: &str = "Choose the target language for translation:";

pub const BUTTONS_PER_ROW: usize = 3;

/// Ordered (display name, translation code) pairs. Display names double as
/// callback token payloads, so they must round-trip through Telegram's
/// callback data unchanged.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("English", "en"),
    ("French", "fr"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Spanish", "es"),
    ("German", "de"),
    ("Chinese", "zh-cn"),
    ("Russian", "ru"),
    ("Portuguese", "pt"),
    ("Korean", "ko"),
    ("Turkish", "tr"),
];

/// Translation codes whose speech-synthesis code differs.
const TTS_OVERRIDES: &[(&str, &str)] = &[("zh-cn", "zh")];

/// Translation code for a display name from the catalog.
pub fn code_for(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(display, _)| *display == name)
        .map(|(_, code)| *code)
}

/// Speech-synthesis code for a translation code. Identical except for the
/// entries in the override table.
pub fn tts_code(code: &str) -> &str {
    TTS_OVERRIDES
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| *to)
        .unwrap_or(code)
}

/// Callback token for a display name.
pub fn selection_token(name: &str) -> String {
    format!("{SELECTION_PREFIX}{name}")
}

/// Display name carried by a selection token, or None for any other token.
pub fn selection_name(token: &str) -> Option<&str> {
    token.strip_prefix(SELECTION_PREFIX)
}

/// Keyboard layout as rows of (label, token) pairs, three buttons per row.
pub fn keyboard_rows() -> Vec<Vec<(String, String)>> {
    LANGUAGES
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| {
            chunk
                .iter()
                .map(|(name, _)| (name.to_string(), selection_token(name)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_twelve_languages() {
        assert_eq!(LANGUAGES.len(), 12);
    }

    #[test]
    fn test_keyboard_is_four_full_rows_of_three() {
        let rows = keyboard_rows();
        assert_eq!(rows.len(), 4);
        for row in &rows {
            assert_eq!(row.len(), 3);
        }
    }

    #[test]
    fn test_keyboard_tokens_round_trip() {
        for row in keyboard_rows() {
            for (label, token) in row {
                assert_eq!(selection_name(&token), Some(label.as_str()));
                assert!(code_for(&label).is_some());
            }
        }
    }

    #[test]
    fn test_code_lookup() {
        assert_eq!(code_for("French"), Some("fr"));
        assert_eq!(code_for("Chinese"), Some("zh-cn"));
        assert_eq!(code_for("Klingon"), None);
    }

    #[test]
    fn test_tts_override_applies_to_chinese_only() {
        assert_eq!(tts_code("zh-cn"), "zh");
        for (_, code) in LANGUAGES.iter().filter(|(_, c)| *c != "zh-cn") {
            assert_eq!(tts_code(code), *code);
        }
    }

    #[test]
    fn test_selection_name_rejects_other_namespaces() {
        assert_eq!(selection_name("settings_French"), None);
        assert_eq!(selection_name("French"), None);
        assert_eq!(selection_name("lang_French"), Some("French"));
    }
}
