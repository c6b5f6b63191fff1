//! Locale resolution.
//!
//! Maps a `language_COUNTRY` locale string onto the keyboard's language,
//! region and layout. Chinese, Korean and Taiwanese rules are only active
//! with the `cjk-regions` feature: the system keyboard crashes on them.

use cafe_types::swkbd::{Language, Region};

/// Split a locale into `(language, country)`.
///
/// Language is up to two lowercase letters, country up to two uppercase
/// letters after an underscore. Either half may be empty. Matching is
/// case-strict and `C` (the POSIX locale) carries no language.
pub fn parse_locale(locale: &str) -> (&str, &str) {
    let bytes = locale.as_bytes();
    let lang_len = bytes
        .iter()
        .take(2)
        .take_while(|&&b| b.is_ascii_lowercase() || b == b'C')
        .count();
    if lang_len == 0 {
        return ("", "");
    }
    let language = &locale[..lang_len];
    if language.contains('C') {
        return ("", "");
    }
    if bytes.get(lang_len) != Some(&b'_') {
        return (language, "");
    }
    let start = lang_len + 1;
    let country_len = bytes[start..]
        .iter()
        .take(2)
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    (language, &locale[start..start + country_len])
}

/// Keyboard language for an ISO 639 language code.
#[cfg_attr(not(feature = "cjk-regions"), allow(unused_variables))]
pub fn to_language(language: &str, country: &str) -> Option<Language> {
    match language {
        "ja" => Some(Language::Japanese),
        "en" => Some(Language::English),
        "fr" => Some(Language::French),
        "de" => Some(Language::German),
        "it" => Some(Language::Italian),
        "es" => Some(Language::Spanish),
        #[cfg(feature = "cjk-regions")]
        "zh" => match country {
            "CN" => Some(Language::SimplifiedChinese),
            _ => Some(Language::TraditionalChinese),
        },
        #[cfg(feature = "cjk-regions")]
        "ko" => Some(Language::Korean),
        "nl" => Some(Language::Dutch),
        "pt" => Some(Language::Portuguese),
        "ru" => Some(Language::Russian),
        _ => None,
    }
}

const USA_COUNTRIES: [&str; 4] = ["US", "CA", "MX", "BR"];
const EUROPE_COUNTRIES: [&str; 8] = ["DE", "ES", "FR", "GB", "IT", "NL", "PT", "RU"];
const EUROPE_LANGUAGES: [&str; 7] = ["de", "es", "fr", "it", "nl", "pt", "ru"];

/// Keyboard region, decided by country first and language second.
pub fn to_region(language: &str, country: &str) -> Option<Region> {
    if country == "JP" {
        return Some(Region::Japan);
    }
    if USA_COUNTRIES.contains(&country) {
        return Some(Region::Usa);
    }
    if EUROPE_COUNTRIES.contains(&country) {
        return Some(Region::Europe);
    }
    #[cfg(feature = "cjk-regions")]
    match country {
        "CN" => return Some(Region::China),
        "KR" | "KP" => return Some(Region::Korea),
        "TW" => return Some(Region::Taiwan),
        _ => {},
    }

    match language {
        "ja" => Some(Region::Japan),
        "en" => Some(Region::Usa),
        l if EUROPE_LANGUAGES.contains(&l) => Some(Region::Europe),
        #[cfg(feature = "cjk-regions")]
        "zh" => Some(Region::China),
        #[cfg(feature = "cjk-regions")]
        "ko" => Some(Region::Korea),
        _ => None,
    }
}

/// Layout id for the keyboard's layout field.
pub fn to_keyboard_layout(language: Language, region: Region) -> u32 {
    let usa = region == Region::Usa;
    match language {
        Language::Japanese => 0,
        Language::English if usa => 1,
        Language::English => 5,
        Language::French if usa => 2,
        Language::French => 6,
        Language::German => 7,
        Language::Italian => 8,
        Language::Spanish if usa => 3,
        Language::Spanish => 9,
        Language::Dutch => 10,
        Language::Portuguese if usa => 4,
        Language::Portuguese => 11,
        Language::Russian => 12,
        _ => 19,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_laws() {
        assert_eq!(parse_locale("en_US"), ("en", "US"));
        assert_eq!(parse_locale("en"), ("en", ""));
        assert_eq!(parse_locale("C"), ("", ""));
        assert_eq!(parse_locale(""), ("", ""));
        assert_eq!(parse_locale("EN_us"), ("", ""));
    }

    #[test]
    fn parse_partial_forms() {
        assert_eq!(parse_locale("pt_BR.UTF-8"), ("pt", "BR"));
        assert_eq!(parse_locale("en_us"), ("en", ""));
        assert_eq!(parse_locale("e"), ("e", ""));
        assert_eq!(parse_locale("en-US"), ("en", ""));
        assert_eq!(parse_locale("eng_GBR"), ("en", ""));
        assert_eq!(parse_locale("de_D"), ("de", "D"));
        assert_eq!(parse_locale("C.UTF-8"), ("", ""));
    }

    #[test]
    fn languages() {
        assert_eq!(to_language("ja", "JP"), Some(Language::Japanese));
        assert_eq!(to_language("en", ""), Some(Language::English));
        assert_eq!(to_language("pt", "BR"), Some(Language::Portuguese));
        assert_eq!(to_language("ru", ""), Some(Language::Russian));
        assert_eq!(to_language("xx", "US"), None);
        assert_eq!(to_language("", ""), None);
    }

    #[cfg(not(feature = "cjk-regions"))]
    #[test]
    fn cjk_rules_are_off() {
        assert_eq!(to_language("zh", "TW"), None);
        assert_eq!(to_language("ko", ""), None);
        assert_eq!(to_region("zh", "TW"), None);
        assert_eq!(to_region("ko", "KR"), None);
        assert_eq!(to_region("", "CN"), None);
    }

    #[cfg(feature = "cjk-regions")]
    #[test]
    fn cjk_rules_when_enabled() {
        assert_eq!(to_language("zh", "CN"), Some(Language::SimplifiedChinese));
        assert_eq!(to_language("zh", ""), Some(Language::TraditionalChinese));
        assert_eq!(to_region("zh", "TW"), Some(Region::Taiwan));
        assert_eq!(to_region("ko", ""), Some(Region::Korea));
    }

    #[test]
    fn regions() {
        assert_eq!(to_region("pt", "BR"), Some(Region::Usa));
        assert_eq!(to_region("pt", ""), Some(Region::Europe));
        assert_eq!(to_region("ja", ""), Some(Region::Japan));
        assert_eq!(to_region("en", "GB"), Some(Region::Europe));
        assert_eq!(to_region("fr", "CA"), Some(Region::Usa));
        assert_eq!(to_region("xx", "JP"), Some(Region::Japan));
        assert_eq!(to_region("en", ""), Some(Region::Usa));
        assert_eq!(to_region("", ""), None);
    }

    #[test]
    fn layouts() {
        assert_eq!(to_keyboard_layout(Language::English, Region::Usa), 1);
        assert_eq!(to_keyboard_layout(Language::English, Region::Europe), 5);
        assert_eq!(to_keyboard_layout(Language::Japanese, Region::Usa), 0);
        assert_eq!(to_keyboard_layout(Language::Japanese, Region::Japan), 0);
        assert_eq!(to_keyboard_layout(Language::Russian, Region::Usa), 12);
        assert_eq!(to_keyboard_layout(Language::Portuguese, Region::Usa), 4);
        assert_eq!(to_keyboard_layout(Language::Portuguese, Region::Europe), 11);
        assert_eq!(to_keyboard_layout(Language::Korean, Region::Korea), 19);
        assert_eq!(to_keyboard_layout(Language::TraditionalChinese, Region::Europe), 19);
    }

    proptest! {
        #[test]
        fn parse_never_panics_and_stays_short(s in "\\PC{0,8}") {
            let (lang, country) = parse_locale(&s);
            prop_assert!(lang.len() <= 2);
            prop_assert!(country.len() <= 2);
            prop_assert!(lang.bytes().all(|b| b.is_ascii_lowercase()));
            prop_assert!(country.bytes().all(|b| b.is_ascii_uppercase()));
        }
    }
}
