//! Template languages: names, script direction, detection and greetings.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    /// English name.
    pub name: &'static str,
    pub native_name: &'static str,
    /// Salutation with a `{name}` placeholder.
    greeting: &'static str,
    /// Salutation when the recipient is unknown.
    generic_greeting: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    lang("zh-CN", "Chinese (Simplified)", "简体中文", "尊敬的{name}：", "尊敬的用户："),
    lang("en", "English", "English", "Dear {name},", "Dear User,"),
    lang("ja", "Japanese", "日本語", "{name}様、", "お客様、"),
    lang("ko", "Korean", "한국어", "{name}님께,", "사용자님께,"),
    lang("fr", "French", "Français", "Cher {name},", "Cher utilisateur,"),
    lang("de", "German", "Deutsch", "Sehr geehrte(r) {name},", "Sehr geehrter Benutzer,"),
    lang("es", "Spanish", "Español", "Estimado/a {name}:", "Estimado/a usuario/a:"),
    lang("pt", "Portuguese", "Português", "Prezado(a) {name},", "Prezado(a) usuário(a),"),
    lang("it", "Italian", "Italiano", "Gentile {name},", "Gentile utente,"),
    lang("ru", "Russian", "Русский", "Уважаемый(ая) {name},", "Уважаемый пользователь,"),
    lang("ar", "Arabic", "العربية", "عزيزي {name}،", "عزيزي المستخدم،"),
    lang("hi", "Hindi", "हिन्दी", "प्रिय {name},", "प्रिय उपयोगकर्ता,"),
    lang("th", "Thai", "ไทย", "เรียน {name},", "เรียนผู้ใช้,"),
    lang("vi", "Vietnamese", "Tiếng Việt", "Kính gửi {name},", "Kính gửi người dùng,"),
];

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    greeting: &'static str,
    generic_greeting: &'static str,
) -> Language {
    Language {
        code,
        name,
        native_name,
        greeting,
        generic_greeting,
    }
}

const RTL_CODES: &[&str] = &["ar", "he", "fa", "ur"];

pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Native name of a supported language, or the code itself.
pub fn language_name(code: &str) -> &str {
    find_language(code).map_or(code, |l| l.native_name)
}

pub fn is_rtl(code: &str) -> bool {
    RTL_CODES.contains(&code)
}

/// Guesses the language of `text` from the scripts it contains.
///
/// Scripts are checked in a fixed order: Han, kana, Hangul, Cyrillic,
/// Arabic. Text with none of them is reported as English.
pub fn detect_language(text: &str) -> &'static str {
    let any = |pred: fn(u32) -> bool| text.chars().any(|c| pred(c as u32));

    if any(|c| (0x4E00..=0x9FA5).contains(&c)) {
        "zh-CN"
    } else if any(|c| (0x3040..=0x30FF).contains(&c)) {
        "ja"
    } else if any(|c| {
        matches!(c,
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xD7B0..=0xD7FF)
    }) {
        "ko"
    } else if any(|c| (0x0400..=0x04FF).contains(&c)) {
        "ru"
    } else if any(|c| {
        matches!(c,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF)
    }) {
        "ar"
    } else {
        "en"
    }
}

/// Opening salutation in `code`, falling back to English.
pub fn greeting(code: &str, recipient: Option<&str>) -> String {
    let language = find_language(code).unwrap_or(&LANGUAGES[1]);
    match recipient.map(str::trim).filter(|r| !r.is_empty()) {
        Some(name) => language.greeting.replace("{name}", name),
        None => language.generic_greeting.to_string(),
    }
}
