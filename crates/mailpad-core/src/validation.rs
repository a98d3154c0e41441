/// Input validation for template fields and user-supplied values.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use mailpad_config::AppConfig;
use regex::Regex;
use thiserror::Error;

use crate::template::EmailCategory;

/// Default upload limit for images, in megabytes.
pub const MAX_FILE_SIZE_MB: u64 = 5;

/// MIME types accepted for inline images.
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid color regex"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(.+)$").expect("valid url regex")
});

/// Schemes that must carry an authority (`scheme://host`).
const HIERARCHICAL_SCHEMES: &[&str] = &["http", "https", "ftp", "ws", "wss"];

/// Template field a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Content,
    Name,
    Category,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Name => "name",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length bounds applied by [`validate_template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub min_title: usize,
    pub max_title: usize,
    pub min_content: usize,
    pub max_content: usize,
    pub max_name: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_title: 2,
            max_title: 200,
            min_content: 10,
            max_content: 50_000,
            max_name: 100,
        }
    }
}

impl From<&AppConfig> for ValidationLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_title: config.max_title_length,
            max_content: config.max_content_length,
            max_name: config.max_template_name_length,
            ..Self::default()
        }
    }
}

/// Borrowed view of the fields a template form submits.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFields<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub category: Option<EmailCategory>,
}

/// Per-field validation messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// One line per failing field, `field: message`.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|(f, m)| format!("{f}: {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn check(&mut self, field: Field, message: Option<String>) {
        if let Some(message) = message {
            self.errors.insert(field, message);
        }
    }
}

pub fn validate_title(title: &str, limits: &ValidationLimits) -> Option<String> {
    let len = title.chars().count();
    if title.trim().is_empty() {
        Some("Title is required".to_string())
    } else if len > limits.max_title {
        Some(format!("Title cannot exceed {} characters", limits.max_title))
    } else if len < limits.min_title {
        Some(format!("Title must be at least {} characters", limits.min_title))
    } else {
        None
    }
}

pub fn validate_content(content: &str, limits: &ValidationLimits) -> Option<String> {
    let len = content.chars().count();
    if content.trim().is_empty() {
        Some("Content is required".to_string())
    } else if len > limits.max_content {
        Some(format!("Content cannot exceed {} characters", limits.max_content))
    } else if len < limits.min_content {
        Some(format!("Content must be at least {} characters", limits.min_content))
    } else {
        None
    }
}

pub fn validate_name(name: &str, limits: &ValidationLimits) -> Option<String> {
    if name.trim().is_empty() {
        Some("Template name is required".to_string())
    } else if name.chars().count() > limits.max_name {
        Some(format!("Template name cannot exceed {} characters", limits.max_name))
    } else {
        None
    }
}

/// Validates every field of a template form.
pub fn validate_template(fields: &TemplateFields<'_>, limits: &ValidationLimits) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.check(Field::Title, validate_title(fields.title, limits));
    report.check(Field::Content, validate_content(fields.content, limits));
    report.check(Field::Name, validate_name(fields.name, limits));
    if fields.category.is_none() {
        report.check(Field::Category, Some("Please choose a category".to_string()));
    }
    report
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts absolute URLs: `scheme://host...` for web schemes, `scheme:rest`
/// for opaque ones such as `mailto:`.
pub fn validate_url(url: &str) -> bool {
    let Some(caps) = URL_RE.captures(url.trim()) else {
        return false;
    };
    let scheme = caps[1].to_ascii_lowercase();
    let rest = &caps[2];
    if let Some(after) = rest.strip_prefix("//") {
        let authority = after.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        return !host.is_empty() && !host.contains(char::is_whitespace);
    }
    !HIERARCHICAL_SCHEMES.contains(&scheme.as_str())
}

pub fn validate_color(color: &str) -> bool {
    COLOR_RE.is_match(color)
}

pub fn validate_file_size(size_bytes: u64, max_mb: u64) -> bool {
    size_bytes <= max_mb.saturating_mul(1024 * 1024)
}

pub fn validate_file_type(mime: &str, allowed: &[&str]) -> bool {
    allowed.contains(&mime)
}

/// Trims, strips `<>"'`, and truncates to `max_len` characters.
pub fn sanitize_string(input: &str, max_len: Option<usize>) -> String {
    let cleaned = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''));
    match max_len {
        Some(max) => cleaned.take(max).collect(),
        None => cleaned.collect(),
    }
}
