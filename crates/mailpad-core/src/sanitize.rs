/// Allow-list HTML sanitizer for template bodies.
///
/// The input is split into text, comments and tags with a regex tokenizer.
/// Allowed tags are re-emitted with only allowed attributes; a handful of
/// executable elements are dropped together with their content; any other
/// tag is removed but its text is kept.
use std::sync::LazyLock;

use regex::Regex;

const ALLOWED_TAGS: &[&str] = &[
    "p", "div", "span", "strong", "em", "u", "br", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5",
    "h6", "table", "tr", "td", "th", "thead", "tbody", "a", "img", "hr",
];

const ALLOWED_ATTRS: &[&str] = &[
    "style", "class", "href", "target", "src", "alt", "title", "colspan", "rowspan", "border",
    "cellpadding", "cellspacing",
];

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "noscript", "template"];

/// Elements without a closing tag.
const VOID_TAGS: &[&str] = &["br", "img", "hr"];

/// Attributes holding a URI that must pass [`is_safe_uri`].
const URI_ATTRS: &[&str] = &["href", "src"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("valid tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

/// Known-safe schemes, or a relative reference (no scheme at all).
static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:(?:f|ht)tps?|mailto|tel|callto|cid|xmpp):|[^a-z]|[a-z+.\-]+(?:[^a-z+.\-:]|$))")
        .expect("valid uri regex")
});

static CHAR_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9A-Fa-f]+)|([A-Za-z][A-Za-z0-9]*))(;?)")
        .expect("valid character reference regex")
});

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Comment,
    Open { name: String, attrs: &'a str },
    Close { name: String },
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&html[last..whole.start()]));
        }
        last = whole.end();

        let Some(name) = caps.get(2) else {
            tokens.push(Token::Comment);
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            tokens.push(Token::Close { name });
        } else {
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            tokens.push(Token::Open { name, attrs });
        }
    }
    if last < html.len() {
        tokens.push(Token::Text(&html[last..]));
    }
    tokens
}

/// Walks the tokens, skipping the content of dropped elements.
fn visit<'a>(html: &'a str, mut emit: impl FnMut(Token<'a>)) {
    let mut skip_until: Option<String> = None;
    for token in tokenize(html) {
        if let Some(end) = &skip_until {
            if matches!(&token, Token::Close { name } if name == end) {
                skip_until = None;
            }
            continue;
        }
        if let Token::Open { name, attrs } = &token {
            if DROPPED_TAGS.contains(&name.as_str()) {
                if !attrs.trim_end().ends_with('/') {
                    skip_until = Some(name.clone());
                }
                continue;
            }
        }
        emit(token);
    }
}

/// Returns the HTML with everything outside the allow-lists removed.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    visit(html, |token| match token {
        Token::Text(text) => push_text(&mut out, text),
        Token::Comment => {}
        Token::Open { name, attrs } => {
            if ALLOWED_TAGS.contains(&name.as_str()) {
                push_open_tag(&mut out, &name, attrs);
            }
        }
        Token::Close { name } => {
            if ALLOWED_TAGS.contains(&name.as_str()) && !VOID_TAGS.contains(&name.as_str()) {
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
        }
    });
    out
}

/// Removes every tag and keeps the text.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    visit(html, |token| {
        if let Token::Text(text) = token {
            out.push_str(text);
        }
    });
    out
}

/// True when sanitizing would not change `html`.
pub fn is_html_safe(html: &str) -> bool {
    html.is_empty() || sanitize_html(html) == html
}

/// Plain-text preview of at most `max_chars` characters, `...` appended
/// when truncated.
pub fn html_summary(html: &str, max_chars: usize) -> String {
    let text = strip_html(html);
    if text.chars().count() > max_chars {
        let mut summary: String = text.chars().take(max_chars).collect();
        summary.push_str("...");
        summary
    } else {
        text
    }
}

/// Escapes text for use inside HTML content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// True for URIs with an allowed scheme or no scheme.
///
/// Character references are decoded first, so the scheme is judged as the
/// mail client will read it.
pub fn is_safe_uri(uri: &str) -> bool {
    let compact: String = decode_char_refs(uri)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    URI_RE.is_match(&compact)
}

/// Decodes numeric references and the ASCII named references in one pass.
/// Unknown names are kept as written.
fn decode_char_refs(value: &str) -> String {
    CHAR_REF_RE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let terminated = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
            let code = if let Some(dec) = caps.get(1) {
                Some(dec.as_str().parse::<u32>().ok())
            } else if let Some(hex) = caps.get(2) {
                Some(u32::from_str_radix(hex.as_str(), 16).ok())
            } else {
                None
            };
            if let Some(code) = code {
                let c = code
                    .filter(|&n| n != 0)
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return c.to_string();
            }
            let name = caps.get(3).map_or("", |m| m.as_str());
            match named_ref(name, terminated) {
                Some(c) => c.to_string(),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

fn named_ref(name: &str, terminated: bool) -> Option<char> {
    // Only these four decode without the trailing semicolon in attributes.
    let legacy = match name {
        "amp" | "AMP" => Some('&'),
        "lt" | "LT" => Some('<'),
        "gt" | "GT" => Some('>'),
        "quot" | "QUOT" => Some('"'),
        _ => None,
    };
    if legacy.is_some() || !terminated {
        return legacy;
    }
    let c = match name {
        "Tab" => '\t',
        "NewLine" => '\n',
        "nbsp" => '\u{a0}',
        "excl" => '!',
        "num" => '#',
        "dollar" => '$',
        "percnt" => '%',
        "apos" => '\'',
        "lpar" => '(',
        "rpar" => ')',
        "ast" | "midast" => '*',
        "plus" => '+',
        "comma" => ',',
        "period" => '.',
        "sol" => '/',
        "colon" => ':',
        "semi" => ';',
        "equals" => '=',
        "quest" => '?',
        "commat" => '@',
        "lsqb" | "lbrack" => '[',
        "bsol" => '\\',
        "rsqb" | "rbrack" => ']',
        "Hat" => '^',
        "lowbar" | "UnderBar" => '_',
        "grave" | "DiacriticalGrave" => '`',
        "lcub" | "lbrace" => '{',
        "verbar" | "vert" | "VerticalLine" => '|',
        "rcub" | "rbrace" => '}',
        _ => return None,
    };
    Some(c)
}

/// Text outside tags; a `<` that opened no tag is escaped.
fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '<' {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
}

fn push_open_tag(out: &mut String, name: &str, attrs: &str) {
    out.push('<');
    out.push_str(name);
    for caps in ATTR_RE.captures_iter(attrs) {
        let Some(attr) = caps.get(1) else {
            continue;
        };
        let attr = attr.as_str().to_ascii_lowercase();
        if !ALLOWED_ATTRS.contains(&attr.as_str()) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        if URI_ATTRS.contains(&attr.as_str()) && !is_safe_uri(value) {
            tracing::debug!("Dropped unsafe {attr} on <{name}>");
            continue;
        }
        out.push(' ');
        out.push_str(&attr);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');
}
