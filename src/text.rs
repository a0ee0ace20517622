//! Plain-text cleanup for note bodies: entity decoding, URL removal,
//! whitespace normalization and a filter for tag-soup residue.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:[a-zA-Z0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+").unwrap());
static WWW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"www\.(?:[a-zA-Z0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+").unwrap());

// Whitespace runs containing a newline become one newline; the rest become
// one space. Keeps paragraph breaks while collapsing intra-line whitespace.
static NEWLINE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

// regex has no backreferences, so script and style get one pattern each.
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static TAG_SOUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[<>\s/=\-"'\[\]]*$"#).unwrap());

/// Clean up raw text: decode HTML entities, drop URL tokens, collapse
/// whitespace (paragraph breaks survive as single newlines), trim.
/// Idempotent.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = html_escape::decode_html_entities(raw);
    let text = URL_RE.replace_all(&text, "");
    let text = WWW_RE.replace_all(&text, "");
    collapse_whitespace(&text)
}

/// Best-effort HTML to plain text. Entities are unescaped first, then
/// script/style blocks and comments go away with their content, then every
/// remaining tag is replaced by a single space so words on either side of a
/// tag boundary do not run together.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = html_escape::decode_html_entities(html);
    let text = SCRIPT_RE.replace_all(&text, " ");
    let text = STYLE_RE.replace_all(&text, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// True when the text is just HTML leftovers with no real content.
pub fn is_meaningless(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }

    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() < 5 {
        return true;
    }
    if collapsed.split_whitespace().count() == 0 {
        return true;
    }
    // Pure tag-soup residue: nothing but angle brackets, quotes, slashes.
    if TAG_SOUP_RE.is_match(&collapsed) {
        return true;
    }
    // Intact tags with nothing visible between them, e.g. "<div></div>".
    let visible = TAG_RE.replace_all(&collapsed, " ");
    if visible.trim().is_empty() {
        return true;
    }

    false
}

fn collapse_whitespace(text: &str) -> String {
    let text = NEWLINE_RUN_RE.replace_all(text, "\n");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    text.trim().to_string()
}
