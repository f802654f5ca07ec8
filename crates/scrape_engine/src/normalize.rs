use std::sync::LazyLock;

use engine_logging::engine_warn;
use regex::Regex;
use scrape_core::NULL_TEXT;
use unicode_normalization::UnicodeNormalization;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S*@\S*\s?").expect("email regex"));
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S*https?:\S*").expect("url regex"));

/// Reduces extracted text to printable ASCII without contact or link noise.
///
/// 1. compatibility decomposition (NFKD), then every non-ASCII code point is
///    dropped, so accented letters keep their base letter;
/// 2. only ASCII letters, digits, punctuation and the space survive (newlines
///    and tabs are removed, not replaced);
/// 3. email-like tokens are removed;
/// 4. `http`/`https` URL-like tokens are removed.
///
/// Tokens are matched after control characters are gone, so the result is a
/// fixed point of `normalize`.
///
/// Returns [`NULL_TEXT`] when nothing is left.
pub fn normalize(text: &str) -> String {
    let printable: String = text
        .nfkd()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    let without_email = EMAIL.replace_all(&printable, "");
    let kept = WEB_URL.replace_all(&without_email, "").into_owned();

    if kept.is_empty() {
        engine_warn!("Null string after normalization; input: <{}>", text);
        return NULL_TEXT.to_string();
    }
    kept
}
