use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static NON_ASCII: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").unwrap());

/// A double-quoted JSON string literal, honoring backslash escapes.
static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap());

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+):").unwrap());

/// Drop every character outside the ASCII range.
pub fn strip_non_ascii(text: &str) -> Cow<'_, str> {
    NON_ASCII.replace_all(text, "")
}

/// Quote identifier tokens that sit directly before a colon.
///
/// Only text outside string literals is rewritten, so `"Dr. Who: Returns"`
/// survives untouched while `organisations: [..]` becomes
/// `"organisations": [..]`.
pub fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for literal in STRING_LITERAL.find_iter(text) {
        out.push_str(&BARE_KEY.replace_all(&text[last..literal.start()], "\"$1\":"));
        out.push_str(literal.as_str());
        last = literal.end();
    }
    out.push_str(&BARE_KEY.replace_all(&text[last..], "\"$1\":"));

    out
}

/// ASCII-only text with bare keys quoted.
pub fn clean(text: &str) -> String {
    quote_bare_keys(&strip_non_ascii(text))
}
