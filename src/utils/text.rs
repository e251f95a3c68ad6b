use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("html tag regex"));

/// Template placeholders: `[[snippet]]`, `[!snippet!]`, `[*field*]`, `[+placeholder+]`,
/// `[(setting)]`, `[~link~]` and `{{chunk}}`.
static TEMPLATE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[\[.*?\]\]|\[!.*?!\]|\[\*.*?\*\]|\[\+.*?\+\]|\[\(.*?\)\]|\[~.*?~\]|\{\{.*?\}\}")
        .expect("template tag regex")
});

pub fn strip_tags(value: &str) -> String {
    let without_html = HTML_TAG_RE.replace_all(value, "");
    TEMPLATE_TAG_RE.replace_all(&without_html, "").into_owned()
}

/// Body of a single-quoted SQL literal.
pub fn escape_sql_literal(value: &str) -> String {
    value.replace('\0', "").replace('\'', "''")
}

pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &value[..end])
}
