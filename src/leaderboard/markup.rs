//! HTML markup helpers for chat texts

/// Escape text for HTML parse mode: `&`, `<`, `>`, `"` and `'`
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wrap already-escaped text in bold tags
pub fn bold(escaped: &str) -> String {
    format!("<b>{}</b>", escaped)
}
