//! Two-layer encoding for embed documents.
//!
//! The inner layer escapes values placed inside the synthesized document
//! (element text, attribute values, CSS strings, JS strings). The outer
//! layer encodes the finished document so it can sit inside a double-quoted
//! host attribute such as `srcdoc="..."`. The document itself always uses
//! double quotes; only the outer layer decides how they survive nesting.

/// Inner layer: element text and double- or single-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Inner layer: a double-quoted CSS string literal, e.g. for `url(...)`.
/// `<` is escaped so the value can never close the surrounding `<style>`.
pub fn css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            '<' => out.push_str("\\3c "),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inner layer: a JS string literal. Also escapes `</` as `<\/` so the
/// value cannot terminate the `<script>` block it is embedded in.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' if prev == '<' => out.push_str("\\/"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
        prev = c;
    }
    out.push('"');
    out
}

/// A JS array literal of strings.
pub fn js_string_array<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<String> = items.into_iter().map(js_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Outer layer: encode a whole document for a double-quoted attribute.
pub fn srcdoc_attr(doc: &str) -> String {
    let mut out = String::with_capacity(doc.len() + doc.len() / 8);
    for c in doc.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`srcdoc_attr`].
pub fn decode_srcdoc_attr(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("&quot;") {
            out.push('"');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("&amp;") {
            out.push('&');
            rest = after;
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srcdoc_round_trips_mixed_quotes() {
        let doc = r#"<p class="a" title='b'>&amp; "x" &quot;</p>"#;
        let encoded = srcdoc_attr(doc);
        assert!(!encoded.contains('"'));
        assert_eq!(decode_srcdoc_attr(&encoded), doc);
    }

    #[test]
    fn css_string_cannot_close_style() {
        let v = css_string("https://e.com/a\").png</style>");
        assert!(!v.contains("</style>"));
        assert!(v.starts_with('"') && v.ends_with('"'));
        assert!(v.contains("\\\""));
    }

    #[test]
    fn js_string_cannot_close_script() {
        let v = js_string("a</script>b");
        assert_eq!(v, r#""a<\/script>b""#);
    }

    #[test]
    fn html_escape_covers_both_quotes() {
        assert_eq!(escape_html(r#"<a "b" 'c' &>"#), "&lt;a &quot;b&quot; &#39;c&#39; &amp;&gt;");
    }
}
