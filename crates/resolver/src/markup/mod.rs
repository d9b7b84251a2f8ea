// ABOUTME: Markup rewriting from origin rich-text HTML into the chat dialect.
// ABOUTME: Shared escaping/entity helpers plus the tree and streaming rewriters.

pub mod stream;
pub mod tree;

pub use stream::rewrite_stream;
pub use tree::rewrite_tree;

/// Escape text for the target chat markup (HTML-style inline tags).
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for embedding in a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode HTML entities in a body that arrives escaped one level too deep
/// (e.g. reddit's `body_html`, which is the HTML of the comment re-escaped
/// inside a JSON string).
pub fn decode_entities(s: &str) -> String {
    // &amp; is handled last so "&amp;lt;" stays "&lt;" instead of
    // collapsing to "<".
    let named = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&#39;", "'"),
        ("&nbsp;", " "),
    ];

    let mut result = s.to_string();
    for (entity, replacement) in &named {
        result = result.replace(entity, replacement);
    }
    result = decode_numeric_entities(&result);
    result.replace("&amp;", "&")
}

/// Decodes numeric entities like &#123; and &#x7B;.
fn decode_numeric_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '&' && chars.peek() == Some(&'#') {
            chars.next();
            let mut num_str = String::new();
            let is_hex = matches!(chars.peek(), Some('x') | Some('X'));
            if is_hex {
                chars.next();
            }

            while let Some(&nc) = chars.peek() {
                if nc == ';' {
                    chars.next();
                    break;
                }
                if (is_hex && nc.is_ascii_hexdigit()) || (!is_hex && nc.is_ascii_digit()) {
                    num_str.push(nc);
                    chars.next();
                } else {
                    break;
                }
            }

            let code = if is_hex {
                u32::from_str_radix(&num_str, 16).ok()
            } else {
                num_str.parse::<u32>().ok()
            };
            if let Some(decoded) = code.and_then(char::from_u32) {
                result.push(decoded);
                continue;
            }

            result.push('&');
            result.push('#');
            if is_hex {
                result.push('x');
            }
            result.push_str(&num_str);
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_text_covers_markup_chars() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn escape_attr_covers_quotes() {
        assert_eq!(escape_attr(r#"x="1"&y"#), "x=&quot;1&quot;&amp;y");
    }

    #[test]
    fn decode_named_and_numeric() {
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#38;&#x26;"), "&&");
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn double_escaped_ampersand_decodes_one_level() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }
}
