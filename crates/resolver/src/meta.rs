// ABOUTME: Meta-tag extraction from fetched HTML pages.
// ABOUTME: Collects meta name/property keys into a map for og:* lookups.

use std::collections::HashMap;

use scraper::{Html, Selector};

/// All `<meta>` tags of a page, keyed by `name` or `property`.
///
/// Later duplicates overwrite earlier ones, which matches how the clip-page
/// origins emit their og tags (one occurrence each).
pub fn extract_meta_tags(html: &str) -> HashMap<String, String> {
    let doc = Html::parse_document(html);
    let mut tags = HashMap::new();
    let Ok(sel) = Selector::parse("meta") else {
        return tags;
    };
    for el in doc.select(&sel) {
        let key = el
            .value()
            .attr("name")
            .or_else(|| el.value().attr("property"));
        if let Some(key) = key {
            let content = el.value().attr("content").unwrap_or("");
            tags.insert(key.to_string(), content.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_name_and_property_keys() {
        let html = r#"
            <html><head>
                <meta name="description" content="a page">
                <meta property="og:video" content="https://cdn.example.com/v.mp4">
                <meta property="og:url" content="https://example.com/clip1_2">
                <meta charset="utf-8">
            </head><body></body></html>
        "#;
        let tags = extract_meta_tags(html);
        assert_eq!(tags.get("description").map(String::as_str), Some("a page"));
        assert_eq!(
            tags.get("og:video").map(String::as_str),
            Some("https://cdn.example.com/v.mp4")
        );
        assert!(!tags.contains_key("charset"));
    }

    #[test]
    fn missing_content_becomes_empty_string() {
        let tags = extract_meta_tags(r#"<meta name="robots">"#);
        assert_eq!(tags.get("robots").map(String::as_str), Some(""));
    }
}
