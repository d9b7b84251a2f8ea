// ABOUTME: Tree-based rich-text rewriter used for nested comment bodies.
// ABOUTME: Walks a parsed fragment depth-first with sibling lookahead for spacing.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::escape_attr;
use super::escape_text;

/// Punctuation that must not be preceded by a space after an inline code run.
const CLINGING_PUNCTUATION: [char; 7] = ['.', ',', '!', '?', ':', ';', '*'];

/// Rewrite an origin's HTML-like comment body into the target chat markup.
///
/// The input is parsed leniently (unmatched close tags are dropped by the
/// fragment parser), then walked in document order. Output is trimmed of
/// leading and trailing whitespace.
pub fn rewrite_tree(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let mut out = String::new();
    for child in doc.root_element().children() {
        out.push_str(&process_node(child));
    }
    out.trim().to_string()
}

fn process_children(node: NodeRef<'_, Node>) -> String {
    node.children().map(process_node).collect()
}

fn process_node(node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                String::new()
            } else {
                escape_text(trimmed)
            }
        }
        Node::Element(el) => {
            let tag = el.name();
            match tag {
                "code" => process_code(node),
                "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let mut out = process_children(node);
                    out.push_str("\n\n");
                    out
                }
                "b" | "strong" => wrap(node, "b"),
                "i" | "em" => wrap(node, "i"),
                "u" | "ins" => wrap(node, "u"),
                "s" | "strike" | "del" => wrap(node, "s"),
                "blockquote" => {
                    let mut out = wrap(node, "blockquote");
                    out.push('\n');
                    out
                }
                "a" => {
                    let href = el.attr("href").unwrap_or("");
                    if href.is_empty() {
                        process_children(node)
                    } else {
                        // Origins frequently glue links straight onto the
                        // preceding word; restore one separating space.
                        format!(
                            " <a href=\"{}\">{}</a>",
                            escape_attr(href),
                            process_children(node)
                        )
                    }
                }
                "span" => {
                    if is_spoiler(el) {
                        format!("<tg-spoiler>{}</tg-spoiler> ", process_children(node))
                    } else {
                        process_children(node)
                    }
                }
                "ul" | "ol" => {
                    let mut out = process_children(node);
                    out.push('\n');
                    out
                }
                "li" => {
                    let mut out = format!("- {}", process_children(node));
                    if has_following_element(node) {
                        out.push('\n');
                    }
                    out
                }
                "hr" => "―――\n\n".to_string(),
                // Unknown tags are transparent.
                _ => process_children(node),
            }
        }
        _ => String::new(),
    }
}

fn wrap(node: NodeRef<'_, Node>, tag: &str) -> String {
    format!("<{tag}>{}</{tag}>", process_children(node))
}

fn is_spoiler(el: &scraper::node::Element) -> bool {
    el.attr("class")
        .map(|c| c.split_whitespace().any(|class| class == "md-spoiler-text"))
        .unwrap_or(false)
}

/// Inline code becomes a block when any descendant text carries a newline.
fn has_multiline_text(node: NodeRef<'_, Node>) -> bool {
    node.descendants().any(|n| match n.value() {
        Node::Text(text) => text.contains('\n'),
        _ => false,
    })
}

/// True when this node is the first child of a direct paragraph parent,
/// i.e. a self-standing inline code run opening the paragraph.
fn starts_paragraph(node: NodeRef<'_, Node>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let is_p = parent
        .value()
        .as_element()
        .map(|el| el.name() == "p")
        .unwrap_or(false);
    is_p
        && parent
            .first_child()
            .map(|first| first.id() == node.id())
            .unwrap_or(false)
}

/// The origin's renderer inserts no inter-element whitespace itself, so a
/// closed code run would glue straight onto following prose. Lookahead at
/// the next sibling decides whether to restore a space; punctuation stays
/// attached.
fn next_sibling_clings(node: NodeRef<'_, Node>) -> bool {
    match node.next_sibling() {
        None => true,
        Some(sib) => match sib.value() {
            Node::Text(text) => text
                .chars()
                .next()
                .map(|c| CLINGING_PUNCTUATION.contains(&c))
                .unwrap_or(false),
            _ => false,
        },
    }
}

/// True when another element follows among later siblings (whitespace-only
/// text nodes between list items do not count).
fn has_following_element(node: NodeRef<'_, Node>) -> bool {
    let mut next = node.next_sibling();
    while let Some(sib) = next {
        match sib.value() {
            Node::Element(_) => return true,
            Node::Text(text) if !text.trim().is_empty() => return true,
            _ => next = sib.next_sibling(),
        }
    }
    false
}

fn process_code(node: NodeRef<'_, Node>) -> String {
    if has_multiline_text(node) {
        return format!("<pre>{}</pre>", process_children(node));
    }

    let mut out = String::new();
    if !starts_paragraph(node) {
        out.push(' ');
    }
    out.push_str("<code>");
    out.push_str(&process_children(node));
    out.push_str("</code>");
    if !next_sibling_clings(node) {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_returned_trimmed() {
        assert_eq!(rewrite_tree("  just some words  "), "just some words");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(rewrite_tree("1 < 2 & 3 > 2"), "1 &lt; 2 &amp; 3 &gt; 2");
    }

    #[test]
    fn inline_code_keeps_punctuation_attached() {
        assert_eq!(
            rewrite_tree("<p>See <code>x</code>, ok</p>"),
            "See <code>x</code>, ok"
        );
    }

    #[test]
    fn inline_code_gets_one_space_before_prose() {
        assert_eq!(
            rewrite_tree("<p>See <code>x</code> end</p>"),
            "See <code>x</code> end"
        );
    }

    #[test]
    fn code_opening_a_paragraph_has_no_leading_space() {
        assert_eq!(
            rewrite_tree("<p><code>ls</code> lists files</p>"),
            "<code>ls</code> lists files"
        );
    }

    #[test]
    fn multiline_code_promotes_to_pre_block() {
        let out = rewrite_tree("<p><code>fn main() {\n}\n</code></p>");
        assert!(out.starts_with("<pre>"), "got: {out}");
        assert!(out.contains("</pre>"), "got: {out}");
        assert!(!out.contains("<code>"), "got: {out}");
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(rewrite_tree("<p>one</p><p>two</p>"), "one\n\ntwo");
    }

    #[test]
    fn headings_flatten_like_paragraphs() {
        assert_eq!(rewrite_tree("<h2>Title</h2><p>body</p>"), "Title\n\nbody");
    }

    #[test]
    fn emphasis_family_collapses_onto_target_tags() {
        assert_eq!(rewrite_tree("<strong>x</strong>"), "<b>x</b>");
        assert_eq!(rewrite_tree("<em>x</em>"), "<i>x</i>");
        assert_eq!(rewrite_tree("<ins>x</ins>"), "<u>x</u>");
        assert_eq!(rewrite_tree("<del>x</del>"), "<s>x</s>");
        assert_eq!(rewrite_tree("<strike>x</strike>"), "<s>x</s>");
        assert_eq!(rewrite_tree("<b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn blockquote_is_wrapped_and_newline_terminated() {
        assert_eq!(
            rewrite_tree("<blockquote>said so</blockquote>after"),
            "<blockquote>said so</blockquote>\nafter"
        );
    }

    #[test]
    fn link_gets_a_leading_space() {
        assert_eq!(
            rewrite_tree(r#"<p>see<a href="https://example.com/">here</a></p>"#),
            r#"see <a href="https://example.com/">here</a>"#
        );
    }

    #[test]
    fn link_without_href_unwraps_to_children() {
        assert_eq!(rewrite_tree("<p><a>naked</a></p>"), "naked");
    }

    #[test]
    fn spoiler_span_wraps_with_trailing_space() {
        assert_eq!(
            rewrite_tree(r#"<span class="md-spoiler-text">hi</span>"#),
            "<tg-spoiler>hi</tg-spoiler>"
        );
        // Trailing space survives when content follows.
        assert_eq!(
            rewrite_tree(r#"<p><span class="md-spoiler-text">hi</span>there</p>"#),
            "<tg-spoiler>hi</tg-spoiler> there"
        );
    }

    #[test]
    fn plain_span_is_transparent() {
        assert_eq!(rewrite_tree("<span>plain</span>"), "plain");
    }

    #[test]
    fn list_items_render_one_per_line() {
        assert_eq!(rewrite_tree("<ul><li>a</li><li>b</li></ul>"), "- a\n- b");
    }

    #[test]
    fn list_keeps_item_order_and_trailing_newline() {
        assert_eq!(
            rewrite_tree("<ul><li>a</li><li>b</li></ul><p>after</p>"),
            "- a\n- b\nafter"
        );
    }

    #[test]
    fn ordered_list_renders_like_unordered() {
        assert_eq!(rewrite_tree("<ol><li>x</li><li>y</li></ol>"), "- x\n- y");
    }

    #[test]
    fn horizontal_rule_emits_glyphs() {
        assert_eq!(rewrite_tree("<p>a</p><hr><p>b</p>"), "a\n\n―――\n\nb");
    }

    #[test]
    fn unknown_tags_are_transparent() {
        assert_eq!(rewrite_tree("<div><p>inside</p></div>"), "inside");
    }

    #[test]
    fn unmatched_close_tags_are_tolerated() {
        assert_eq!(rewrite_tree("</i>text</b>"), "text");
    }
}
