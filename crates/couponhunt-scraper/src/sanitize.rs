use std::collections::HashSet;

use scraper::Html;

/// Removes every element whose tag name is in `tags_to_remove`, together
/// with its subtree, and re-serializes the markup.
///
/// Tag matching is case-insensitive and set-based, so order and repeats in
/// `tags_to_remove` do not matter. Input that is blank, or a tag list that
/// names nothing, comes back unchanged. Fragments stay fragments; input that
/// carries an `<html>` or doctype is treated as a full document.
#[must_use]
pub fn clean_html(html: &str, tags_to_remove: &[String]) -> String {
    let remove: HashSet<String> = tags_to_remove
        .iter()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if html.trim().is_empty() || remove.is_empty() {
        return html.to_owned();
    }

    let full_document = looks_like_document(html);
    let mut document = if full_document {
        Html::parse_document(html)
    } else {
        Html::parse_fragment(html)
    };

    let tree_root = document.tree.root().id();
    let doomed: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| {
            // The top-level element anchors serialization and must survive.
            node.parent().is_some_and(|p| p.id() != tree_root)
                && node
                    .value()
                    .as_element()
                    .is_some_and(|el| remove.contains(el.name()))
        })
        .map(|node| node.id())
        .collect();

    let removed = doomed.len();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    tracing::debug!(removed, tags = ?remove, "html cleaned");

    if full_document {
        document.html()
    } else {
        document.root_element().inner_html()
    }
}

fn looks_like_document(html: &str) -> bool {
    let lower = html.trim_start().to_ascii_lowercase();
    lower.starts_with("<!doctype") || lower.contains("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn removes_script_subtree_and_keeps_siblings() {
        let out = clean_html("<div><script>x</script><p>keep</p></div>", &tags(&["script"]));
        assert!(out.contains("<p>keep</p>"), "got: {out}");
        assert!(!out.contains("<script"), "got: {out}");
        assert_eq!(out, "<div><p>keep</p></div>");
    }

    #[test]
    fn removes_nested_subtrees() {
        let html = r#"<div><svg><g><path d="M0"/></g></svg><style>.a{}</style><span>ok</span></div>"#;
        let out = clean_html(html, &tags(&["svg", "style"]));
        assert_eq!(out, "<div><span>ok</span></div>");
    }

    #[test]
    fn order_and_case_of_tag_names_do_not_matter() {
        let html = "<div><script>a</script><iframe src=\"x\"></iframe><b>bold</b></div>";
        let a = clean_html(html, &tags(&["script", "IFRAME"]));
        let b = clean_html(html, &tags(&["iframe", "script", "script"]));
        assert_eq!(a, b);
        assert_eq!(a, "<div><b>bold</b></div>");
    }

    #[test]
    fn full_documents_keep_their_skeleton() {
        let html = "<!DOCTYPE html><html><head><style>p{}</style><title>T</title></head>\
                    <body><form><input id=\"promo\"><button>Apply</button></form></body></html>";
        let out = clean_html(html, &tags(&["style"]));
        assert!(out.contains("<html>"), "got: {out}");
        assert!(out.contains("<title>T</title>"), "got: {out}");
        assert!(out.contains(r#"<input id="promo">"#), "got: {out}");
        assert!(!out.contains("<style"), "got: {out}");
    }

    #[test]
    fn blank_input_and_empty_tag_list_are_returned_unchanged() {
        assert_eq!(clean_html("", &tags(&["script"])), "");
        assert_eq!(clean_html("  \n", &tags(&["script"])), "  \n");
        assert_eq!(clean_html("<p>x", &tags(&[])), "<p>x");
        assert_eq!(clean_html("<p>x", &tags(&["  "])), "<p>x");
    }

    #[test]
    fn removing_html_from_a_fragment_does_not_panic() {
        let out = clean_html("<p>still here</p>", &tags(&["html"]));
        assert_eq!(out, "<p>still here</p>");
    }
}
