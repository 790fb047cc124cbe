//! Edge case tests for tix-html

use tix_html::{escape_attribute, outer_html, parse};

#[test]
fn test_unclosed_tags_are_repaired() {
    let doc = parse("<body><p>one<p>two<div>three");
    let tree = doc.tree();
    let tags: Vec<&str> = tree
        .element_children(doc.body())
        .filter_map(|c| tree.tag_name(c))
        .collect();
    assert_eq!(tags, vec!["p", "p", "div"]);
}

#[test]
fn test_whitespace_text_is_kept() {
    let doc = parse("<body>\n   <span>a</span>\n   </body>");
    let tree = doc.tree();
    assert_eq!(tree.children(doc.body()).count(), 3);
    assert_eq!(tree.element_children(doc.body()).count(), 1);
}

#[test]
fn test_inline_words_stay_separated() {
    let doc = parse("<body><p><b>Save</b> <i>now</i></p></body>");
    let tree = doc.tree();
    let p = tree.element_children(doc.body()).next().unwrap();
    assert_eq!(tree.text_content(p), "Save now");
}

#[test]
fn test_entities_are_decoded() {
    let doc = parse(r#"<body><span title="a &amp; b">&lt;tag&gt;</span></body>"#);
    let tree = doc.tree();
    let span = tree.element_children(doc.body()).next().unwrap();
    assert_eq!(tree.get_attribute(span, "title"), Some("a & b"));
    assert_eq!(tree.text_content(span), "<tag>");
    assert_eq!(outer_html(tree, span), r#"<span title="a &amp; b">&lt;tag&gt;</span>"#);
}

#[test]
fn test_void_elements_have_no_end_tag() {
    let doc = parse(r#"<body><input name="q"><br></body>"#);
    let tree = doc.tree();
    let html: String = tree
        .element_children(doc.body())
        .map(|c| outer_html(tree, c))
        .collect();
    assert_eq!(html, r#"<input name="q"><br>"#);
}

#[test]
fn test_escape_attribute_quotes() {
    assert_eq!(escape_attribute(r#"say "hi" & go"#), "say &quot;hi&quot; &amp; go");
}

#[test]
fn test_binary_garbage_does_not_panic() {
    let doc = parse("\u{0}<<>><//\u{fffd}<div\u{0}>");
    assert!(doc.tree().len() >= 1);
}
