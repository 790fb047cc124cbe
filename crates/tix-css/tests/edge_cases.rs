//! Edge case tests for tix-css
//!
//! Malformed selectors, detached scopes and unusual documents.

use tix_css::{ElementQuery, SelectorError, parse_selector_list};
use tix_html::parse;

#[test]
fn test_malformed_selectors_are_errors() {
    for bad in ["", "  ", "div >", "[", "a[href", "#", ".", "a:", ":nth-child(", "a,,b", "p::after"] {
        assert!(parse_selector_list(bad).is_err(), "expected error for {bad:?}");
    }
}

#[test]
fn test_query_error_does_not_panic() {
    let doc = parse("<body><p>x</p></body>");
    let err = doc.tree().query_selector_all(doc.body(), "p[").unwrap_err();
    assert_eq!(err, SelectorError::UnexpectedEnd);
}

#[test]
fn test_detached_scope_yields_nothing() {
    let mut doc = parse("<body><section><p>a</p><p>b</p></section></body>");
    let body = doc.body();
    let section = doc.tree().query_selector(body, "section").unwrap().unwrap();

    doc.tree_mut().detach(section);
    assert!(doc.tree().query_selector_all(section, "p").unwrap().is_empty());
    assert!(doc.tree().query_selector_all(body, "p").unwrap().is_empty());
}

#[test]
fn test_document_scope() {
    let doc = parse("<p>only</p>");
    let tree = doc.tree();
    assert_eq!(tree.query_selector_all(tree.root(), "p").unwrap().len(), 1);
    assert_eq!(tree.query_selector_all(tree.root(), "html").unwrap().len(), 1);
    let html = tree.query_selector(tree.root(), ":scope").unwrap();
    assert_eq!(html, Some(doc.document_element()));
}

#[test]
fn test_empty_pseudo_ignores_comments() {
    let doc = parse("<body><div><!-- note --></div><div> text </div></body>");
    let tree = doc.tree();
    assert_eq!(tree.query_selector_all(doc.body(), "div:empty").unwrap().len(), 1);
}

#[test]
fn test_case_of_type_and_attribute_names() {
    let doc = parse(r#"<body><DIV DATA-ID="7">x</DIV></body>"#);
    let tree = doc.tree();
    assert_eq!(tree.query_selector_all(doc.body(), "div[data-id='7']").unwrap().len(), 1);
    assert_eq!(tree.query_selector_all(doc.body(), "DIV[DATA-ID='7']").unwrap().len(), 1);
}

#[test]
fn test_empty_value_substring_matchers_never_match() {
    let doc = parse(r#"<body><a href="/x">x</a></body>"#);
    let tree = doc.tree();
    for sel in ["[href^='']", "[href$='']", "[href*='']", "[href~='']"] {
        assert!(tree.query_selector_all(doc.body(), sel).unwrap().is_empty(), "{sel}");
    }
}

#[test]
fn test_deeply_nested_descendant_query() {
    let depth = 200;
    let html = format!("<body>{}<b>deep</b>{}</body>", "<div>".repeat(depth), "</div>".repeat(depth));
    let doc = parse(&html);
    let tree = doc.tree();
    assert_eq!(tree.query_selector_all(doc.body(), "div b").unwrap().len(), 1);
    assert_eq!(tree.query_selector_all(doc.body(), "body > div").unwrap().len(), 1);
}
