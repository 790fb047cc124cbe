//! tix HTML
//!
//! HTML5 parsing built on html5ever, plus a small serializer used to show
//! the effect of tab-order changes.

mod parser;
mod serialize;

pub use parser::HtmlParser;
pub use serialize::{escape_attribute, escape_text, outer_html};

use tix_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML string with a document URL
pub fn parse_with_url(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
