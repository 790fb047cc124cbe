//! Selector Parser
//!
//! Hand-written tokenizer and recursive-descent parser for selector lists.
//! Identifier and string escapes are decoded here, so values produced by
//! `css_escape` come back byte-for-byte.

use crate::SelectorError;
use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    SelectorParser::new(input).parse()
}

struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= '\u{80}'
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<SelectorList, SelectorError> {
        let list = self.selector_list(false)?;
        if let Some(c) = self.peek() {
            return Err(self.unexpected(c));
        }
        Ok(list)
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::UnexpectedToken {
            position: self.pos,
            found,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// Skip whitespace and comments; report whether anything was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if is_whitespace(c) => self.pos += 1,
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    while self.pos < self.chars.len()
                        && !(self.peek() == Some('*') && self.peek_at(1) == Some('/'))
                    {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.chars.len());
                }
                _ => break,
            }
        }
        self.pos > start
    }

    fn selector_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.complex_selector()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') if nested => break,
                None if !nested => break,
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(SelectorList(selectors))
    }

    fn complex_selector(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound_selector()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                None | Some(',') | Some(')') => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            if matches!(self.peek(), None | Some(',') | Some(')')) {
                return Err(SelectorError::DanglingCombinator);
            }

            combinators.push(combinator);
            compounds.push(self.compound_selector()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound_selector(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        if self.peek() == Some('*') {
            self.pos += 1;
            components.push(SelectorComponent::Universal);
        } else if self.starts_ident() {
            let name = self.ident()?;
            components.push(SelectorComponent::Type(name.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    components.push(SelectorComponent::PseudoClass(self.pseudo_class()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector(components))
    }

    fn starts_escape_at(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some('\\') && !matches!(self.peek_at(offset + 1), Some('\n'))
    }

    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_at(1) {
                Some(c) if is_ident_start(c) || c == '-' => true,
                _ => self.starts_escape_at(1),
            },
            Some(c) if is_ident_start(c) => true,
            _ => self.starts_escape_at(0),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        if !self.starts_ident() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::UnexpectedEnd,
            });
        }

        let mut out = String::new();
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else if self.starts_escape_at(0) {
                out.push(self.escape());
            } else {
                break;
            }
        }
        Ok(out)
    }

    /// Decode an escape sequence starting at a backslash
    fn escape(&mut self) -> char {
        self.pos += 1;
        let Some(first) = self.peek() else {
            return '\u{FFFD}';
        };

        if !first.is_ascii_hexdigit() {
            self.pos += 1;
            return first;
        }

        let mut value = 0u32;
        let mut digits = 0;
        while digits < 6 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    value = value * 16 + d;
                    digits += 1;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if let Some(c) = self.peek() {
            if is_whitespace(c) {
                self.pos += 1;
            }
        }

        match value {
            0 => '\u{FFFD}',
            v => char::from_u32(v).unwrap_or('\u{FFFD}'),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\n') => return Err(self.unexpected('\n')),
                Some('\\') => {
                    if self.peek_at(1) == Some('\n') {
                        self.pos += 2;
                    } else {
                        out.push(self.escape());
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let matcher: fn(String) -> AttributeMatcher = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.pos += 1;
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            (Some('='), _) => AttributeMatcher::Exact,
            (Some('~'), Some('=')) => AttributeMatcher::Contains,
            (Some('|'), Some('=')) => AttributeMatcher::DashMatch,
            (Some('^'), Some('=')) => AttributeMatcher::Prefix,
            (Some('$'), Some('=')) => AttributeMatcher::Suffix,
            (Some('*'), Some('=')) => AttributeMatcher::Substring,
            (Some(c), _) => return Err(self.unexpected(c)),
            (None, _) => return Err(SelectorError::UnexpectedEnd),
        };
        self.pos += if self.peek() == Some('=') { 1 } else { 2 };
        self.skip_whitespace();

        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q)?,
            Some(_) => self.ident()?,
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i') | Some('I') => {
                self.pos += 1;
                case_insensitive = true;
                self.skip_whitespace();
            }
            Some('s') | Some('S') => {
                self.pos += 1;
                self.skip_whitespace();
            }
            _ => {}
        }
        self.expect(']')?;

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher(value)),
            case_insensitive,
        })
    }

    fn pseudo_class(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            return Err(SelectorError::UnsupportedPseudoElement);
        }
        let name = self.ident()?.to_ascii_lowercase();

        if self.peek() != Some('(') {
            return PseudoClass::from_name(&name).ok_or(SelectorError::UnknownPseudoClass(name));
        }
        self.pos += 1;

        let pseudo = match name.as_str() {
            "nth-child" => PseudoClass::NthChild(self.nth_argument()?),
            "nth-last-child" => PseudoClass::NthLastChild(self.nth_argument()?),
            "nth-of-type" => PseudoClass::NthOfType(self.nth_argument()?),
            "nth-last-of-type" => PseudoClass::NthLastOfType(self.nth_argument()?),
            "not" => PseudoClass::Not(self.selector_list(true)?),
            "is" | "matches" => PseudoClass::Is(self.selector_list(true)?),
            "where" => PseudoClass::Where(self.selector_list(true)?),
            "lang" => {
                self.skip_whitespace();
                let lang = match self.peek() {
                    Some(q @ ('"' | '\'')) => self.string(q)?,
                    _ => self.ident()?,
                };
                self.skip_whitespace();
                PseudoClass::Lang(lang)
            }
            _ => return Err(SelectorError::UnknownPseudoClass(name)),
        };
        self.expect(')')?;
        Ok(pseudo)
    }

    /// Read an An+B argument up to (not including) the closing paren
    fn nth_argument(&mut self) -> Result<NthExpression, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' {
                break;
            }
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(SelectorError::UnexpectedEnd);
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        NthExpression::parse(&raw).ok_or(SelectorError::InvalidNth(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> ComplexSelector {
        let mut list = parse_selector_list(input).unwrap();
        assert_eq!(list.len(), 1);
        list.0.remove(0)
    }

    #[test]
    fn test_compound() {
        let sel = single("button.submit-button#go");
        assert_eq!(
            sel.compounds[0].0,
            vec![
                SelectorComponent::Type("button".into()),
                SelectorComponent::Class("submit-button".into()),
                SelectorComponent::Id("go".into()),
            ]
        );
    }

    #[test]
    fn test_combinators() {
        let sel = single("nav  a > span + b ~ i");
        assert_eq!(
            sel.combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
        assert_eq!(sel.compounds.len(), 5);
    }

    #[test]
    fn test_scope_child() {
        let sel = single(":scope > div.card");
        assert_eq!(sel.compounds[0].0, vec![SelectorComponent::PseudoClass(PseudoClass::Scope)]);
        assert_eq!(sel.combinators, vec![Combinator::Child]);
    }

    #[test]
    fn test_attribute_with_escaped_string() {
        let sel = single(r#"[aria-label="Save\ draft\"s"]"#);
        let SelectorComponent::Attribute(attr) = &sel.compounds[0].0[0] else {
            panic!("expected attribute");
        };
        assert_eq!(attr.name, "aria-label");
        assert_eq!(attr.matcher, Some(AttributeMatcher::Exact("Save draft\"s".into())));
    }

    #[test]
    fn test_attribute_flags_and_ops() {
        let sel = single("[href^='HTTP' i][data-x~=y]");
        let comps = &sel.compounds[0].0;
        let SelectorComponent::Attribute(first) = &comps[0] else { panic!() };
        assert!(first.case_insensitive);
        assert_eq!(first.matcher, Some(AttributeMatcher::Prefix("HTTP".into())));
        let SelectorComponent::Attribute(second) = &comps[1] else { panic!() };
        assert_eq!(second.matcher, Some(AttributeMatcher::Contains("y".into())));
    }

    #[test]
    fn test_hex_escape_in_ident() {
        let sel = single("#\\31 23");
        assert_eq!(sel.compounds[0].0, vec![SelectorComponent::Id("123".into())]);
    }

    #[test]
    fn test_not_with_list() {
        let sel = single("[tabindex]:not([tabindex='-1'])");
        let SelectorComponent::PseudoClass(PseudoClass::Not(inner)) = &sel.compounds[0].0[1] else {
            panic!("expected :not");
        };
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn test_selector_list() {
        let list = parse_selector_list("button, a[href] , details summary").unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(parse_selector_list("   "), Err(SelectorError::Empty));
        assert_eq!(parse_selector_list("div >"), Err(SelectorError::DanglingCombinator));
        assert!(matches!(parse_selector_list("> div"), Err(SelectorError::UnexpectedToken { .. })));
        assert!(matches!(parse_selector_list("div["), Err(SelectorError::UnexpectedEnd)));
        assert!(matches!(parse_selector_list("#1abc"), Err(SelectorError::UnexpectedToken { .. })));
        assert_eq!(
            parse_selector_list("a:bogus"),
            Err(SelectorError::UnknownPseudoClass("bogus".into()))
        );
        assert_eq!(
            parse_selector_list("li:nth-child(x)"),
            Err(SelectorError::InvalidNth("x".into()))
        );
        assert_eq!(parse_selector_list("p::before"), Err(SelectorError::UnsupportedPseudoElement));
        assert!(parse_selector_list("a,,b").is_err());
        assert!(parse_selector_list("[data-id=5]").is_err());
    }
}
