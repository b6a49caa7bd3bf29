#![forbid(unsafe_code)]

//! Element shape selectors.
//!
//! A deliberately small subset of CSS: an optional tag followed by
//! attribute clauses, e.g. `kor-input[type=number]`, `[type="checkbox"]`,
//! `input[disabled]`. No combinators, classes or pseudo-classes.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use super::element::ViewElement;
use super::error::SelectorError;

/// One `[name]` or `[name=value]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub name: String,
    /// `None` tests presence only.
    pub value: Option<String>,
}

impl AttributeMatch {
    fn matches(&self, element: &dyn ViewElement) -> bool {
        match (&self.value, element.attribute(&self.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => *expected == actual,
        }
    }
}

/// A parsed shape selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// Matches every element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches elements with tag `tag`.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            attributes: Vec::new(),
        }
    }

    /// Also require attribute `name` to be present.
    #[must_use]
    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attributes.push(AttributeMatch {
            name: name.to_string(),
            value: None,
        });
        self
    }

    /// Also require attribute `name` to equal `value`.
    #[must_use]
    pub fn with_attribute_value(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttributeMatch {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let body = input.trim();
        if body.is_empty() {
            return Err(SelectorError::Empty);
        }
        let offset = input.len() - input.trim_start().len();
        let mut chars = body.char_indices().peekable();

        let mut tag = String::new();
        if chars.next_if(|&(_, c)| c == '*').is_none() {
            while let Some((_, c)) = chars.next_if(|&(_, c)| is_name_char(c)) {
                tag.push(c);
            }
        }

        let mut attributes = Vec::new();
        while let Some((pos, c)) = chars.next() {
            if c != '[' {
                return Err(SelectorError::UnexpectedChar {
                    found: c,
                    position: offset + pos,
                });
            }
            attributes.push(parse_clause(&mut chars, offset, offset + pos)?);
        }

        Ok(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            attributes,
        })
    }

    #[must_use]
    pub fn matches(&self, element: &dyn ViewElement) -> bool {
        let tag_ok = self
            .tag
            .as_deref()
            .is_none_or(|tag| element.tag_name().eq_ignore_ascii_case(tag));
        tag_ok && self.attributes.iter().all(|clause| clause.matches(element))
    }

    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeMatch] {
        &self.attributes
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether `value` can be written unquoted and read back unchanged.
fn is_bare(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with(['"', '\''])
        && !value.chars().any(|c| c == ']' || c.is_whitespace())
}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
}

/// Parse the rest of a clause whose `[` sat at `open`.
fn parse_clause(
    chars: &mut Peekable<CharIndices<'_>>,
    offset: usize,
    open: usize,
) -> Result<AttributeMatch, SelectorError> {
    let unterminated = SelectorError::Unterminated { position: open };

    skip_whitespace(chars);
    let mut name = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| is_name_char(c)) {
        name.push(c);
    }
    skip_whitespace(chars);

    let value = match chars.next() {
        None => return Err(unterminated),
        Some((_, ']')) if name.is_empty() => {
            return Err(SelectorError::EmptyAttributeName { position: open });
        }
        Some((_, ']')) => return Ok(AttributeMatch { name, value: None }),
        Some((_, '=')) if name.is_empty() => {
            return Err(SelectorError::EmptyAttributeName { position: open });
        }
        Some((_, '=')) => {
            skip_whitespace(chars);
            parse_value(chars, offset, open)?
        }
        Some((pos, found)) => {
            return Err(SelectorError::UnexpectedChar {
                found,
                position: offset + pos,
            });
        }
    };

    skip_whitespace(chars);
    match chars.next() {
        Some((_, ']')) => Ok(AttributeMatch {
            name,
            value: Some(value),
        }),
        Some((pos, found)) => Err(SelectorError::UnexpectedChar {
            found,
            position: offset + pos,
        }),
        None => Err(unterminated),
    }
}

fn parse_value(
    chars: &mut Peekable<CharIndices<'_>>,
    offset: usize,
    open: usize,
) -> Result<String, SelectorError> {
    let mut value = String::new();
    if let Some((_, quote)) = chars.next_if(|&(_, c)| c == '"' || c == '\'') {
        for (_, c) in chars.by_ref() {
            if c == quote {
                return Ok(value);
            }
            value.push(c);
        }
        return Err(SelectorError::Unterminated { position: open });
    }

    while let Some((_, c)) = chars.next_if(|&(_, c)| c != ']' && !c.is_whitespace()) {
        value.push(c);
    }
    if value.is_empty() {
        return match chars.peek() {
            Some(&(pos, found)) => Err(SelectorError::UnexpectedChar {
                found,
                position: offset + pos,
            }),
            None => Err(SelectorError::Unterminated { position: open }),
        };
    }
    Ok(value)
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.attributes.is_empty() => f.write_str("*")?,
            None => {}
        }
        for clause in &self.attributes {
            match &clause.value {
                None => write!(f, "[{}]", clause.name)?,
                Some(value) if is_bare(value) => write!(f, "[{}={}]", clause.name, value)?,
                Some(value) if value.contains('"') => write!(f, "[{}='{}']", clause.name, value)?,
                Some(value) => write!(f, "[{}=\"{}\"]", clause.name, value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::element::VirtualElement;
    use proptest::prelude::*;

    #[test]
    fn parses_tag_and_clause() {
        let selector = Selector::parse("kor-input[type=number]").expect("valid");
        assert_eq!(selector.tag_name(), Some("kor-input"));
        assert_eq!(
            selector.attributes(),
            &[AttributeMatch {
                name: "type".into(),
                value: Some("number".into())
            }]
        );
    }

    #[test]
    fn parses_quoted_values_and_presence() {
        let selector = Selector::parse(r#" [ type = "check box" ][disabled] "#).expect("valid");
        assert_eq!(selector.tag_name(), None);
        assert_eq!(selector.attributes()[0].value.as_deref(), Some("check box"));
        assert_eq!(selector.attributes()[1].value, None);
    }

    #[test]
    fn builder_matches_parsed() {
        let built = Selector::tag("kor-input").with_attribute_value("type", "number");
        assert_eq!(built, "kor-input[type=number]".parse().expect("valid"));
        assert_eq!(Selector::any(), Selector::parse("*").expect("valid"));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("input[type=number"),
            Err(SelectorError::Unterminated { position: 5 })
        );
        assert_eq!(
            Selector::parse("input[=x]"),
            Err(SelectorError::EmptyAttributeName { position: 5 })
        );
        assert_eq!(
            Selector::parse("input.cls"),
            Err(SelectorError::UnexpectedChar {
                found: '.',
                position: 5
            })
        );
        assert_eq!(
            Selector::parse("[type='x]"),
            Err(SelectorError::Unterminated { position: 0 })
        );
        assert!(Selector::parse("[type=]").is_err());
    }

    #[test]
    fn matching_is_tag_case_insensitive_and_value_exact() {
        let el = VirtualElement::new("KOR-INPUT").with_attribute("type", "number");
        assert!(Selector::parse("kor-input[type=number]").expect("valid").matches(&el));
        assert!(Selector::parse("[type]").expect("valid").matches(&el));
        assert!(!Selector::parse("[type=Number]").expect("valid").matches(&el));
        assert!(!Selector::parse("input").expect("valid").matches(&el));
        assert!(Selector::any().matches(&el));
    }

    #[test]
    fn display_reparses() {
        for text in ["kor-input[type=number]", "[type=\"a b\"][x]", "*", "input", "[a='say \"hi\"']", "[a=x\"y]"] {
            let selector = Selector::parse(text).expect("valid");
            assert_eq!(Selector::parse(&selector.to_string()), Ok(selector));
        }
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in ".{0,40}") {
            let _ = Selector::parse(&input);
        }
    }
}
