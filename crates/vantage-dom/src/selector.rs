//! Selector Matching
//!
//! Small CSS selector subset: tag, `#id`, `.class`, `[attr]` presence
//! tests, compounds of those (`img[data-src]`), and comma-separated
//! lists. Enough for candidate discovery; no combinators.

use crate::node::Element;
use thiserror::Error;

/// Selector parse failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unclosed attribute bracket in {0:?}")]
    UnclosedBracket(String),
    #[error("unexpected token at {0:?}")]
    UnexpectedToken(String),
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

/// One compound selector: all parts must match the same element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<String>,
}

impl Selector {
    /// Parse a selector list like `"img[data-src], [data-lazy]"`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut compounds = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            compounds.push(Compound::parse(part)?);
        }
        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { compounds })
    }

    /// Build a `tag[attr]` selector without going through the parser
    pub fn tag_with_attr(tag: Option<&str>, attr: &str) -> Self {
        Self {
            compounds: vec![Compound {
                tag: tag.map(str::to_ascii_lowercase),
                attrs: vec![attr.to_string()],
                ..Compound::default()
            }],
        }
    }

    /// Combine two selectors into one list matching either
    pub fn or(mut self, other: Selector) -> Selector {
        self.compounds.extend(other.compounds);
        self
    }

    /// Check whether an element matches any compound in the list
    pub fn matches(&self, elem: &Element) -> bool {
        self.compounds.iter().any(|c| c.matches(elem))
    }
}

impl Compound {
    fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut compound = Compound::default();
        let mut rest = input;

        // Optional leading tag or universal
        let head_len = rest
            .find(|c| matches!(c, '#' | '.' | '['))
            .unwrap_or(rest.len());
        let head = &rest[..head_len];
        if !head.is_empty() {
            if head == "*" {
                // Universal: no tag constraint
            } else if head.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                compound.tag = Some(head.to_ascii_lowercase());
            } else {
                return Err(SelectorError::UnexpectedToken(head.to_string()));
            }
        }
        rest = &rest[head_len..];

        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix('[') {
                let close = tail
                    .find(']')
                    .ok_or_else(|| SelectorError::UnclosedBracket(input.to_string()))?;
                let name = tail[..close].trim();
                if name.is_empty() {
                    return Err(SelectorError::UnexpectedToken(input.to_string()));
                }
                compound.attrs.push(name.to_string());
                rest = &tail[close + 1..];
            } else if let Some(tail) = rest.strip_prefix('.') {
                let (name, remaining) = split_name(tail);
                if name.is_empty() {
                    return Err(SelectorError::UnexpectedToken(input.to_string()));
                }
                compound.classes.push(name.to_string());
                rest = remaining;
            } else if let Some(tail) = rest.strip_prefix('#') {
                let (name, remaining) = split_name(tail);
                if name.is_empty() {
                    return Err(SelectorError::UnexpectedToken(input.to_string()));
                }
                compound.id = Some(name.to_string());
                rest = remaining;
            } else {
                return Err(SelectorError::UnexpectedToken(rest.to_string()));
            }
        }

        Ok(compound)
    }

    fn matches(&self, elem: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| elem.has_attr(a))
    }
}

/// Split an identifier off the front of `input`
fn split_name(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| matches!(c, '#' | '.' | '['))
        .unwrap_or(input.len());
    (&input[..end], &input[end..])
}
