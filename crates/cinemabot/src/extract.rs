//! Selector-driven value extraction from HTML pages.
//!
//! A [`SelectorDescriptor`] names a container node (tag plus class list) and,
//! optionally, a descendant to read from. Extraction never fails: any node
//! that is missing along the way simply yields `None`, since live pages drift
//! and a selector miss is an ordinary outcome.

use std::fmt;

use scraper::{ElementRef, Html, Selector};

/// Reserved attribute name meaning "the node's text content".
pub const TEXT_CONTENT: &str = "#text";

/// Error type for descriptor construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Invalid tag name: '{0}'")]
    InvalidTag(String),

    #[error("Invalid class name: '{0}'")]
    InvalidClass(String),

    #[error("Invalid attribute name: '{0}'")]
    InvalidAttribute(String),
}

/// What to read from the value node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// An HTML attribute such as `href` or `src`.
    Attribute(String),
    /// Concatenated text of the node and its descendants.
    Text,
}

impl ValueSource {
    /// Parse an attribute name; [`TEXT_CONTENT`] selects text content.
    pub fn parse(name: &str) -> Result<Self, ExtractError> {
        if name == TEXT_CONTENT {
            return Ok(ValueSource::Text);
        }
        if !is_identifier(name) {
            return Err(ExtractError::InvalidAttribute(name.to_string()));
        }
        Ok(ValueSource::Attribute(name.to_string()))
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Attribute(name) => write!(f, "[{}]", name),
            ValueSource::Text => write!(f, "{}", TEXT_CONTENT),
        }
    }
}

/// Declarative rule for pulling one value out of a page.
///
/// `container_class` may hold several space-separated class names; a node
/// matches when it carries all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorDescriptor {
    pub container_tag: String,
    pub container_class: String,
    /// Descendant to read from; `None` reads the container itself.
    pub value_tag: Option<String>,
    pub value: ValueSource,
}

impl SelectorDescriptor {
    /// Build a descriptor that reads `value` from the first `value_tag`
    /// inside the container. `value` is an attribute name or [`TEXT_CONTENT`].
    pub fn new(
        container_tag: &str,
        container_class: &str,
        value_tag: &str,
        value: &str,
    ) -> Result<Self, ExtractError> {
        check_tag(value_tag)?;
        let mut descriptor = Self::container(container_tag, container_class, value)?;
        descriptor.value_tag = Some(value_tag.to_string());
        Ok(descriptor)
    }

    /// Build a descriptor that reads `value` from the container node itself.
    pub fn container(
        container_tag: &str,
        container_class: &str,
        value: &str,
    ) -> Result<Self, ExtractError> {
        check_tag(container_tag)?;
        for class in container_class.split_whitespace() {
            if !is_identifier(class) {
                return Err(ExtractError::InvalidClass(class.to_string()));
            }
        }

        Ok(Self {
            container_tag: container_tag.to_string(),
            container_class: container_class.split_whitespace().collect::<Vec<_>>().join(" "),
            value_tag: None,
            value: ValueSource::parse(value)?,
        })
    }

    /// CSS selector for the container, e.g. `tr.findResult.odd`.
    pub fn container_css(&self) -> String {
        let mut css = self.container_tag.clone();
        for class in self.container_class.split_whitespace() {
            css.push('.');
            css.push_str(class);
        }
        css
    }
}

impl fmt::Display for SelectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.container_css())?;
        if let Some(tag) = &self.value_tag {
            write!(f, " {}", tag)?;
        }
        write!(f, " {}", self.value)
    }
}

fn check_tag(tag: &str) -> Result<(), ExtractError> {
    let valid = !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ExtractError::InvalidTag(tag.to_string()))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse `document_text` and extract the descriptor's value.
pub fn extract(document_text: &str, descriptor: &SelectorDescriptor) -> Option<String> {
    let document = Html::parse_document(document_text);
    extract_from(&document, descriptor)
}

/// Extract the descriptor's value from an already parsed document.
pub fn extract_from(document: &Html, descriptor: &SelectorDescriptor) -> Option<String> {
    let node = value_node(document, descriptor)?;
    match &descriptor.value {
        ValueSource::Attribute(name) => node.value().attr(name).map(str::to_string),
        ValueSource::Text => Some(node.text().collect::<String>()),
    }
}

/// Whether the descriptor's value node exists, regardless of its value.
pub fn contains(document: &Html, descriptor: &SelectorDescriptor) -> bool {
    value_node(document, descriptor).is_some()
}

/// First node matching the descriptor's container.
pub fn find_container<'a>(document: &'a Html, descriptor: &SelectorDescriptor) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&descriptor.container_css()).ok()?;
    document.select(&selector).next()
}

fn value_node<'a>(document: &'a Html, descriptor: &SelectorDescriptor) -> Option<ElementRef<'a>> {
    let container = find_container(document, descriptor)?;
    match &descriptor.value_tag {
        None => Some(container),
        Some(tag) => {
            let selector = Selector::parse(tag).ok()?;
            container.select(&selector).next()
        }
    }
}
