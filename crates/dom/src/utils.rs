//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{NodeId, NodeType};

/// Get all text content from node and its children, untrimmed
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let node = arena.get(node_id)?;
    if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
        return Ok(node.node_value.clone());
    }

    let mut text = String::new();
    arena.traverse_df(node_id, |node| {
        if node.node_type == NodeType::Text {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text)
}

/// Reject empty class tokens and tokens containing whitespace
pub fn validate_class_token(token: &str) -> Result<()> {
    if token.is_empty() || token.chars().any(|c| c.is_ascii_whitespace()) {
        return Err(DomError::InvalidToken(token.to_string()));
    }
    Ok(())
}

/// Attribute names must be non-empty and free of whitespace, quotes, `/`, `=` and `>`
pub fn validate_attribute_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'));
    if invalid {
        return Err(DomError::InvalidAttributeName(name.to_string()));
    }
    Ok(())
}

/// `fooBar` → `data-foo-bar`
pub fn dataset_key_to_attr(key: &str) -> Result<String> {
    let mut chars = key.chars().peekable();
    let mut attr = String::from("data-");
    while let Some(c) = chars.next() {
        if c == '-' && chars.peek().is_some_and(|n| n.is_ascii_lowercase()) {
            return Err(DomError::InvalidDataKey(key.to_string()));
        }
        if c.is_ascii_uppercase() {
            attr.push('-');
            attr.push(c.to_ascii_lowercase());
        } else {
            attr.push(c);
        }
    }
    validate_attribute_name(&attr).map_err(|_| DomError::InvalidDataKey(key.to_string()))?;
    Ok(attr)
}

/// `data-foo-bar` → `fooBar`; `None` for non-data attributes
pub fn attr_to_dataset_key(name: &str) -> Option<String> {
    let rest = name.strip_prefix("data-")?;
    let mut key = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                key.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => key.push(c),
        }
    }
    Some(key)
}

/// `backgroundColor` → `background-color`; kebab-case and custom properties pass through
pub fn css_property_name(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_string();
    }
    if key == "cssFloat" {
        return "float".to_string();
    }

    let mut name = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// Split an inline `style` attribute into `(property, value)` declarations
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Inverse of [`parse_style`]: `color: red; width: 10px;`
pub fn serialize_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}
