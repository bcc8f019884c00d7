//! DOM Serializer - Convert a subtree back to HTML markup
//!
//! This module handles:
//! - innerHTML / outerHTML generation
//! - Escaping of text and attribute values
//! - Void and raw-text element rules

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Emit void elements as `<br/>` instead of `<br>`
    pub self_close_void: bool,
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Markup of the node's children
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let node = arena.get(node_id)?;
        let raw = node.is_element() && is_raw_text_element(&node.node_name);
        let mut stack: Vec<Step> = node
            .children_ids
            .iter()
            .rev()
            .map(|&id| Step::Open { id, raw_parent: raw })
            .collect();
        self.serialize(arena, &mut stack)
    }

    /// Markup of the node itself, children included
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let raw_parent = match arena.parent_id(node_id)? {
            Some(parent_id) => {
                let parent = arena.get(parent_id)?;
                parent.is_element() && is_raw_text_element(&parent.node_name)
            }
            None => false,
        };
        let mut stack = vec![Step::Open {
            id: node_id,
            raw_parent,
        }];
        self.serialize(arena, &mut stack)
    }

    /// Drain the work stack; children are pushed in reverse so they pop in order
    fn serialize(&self, arena: &DomArena, stack: &mut Vec<Step>) -> Result<String> {
        let mut output = String::new();

        while let Some(step) = stack.pop() {
            let (node_id, raw_parent) = match step {
                Step::Open { id, raw_parent } => (id, raw_parent),
                Step::Close(id) => {
                    output.push_str("</");
                    output.push_str(&arena.get(id)?.node_name);
                    output.push('>');
                    continue;
                }
            };
            let node = arena.get(node_id)?;

            match node.node_type {
                NodeType::Element => {
                    // Format: <tag id="123" class="foo">
                    output.push('<');
                    output.push_str(&node.node_name);
                    for attr in &node.attributes {
                        output.push(' ');
                        output.push_str(&attr.name);
                        output.push_str("=\"");
                        escape_into(&attr.value, true, &mut output);
                        output.push('"');
                    }

                    if is_void_element(&node.node_name) {
                        output.push_str(if self.config.self_close_void { "/>" } else { ">" });
                        continue;
                    }
                    output.push('>');

                    let raw = is_raw_text_element(&node.node_name);
                    stack.push(Step::Close(node_id));
                    stack.extend(
                        node.children_ids
                            .iter()
                            .rev()
                            .map(|&id| Step::Open { id, raw_parent: raw }),
                    );
                }
                NodeType::Text => {
                    if raw_parent {
                        output.push_str(&node.node_value);
                    } else {
                        escape_into(&node.node_value, false, &mut output);
                    }
                }
                NodeType::Comment => {
                    output.push_str("<!--");
                    output.push_str(&node.node_value);
                    output.push_str("-->");
                }
                NodeType::Document => {
                    // Container only, serialize children
                    stack.extend(node.children_ids.iter().rev().map(|&id| Step::Open {
                        id,
                        raw_parent: false,
                    }));
                }
            }
        }

        Ok(output)
    }
}

/// Pending serializer work
enum Step {
    Open { id: NodeId, raw_parent: bool },
    Close(NodeId),
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_into(text: &str, attribute_mode: bool, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if attribute_mode => output.push_str("&quot;"),
            '<' if !attribute_mode => output.push_str("&lt;"),
            '>' if !attribute_mode => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}
