//! Document - Main entry point for DOM operations
//!
//! This handles:
//! - Tree construction from markup
//! - Selector queries scoped to a node
//! - Content mutation (innerHTML, textContent, positional insertion)
//! - Attribute, class, dataset, inline style and form value storage
//! - Event listener registration and dispatch

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::events::{Event, EventCallback, ListenerId, ListenerRegistry};
use crate::parser;
use crate::selector::SelectorList;
use crate::serializer::{DomSerializer, SerializerConfig};
use crate::types::*;
use crate::utils;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Node slots reserved up front
    pub initial_capacity: usize,
    /// Deepest element nesting accepted from markup
    pub max_depth: usize,
    pub serializer: SerializerConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_depth: 512,
            serializer: SerializerConfig::default(),
        }
    }
}

impl DocumentConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

const DISABLEABLE: &[&str] = &["button", "input", "select", "textarea", "optgroup", "option", "fieldset"];

/// In-memory document
pub struct Document {
    config: DocumentConfig,
    arena: DomArena,
    root_id: NodeId,
    serializer: DomSerializer,
    listeners: ListenerRegistry,
}

impl Document {
    /// Create an empty document with default config
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create an empty document with custom config
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut arena = DomArena::with_capacity(config.initial_capacity);
        let root_id = arena.create_node(NodeType::Document, "#document");

        Self {
            serializer: DomSerializer::with_config(config.serializer.clone()),
            config,
            arena,
            root_id,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Build a document whose root holds the parsed markup
    pub fn from_html(markup: &str) -> Result<Self> {
        Self::from_html_with_config(markup, DocumentConfig::default())
    }

    pub fn from_html_with_config(markup: &str, config: DocumentConfig) -> Result<Self> {
        let mut document = Self::with_config(config);
        let root = document.root_id;
        for node_id in document.parse_fragment(markup)? {
            document.arena.insert_child(root, node_id, None)?;
        }
        debug!("Built document with {} nodes", document.arena.len());
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        self.root_id
    }

    pub fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.arena.get(node_id).map(|n| n.is_element()).unwrap_or(false)
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.arena.is_inclusive_ancestor(self.root_id, node_id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena
            .create_node(NodeType::Element, &tag.to_ascii_lowercase())
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let node_id = self.arena.create_node(NodeType::Text, "#text");
        if let Ok(node) = self.arena.get_mut(node_id) {
            node.node_value = text.to_string();
        }
        node_id
    }

    // ---- parsing & queries -------------------------------------------------

    /// Parse markup into new detached nodes, returned in order
    pub fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>> {
        let nodes = parser::parse_fragment(&mut self.arena, markup, self.config.max_depth)?;
        trace!("Parsed fragment into {} top-level nodes", nodes.len());
        Ok(nodes)
    }

    /// First descendant of `scope` matching `selector`, in document order
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .arena
            .descendants(scope)?
            .into_iter()
            .find(|&id| list.matches(&self.arena, id)))
    }

    /// Every descendant of `scope` matching `selector`, in document order
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .arena
            .descendants(scope)?
            .into_iter()
            .filter(|&id| list.matches(&self.arena, id))
            .collect())
    }

    pub fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        self.arena.get(node_id)?;
        Ok(SelectorList::parse(selector)?.matches(&self.arena, node_id))
    }

    // ---- content -------------------------------------------------------------

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer.inner_html(&self.arena, node_id)
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer.outer_html(&self.arena, node_id)
    }

    /// Replace the children of a node with parsed markup
    pub fn set_inner_html(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        self.arena.container(node_id)?;
        let nodes = self.parse_fragment(markup)?;
        self.arena.clear_children(node_id)?;
        for child in nodes {
            self.arena.insert_child(node_id, child, None)?;
        }
        trace!("Set inner html of node {}", node_id);
        Ok(())
    }

    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        utils::get_text_content(&self.arena, node_id)
    }

    /// Replace children with a single text node (none for empty text)
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;
        if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
            node.node_value = text.to_string();
            return Ok(());
        }

        self.arena.clear_children(node_id)?;
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.arena.insert_child(node_id, text_id, None)?;
        }
        Ok(())
    }

    /// Detach a node from its parent; detached nodes are left alone
    pub fn remove(&mut self, node_id: NodeId) -> Result<()> {
        self.arena.detach(node_id)?;
        trace!("Removed node {}", node_id);
        Ok(())
    }

    /// Insert nodes at `position` relative to `node_id`, keeping their order
    pub fn insert_adjacent_nodes(
        &mut self,
        node_id: NodeId,
        position: InsertPosition,
        nodes: &[NodeId],
    ) -> Result<()> {
        let sibling_position = matches!(
            position,
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd
        );
        let parent_id = if sibling_position {
            self.arena
                .parent_id(node_id)?
                .ok_or(DomError::NoParent(node_id))?
        } else {
            self.arena.container(node_id)?;
            node_id
        };

        // Inserting a node next to itself changes nothing
        let nodes: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&id| !(sibling_position && id == node_id))
            .collect();

        for &child in &nodes {
            self.arena.get(child)?;
            if self.arena.is_inclusive_ancestor(child, parent_id) {
                return Err(DomError::HierarchyRequest {
                    parent: parent_id,
                    child,
                });
            }
        }
        for &child in &nodes {
            self.arena.detach(child)?;
        }

        let reference = match position {
            InsertPosition::BeforeBegin => Some(node_id),
            InsertPosition::AfterBegin => self.arena.first_child(node_id)?,
            InsertPosition::BeforeEnd => None,
            InsertPosition::AfterEnd => self.arena.next_sibling(node_id)?,
        };
        for &child in &nodes {
            self.arena.insert_child(parent_id, child, reference)?;
        }

        trace!(
            "Inserted {} nodes at {:?} of node {}",
            nodes.len(),
            position,
            node_id
        );
        Ok(())
    }

    /// Parse markup and insert it at `position` relative to `node_id`
    pub fn insert_adjacent_html(
        &mut self,
        node_id: NodeId,
        position: InsertPosition,
        markup: &str,
    ) -> Result<()> {
        match position {
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd => {
                if self.arena.parent_id(node_id)?.is_none() {
                    return Err(DomError::NoParent(node_id));
                }
            }
            InsertPosition::AfterBegin | InsertPosition::BeforeEnd => {
                self.arena.container(node_id)?;
            }
        }
        let nodes = self.parse_fragment(markup)?;
        self.insert_adjacent_nodes(node_id, position, &nodes)
    }

    /// Detached copy of a node; `deep` copies descendants too. Listeners are not copied.
    pub fn clone_node(&mut self, node_id: NodeId, deep: bool) -> Result<NodeId> {
        let copy = self.copy_node(node_id)?;
        if !deep {
            return Ok(copy);
        }

        // (source, copy) pairs whose children still need copying
        let mut pending = vec![(node_id, copy)];
        while let Some((source, target)) = pending.pop() {
            let children = self.arena.get(source)?.children_ids.clone();
            for child in children {
                let child_copy = self.copy_node(child)?;
                self.arena.insert_child(target, child_copy, None)?;
                pending.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    /// New detached node with the same type, name, value, attributes and form state
    fn copy_node(&mut self, node_id: NodeId) -> Result<NodeId> {
        let source = self.arena.get(node_id)?;
        let (node_type, node_name) = (source.node_type, source.node_name.clone());
        let node_value = source.node_value.clone();
        let attributes = source.attributes.clone();
        let value = source.value.clone();

        let copy = self.arena.create_node(node_type, &node_name);
        let node = self.arena.get_mut(copy)?;
        node.node_value = node_value;
        node.attributes = attributes;
        node.value = value;
        Ok(copy)
    }

    // ---- events ---------------------------------------------------------------

    pub fn add_event_listener(
        &mut self,
        node_id: NodeId,
        kind: &str,
        callback: EventCallback,
    ) -> Result<ListenerId> {
        self.arena.get(node_id)?;
        let id = self.listeners.add(node_id, kind, callback);
        trace!("Added {} listener {} to node {}", kind, id, node_id);
        Ok(id)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Remove every `kind` listener on a node
    pub fn remove_event_listeners(&mut self, node_id: NodeId, kind: &str) -> Result<usize> {
        self.arena.get(node_id)?;
        Ok(self.listeners.remove_kind(node_id, kind))
    }

    pub fn listener_count(&self, node_id: NodeId) -> usize {
        self.listeners.count(node_id)
    }

    /// Deliver an event at `target`, bubbling through its ancestors.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, target: NodeId, kind: &str) -> Result<usize> {
        self.arena.get(target)?;

        let mut invoked = 0;
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            let event = Event {
                kind: kind.to_string(),
                target,
                current_target: current,
            };
            for callback in self.listeners.callbacks(current, kind) {
                callback(&event);
                invoked += 1;
            }
            cursor = self.arena.parent_id(current)?;
        }

        trace!("Dispatched {} at node {} to {} listeners", kind, target, invoked);
        Ok(invoked)
    }

    /// Simulated primary click. Disabled form controls ignore it.
    pub fn click(&self, node_id: NodeId) -> Result<usize> {
        let node = self.arena.get(node_id)?;
        if node.is_element()
            && DISABLEABLE.contains(&node.node_name.as_str())
            && node.has_attr("disabled")
        {
            debug!("Ignoring click on disabled node {}", node_id);
            return Ok(0);
        }
        self.dispatch_event(node_id, "click")
    }

    // ---- form values ------------------------------------------------------

    /// Current form value; `None` for elements without one
    pub fn value(&self, node_id: NodeId) -> Result<Option<String>> {
        let node = self.arena.element(node_id)?;
        let value = match node.node_name.as_str() {
            "input" => Some(node.value.clone().unwrap_or_else(|| {
                match node.attr("value") {
                    Some(v) => v.to_string(),
                    None if matches!(node.attr("type"), Some("checkbox" | "radio")) => {
                        "on".to_string()
                    }
                    None => String::new(),
                }
            })),
            "textarea" => match &node.value {
                Some(v) => Some(v.clone()),
                None => Some(self.text_content(node_id)?),
            },
            "select" => {
                let options = self.query_selector_all(node_id, "option")?;
                let chosen = options
                    .iter()
                    .copied()
                    .find(|&id| self.arena.get(id).map(|o| o.has_attr("selected")).unwrap_or(false))
                    .or_else(|| options.first().copied());
                match chosen {
                    Some(option) => Some(self.option_value(option)?),
                    None => Some(String::new()),
                }
            }
            "option" => Some(self.option_value(node_id)?),
            "button" => Some(node.attr("value").unwrap_or_default().to_string()),
            _ => node.value.clone(),
        };
        Ok(value)
    }

    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.arena.element(node_id)?.node_name == "select" {
            for option in self.query_selector_all(node_id, "option")? {
                let selected = self.option_value(option)? == value;
                let node = self.arena.get_mut(option)?;
                if selected {
                    node.set_attr("selected", "");
                } else {
                    node.remove_attr("selected");
                }
            }
            return Ok(());
        }

        self.arena.element_mut(node_id)?.value = Some(value.to_string());
        Ok(())
    }

    fn option_value(&self, option: NodeId) -> Result<String> {
        match self.arena.get(option)?.attr("value") {
            Some(v) => Ok(v.to_string()),
            None => Ok(self.text_content(option)?.trim().to_string()),
        }
    }

    // ---- classes ----------------------------------------------------------

    pub fn class_list(&self, node_id: NodeId) -> Result<Vec<String>> {
        Ok(self
            .arena
            .element(node_id)?
            .class_tokens()
            .iter()
            .map(|t| t.to_string())
            .collect())
    }

    pub fn add_class(&mut self, node_id: NodeId, token: &str) -> Result<()> {
        utils::validate_class_token(token)?;
        let node = self.arena.element_mut(node_id)?;
        let mut tokens: Vec<String> = Vec::new();
        for existing in node.class_tokens() {
            if !tokens.iter().any(|t| t == existing) {
                tokens.push(existing.to_string());
            }
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
        node.set_attr("class", &tokens.join(" "));
        Ok(())
    }

    pub fn remove_class(&mut self, node_id: NodeId, token: &str) -> Result<()> {
        utils::validate_class_token(token)?;
        let node = self.arena.element_mut(node_id)?;
        if !node.has_attr("class") {
            return Ok(());
        }
        let mut tokens: Vec<String> = Vec::new();
        for existing in node.class_tokens() {
            if existing != token && !tokens.iter().any(|t| t == existing) {
                tokens.push(existing.to_string());
            }
        }
        node.set_attr("class", &tokens.join(" "));
        Ok(())
    }

    /// Overwrite the whole class attribute
    pub fn set_class_name(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        self.arena.element_mut(node_id)?.set_attr("class", class_name);
        Ok(())
    }

    // ---- attributes ---------------------------------------------------------

    pub fn attribute(&self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        let name = name.to_ascii_lowercase();
        Ok(self.arena.element(node_id)?.attr(&name).map(String::from))
    }

    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        utils::validate_attribute_name(name)?;
        let name = name.to_ascii_lowercase();
        self.arena.element_mut(node_id)?.set_attr(&name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        self.arena.element_mut(node_id)?.remove_attr(&name);
        Ok(())
    }

    // ---- dataset ----------------------------------------------------------

    /// All `data-*` entries as `(camelCaseKey, value)`, in attribute order
    pub fn dataset(&self, node_id: NodeId) -> Result<Vec<(String, String)>> {
        Ok(self
            .arena
            .element(node_id)?
            .attributes
            .iter()
            .filter_map(|a| utils::attr_to_dataset_key(&a.name).map(|key| (key, a.value.clone())))
            .collect())
    }

    /// Dataset value; keys with no attribute form (`foo-bar`) are simply absent
    pub fn data(&self, node_id: NodeId, key: &str) -> Result<Option<String>> {
        let node = self.arena.element(node_id)?;
        let Ok(attr) = utils::dataset_key_to_attr(key) else {
            return Ok(None);
        };
        Ok(node.attr(&attr).map(String::from))
    }

    pub fn set_data(&mut self, node_id: NodeId, key: &str, value: &str) -> Result<()> {
        let attr = utils::dataset_key_to_attr(key)?;
        self.arena.element_mut(node_id)?.set_attr(&attr, value);
        Ok(())
    }

    pub fn remove_data(&mut self, node_id: NodeId, key: &str) -> Result<()> {
        let attr = utils::dataset_key_to_attr(key)?;
        self.arena.element_mut(node_id)?.remove_attr(&attr);
        Ok(())
    }

    // ---- inline style -------------------------------------------------------

    /// Inline style value of one property, empty when unset
    pub fn style(&self, node_id: NodeId, property: &str) -> Result<String> {
        let name = utils::css_property_name(property);
        let node = self.arena.element(node_id)?;
        Ok(utils::parse_style(node.attr("style").unwrap_or_default())
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .unwrap_or_default())
    }

    /// Set one inline style property; an empty value removes it
    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let name = utils::css_property_name(property);
        let node = self.arena.element_mut(node_id)?;
        let mut declarations = utils::parse_style(node.attr("style").unwrap_or_default());

        let value = value.trim();
        let position = declarations.iter().position(|(n, _)| *n == name);
        match (position, value.is_empty()) {
            (Some(index), false) => declarations[index].1 = value.to_string(),
            (Some(index), true) => {
                declarations.remove(index);
            }
            (None, false) => declarations.push((name, value.to_string())),
            (None, true) => {}
        }

        if declarations.is_empty() && !node.has_attr("style") {
            return Ok(());
        }
        node.set_attr("style", &utils::serialize_style(&declarations));
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("config", &self.config)
            .field("nodes", &self.arena.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
