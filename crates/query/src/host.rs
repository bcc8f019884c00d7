//! Host trait - everything the wrapper needs from a document
//!
//! The wrapper never touches a tree directly. Each operation forwards to one
//! of these calls, so any document implementation can sit underneath.

use dom::{Document, EventCallback, InsertPosition, ListenerId, NodeId, Result};

pub trait Host {
    /// Scope used by queries without an explicit parent
    fn root(&self) -> NodeId;

    fn query_one(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>>;
    fn query_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>>;

    /// Parse markup into new, unattached top-level nodes
    fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>>;

    fn is_element(&self, node: NodeId) -> bool;

    fn inner_html(&self, node: NodeId) -> Result<String>;
    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<()>;
    fn text_content(&self, node: NodeId) -> Result<String>;
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()>;

    fn insert_adjacent_html(&mut self, node: NodeId, position: InsertPosition, markup: &str) -> Result<()>;
    fn insert_adjacent_nodes(&mut self, node: NodeId, position: InsertPosition, nodes: &[NodeId]) -> Result<()>;
    fn remove(&mut self, node: NodeId) -> Result<()>;
    fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId>;

    /// Simulated click, returns how many listeners ran
    fn click(&self, node: NodeId) -> Result<usize>;
    fn add_click_listener(&mut self, node: NodeId, callback: EventCallback) -> Result<ListenerId>;
    fn remove_click_listeners(&mut self, node: NodeId) -> Result<usize>;

    fn value(&self, node: NodeId) -> Result<Option<String>>;
    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()>;

    fn add_class(&mut self, node: NodeId, token: &str) -> Result<()>;
    fn remove_class(&mut self, node: NodeId, token: &str) -> Result<()>;
    fn clear_classes(&mut self, node: NodeId) -> Result<()>;

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()>;

    fn data(&self, node: NodeId, key: &str) -> Result<Option<String>>;
    /// Dataset keys currently present, in attribute order
    fn data_keys(&self, node: NodeId) -> Result<Vec<String>>;
    fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> Result<()>;
    fn remove_data(&mut self, node: NodeId, key: &str) -> Result<()>;

    fn style(&self, node: NodeId, property: &str) -> Result<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()>;
}

impl Host for Document {
    fn root(&self) -> NodeId {
        Document::root(self)
    }

    fn query_one(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector(scope, selector)
    }

    fn query_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all(scope, selector)
    }

    fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>> {
        Document::parse_fragment(self, markup)
    }

    fn is_element(&self, node: NodeId) -> bool {
        Document::is_element(self, node)
    }

    fn inner_html(&self, node: NodeId) -> Result<String> {
        Document::inner_html(self, node)
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<()> {
        Document::set_inner_html(self, node, markup)
    }

    fn text_content(&self, node: NodeId) -> Result<String> {
        Document::text_content(self, node)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        Document::set_text_content(self, node, text)
    }

    fn insert_adjacent_html(&mut self, node: NodeId, position: InsertPosition, markup: &str) -> Result<()> {
        Document::insert_adjacent_html(self, node, position, markup)
    }

    fn insert_adjacent_nodes(&mut self, node: NodeId, position: InsertPosition, nodes: &[NodeId]) -> Result<()> {
        Document::insert_adjacent_nodes(self, node, position, nodes)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        Document::remove(self, node)
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId> {
        Document::clone_node(self, node, deep)
    }

    fn click(&self, node: NodeId) -> Result<usize> {
        Document::click(self, node)
    }

    fn add_click_listener(&mut self, node: NodeId, callback: EventCallback) -> Result<ListenerId> {
        self.add_event_listener(node, "click", callback)
    }

    fn remove_click_listeners(&mut self, node: NodeId) -> Result<usize> {
        self.remove_event_listeners(node, "click")
    }

    fn value(&self, node: NodeId) -> Result<Option<String>> {
        Document::value(self, node)
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        Document::set_value(self, node, value)
    }

    fn add_class(&mut self, node: NodeId, token: &str) -> Result<()> {
        Document::add_class(self, node, token)
    }

    fn remove_class(&mut self, node: NodeId, token: &str) -> Result<()> {
        Document::remove_class(self, node, token)
    }

    fn clear_classes(&mut self, node: NodeId) -> Result<()> {
        self.set_class_name(node, "")
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Document::attribute(self, node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        Document::set_attribute(self, node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        Document::remove_attribute(self, node, name)
    }

    fn data(&self, node: NodeId, key: &str) -> Result<Option<String>> {
        Document::data(self, node, key)
    }

    fn data_keys(&self, node: NodeId) -> Result<Vec<String>> {
        Ok(self.dataset(node)?.into_iter().map(|(key, _)| key).collect())
    }

    fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        Document::set_data(self, node, key, value)
    }

    fn remove_data(&mut self, node: NodeId, key: &str) -> Result<()> {
        Document::remove_data(self, node, key)
    }

    fn style(&self, node: NodeId, property: &str) -> Result<String> {
        Document::style(self, node, property)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        Document::set_style(self, node, property, value)
    }
}
