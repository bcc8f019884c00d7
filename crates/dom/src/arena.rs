//! Arena-based DOM tree storage
//!
//! This arena eliminates:
//! - Rc/Arc overhead (16 bytes per pointer)
//! - Parent/child ownership cycles
//!
//! Whole-tree walks (traversal, serialization, cloning) use explicit stacks,
//! so trees built by repeated insertion can't overflow the call stack.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Nodes are never freed. A removed node keeps its slot with `parent_id == None`
//! and stays valid, so handles held elsewhere never dangle.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a fresh, detached node and return its ID
    pub fn create_node(&mut self, node_type: NodeType, node_name: &str) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes
            .push(DomNode::new(node_id, node_type, node_name.to_string()));
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get element by ID, rejecting text/comment/document nodes
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: NodeType::Element.to_string(),
                actual: node.node_type.to_string(),
            });
        }
        Ok(node)
    }

    /// Mutable variant of [`DomArena::element`]
    pub fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.element(node_id)?;
        self.get_mut(node_id)
    }

    /// Get a node that may hold children; text and comments can't
    pub fn container(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
            return Err(DomError::InvalidNodeType {
                expected: format!("{} or {}", NodeType::Element, NodeType::Document),
                actual: node.node_type.to_string(),
            });
        }
        Ok(node)
    }

    /// Total number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get parent ID of a node
    pub fn parent_id(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Element children only, in order
    pub fn element_children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        Ok(node
            .children_ids
            .iter()
            .copied()
            .filter(|&id| self.get(id).map(|n| n.is_element()).unwrap_or(false))
            .collect())
    }

    pub fn first_child(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.children_ids.first().copied())
    }

    /// Sibling right after this node, of any type
    pub fn next_sibling(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        let Some(parent_id) = self.parent_id(node_id)? else {
            return Ok(None);
        };
        let siblings = &self.get(parent_id)?.children_ids;
        Ok(siblings
            .iter()
            .position(|&id| id == node_id)
            .and_then(|index| siblings.get(index + 1).copied()))
    }

    /// Nearest element sibling before this node
    pub fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent_id = self.get(node_id).ok()?.parent_id?;
        let siblings = &self.get(parent_id).ok()?.children_ids;
        let index = siblings.iter().position(|&id| id == node_id)?;
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|&id| self.get(id).map(|n| n.is_element()).unwrap_or(false))
    }

    /// True when `ancestor` is `node_id` itself or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).ok().and_then(|n| n.parent_id);
        }
        false
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// All descendants of a node in document order, excluding the node itself
    pub fn descendants(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.traverse_df(node_id, |node| {
            if node.node_id != node_id {
                out.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Unlink a node from its parent. Detached nodes are left alone.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(parent_id) = self.get(node_id)?.parent_id else {
            return Ok(());
        };
        self.get_mut(parent_id)?
            .children_ids
            .retain(|id| *id != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    /// Insert `child` under `parent`, before the `reference` child (append when `None`).
    ///
    /// The child is detached from its current parent first, so attached nodes move.
    /// Text and comment nodes never take children.
    pub fn insert_child(
        &mut self,
        parent_id: NodeId,
        child_id: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.container(parent_id)?;
        self.get(child_id)?;
        if self.is_inclusive_ancestor(child_id, parent_id) {
            return Err(DomError::HierarchyRequest {
                parent: parent_id,
                child: child_id,
            });
        }

        self.detach(child_id)?;

        let parent = self.get_mut(parent_id)?;
        let index = match reference {
            Some(reference_id) => parent
                .children_ids
                .iter()
                .position(|&id| id == reference_id)
                .ok_or(DomError::NodeNotFound(reference_id))?,
            None => parent.children_ids.len(),
        };
        parent.children_ids.insert(index, child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child_id in children {
            self.get_mut(child_id)?.parent_id = None;
        }
        Ok(())
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DomArena, NodeId, NodeId, NodeId) {
        // Create tree: root -> [child1, child2]
        let mut arena = DomArena::new();
        let root = arena.create_node(NodeType::Element, "div");
        let child1 = arena.create_node(NodeType::Element, "span");
        let child2 = arena.create_node(NodeType::Element, "p");
        arena.insert_child(root, child1, None).unwrap();
        arena.insert_child(root, child2, None).unwrap();
        (arena, root, child1, child2)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_node(NodeType::Element, "div");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert!(retrieved.parent_id.is_none());
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_traverse_df() {
        let (arena, root, _, _) = tree();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["div", "span", "p"]);
        assert_eq!(arena.descendants(root).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_moves_node() {
        let (mut arena, root, child1, child2) = tree();

        arena.insert_child(child2, child1, None).unwrap();

        assert_eq!(arena.get(root).unwrap().children_ids.as_slice(), &[child2]);
        assert_eq!(arena.parent_id(child1).unwrap(), Some(child2));
    }

    #[test]
    fn test_insert_before_reference() {
        let (mut arena, root, child1, child2) = tree();

        // Moving within the same parent resolves the reference after detaching
        arena.insert_child(root, child2, Some(child1)).unwrap();
        assert_eq!(arena.get(root).unwrap().children_ids.as_slice(), &[child2, child1]);

        let stray = arena.create_node(NodeType::Element, "b");
        // Reference must be a child of the parent
        let err = arena.insert_child(root, stray, Some(stray)).unwrap_err();
        assert!(matches!(err, DomError::NodeNotFound(id) if id == stray));
    }

    #[test]
    fn test_insert_rejects_cycle() {
        let (mut arena, root, child1, _) = tree();

        let err = arena.insert_child(child1, root, None).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
        assert!(arena.insert_child(root, root, None).is_err());
    }

    #[test]
    fn test_character_data_has_no_children() {
        let (mut arena, root, child1, _) = tree();
        let text = arena.create_node(NodeType::Text, "#text");
        let comment = arena.create_node(NodeType::Comment, "#comment");
        arena.insert_child(child1, text, None).unwrap();

        for parent in [text, comment] {
            let err = arena.insert_child(parent, root, None).unwrap_err();
            assert!(matches!(err, DomError::InvalidNodeType { .. }));
        }
        assert!(arena.get(text).unwrap().children_ids.is_empty());
        // The rejected child was not detached
        assert_eq!(arena.parent_id(root).unwrap(), None);
        assert_eq!(arena.get(root).unwrap().children_ids.len(), 2);
    }

    #[test]
    fn test_detach_and_siblings() {
        let (mut arena, root, child1, child2) = tree();

        assert_eq!(arena.previous_element_sibling(child2), Some(child1));
        assert_eq!(arena.next_sibling(child1).unwrap(), Some(child2));
        arena.detach(child1).unwrap();
        assert_eq!(arena.previous_element_sibling(child2), None);
        assert_eq!(arena.get(root).unwrap().children_ids.as_slice(), &[child2]);
        assert!(!arena.is_inclusive_ancestor(root, child1));

        // Detaching twice is fine
        arena.detach(child1).unwrap();
    }
}
