//! Node arena for one imported model.
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeHandle`];
//! parent links are plain handles, so the tree has no ownership cycles.

use glam::Mat4;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,
}

impl NodeTree {
    /// Creates a tree containing only its root node.
    #[must_use]
    pub fn new(root_name: impl Into<String>, root_local: Mat4) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(root_name, root_local));
        Self { nodes, root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Appends a new child under `parent`, keeping both ends of the link in sync.
    ///
    /// A descendant of a node on the bone route is itself on the route.
    ///
    /// # Panics
    /// Panics if `parent` is not a node of this tree.
    pub fn add_child(&mut self, parent: NodeHandle, mut node: Node) -> NodeHandle {
        let parent_node = &self.nodes[parent];
        node.parent = Some(parent);
        node.combined_transform = parent_node.combined_transform * node.local_transform;
        if parent_node.is_on_bone_route {
            node.is_on_bone_route = true;
        }

        let handle = self.nodes.insert(node);
        self.nodes[parent].children.push(handle);
        handle
    }

    /// Finds the first node named `name` in pre-order (parent before children,
    /// children in order).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.depth_first().find(|&h| self.nodes[h].name == name)
    }

    /// Node handles in pre-order starting at the root.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Iterates all nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Mutable access to every node in arena order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeHandle, &mut Node)> {
        self.nodes.iter_mut()
    }

    /// Number of edges between the root and `handle`.
    #[must_use]
    pub fn depth(&self, handle: NodeHandle) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(handle).and_then(Node::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// Restores every node's local transform to its imported value.
    pub fn reset_to_bind_pose(&mut self) {
        for (_, node) in &mut self.nodes {
            node.reset_to_bind_pose();
        }
    }
}

impl std::ops::Index<NodeHandle> for NodeTree {
    type Output = Node;

    fn index(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle]
    }
}

impl std::ops::IndexMut<NodeHandle> for NodeTree {
    fn index_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle]
    }
}

/// Pre-order traversal with an explicit stack.
pub struct DepthFirst<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeHandle>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        let handle = self.stack.pop()?;
        if let Some(node) = self.tree.nodes.get(handle) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(handle)
    }
}
