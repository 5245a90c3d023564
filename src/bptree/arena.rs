//! A slab of tree nodes addressed by handle.
//!
//! Nodes reference each other through [`NodeId`]s instead of owning pointers:
//! the arena owns every node and a `NodeId` is an index into it, which keeps
//! the sibling chains free of reference-counting cycles. The tree never frees
//! individual nodes (there is no deletion), so the arena needs no free list;
//! `clear` drops all nodes at once.

use super::node::{GuideNode, LeafNode, Node};

/// A handle to a node stored in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        assert!(
            index < u32::MAX as usize,
            "too many nodes allocated for one tree"
        );
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns every node of one tree.
pub struct NodeArena<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> NodeArena<K, V> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Stores `node` and returns its handle.
    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.index()]
    }

    /// Returns the leaf behind `id`.
    ///
    /// Callers only hold leaf ids obtained from a descent or from the leaf
    /// chain, so `id` referring to a guide node is a bug in the tree itself.
    pub fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        match self.node(id) {
            Node::Leaf(leaf) => leaf,
            Node::Guide(_) => unreachable!("expected {id:?} to be a leaf node"),
        }
    }

    pub fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        match self.node_mut(id) {
            Node::Leaf(leaf) => leaf,
            Node::Guide(_) => unreachable!("expected {id:?} to be a leaf node"),
        }
    }

    pub fn guide(&self, id: NodeId) -> &GuideNode<K> {
        match self.node(id) {
            Node::Guide(guide) => guide,
            Node::Leaf(_) => unreachable!("expected {id:?} to be a guide node"),
        }
    }

    pub fn guide_mut(&mut self, id: NodeId) -> &mut GuideNode<K> {
        match self.node_mut(id) {
            Node::Guide(guide) => guide,
            Node::Leaf(_) => unreachable!("expected {id:?} to be a guide node"),
        }
    }

    /// The number of live nodes, guides and leaves combined.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
