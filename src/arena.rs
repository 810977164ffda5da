use std::cmp;
use std::ops::{Index, IndexMut};

/// Stable handle of a node slot in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) payload: Option<V>,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(parent: Link, key: K, payload: Option<V>) -> Self {
        Self {
            key,
            payload,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Owns every node of a tree. Slots of removed nodes are recycled.
#[derive(Clone)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free_list: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            debug_assert!(self.slots[id.0].is_none());
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("double free of node slot {}", id.0));
        self.free_list.push(id);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    /// Height of an optional subtree, 0 when absent.
    pub(crate) fn height(&self, link: Link) -> usize {
        link.map_or(0, |id| self[id].height)
    }

    pub(crate) fn balance_factor(&self, id: NodeId) -> isize {
        let node = &self[id];
        self.height(node.left) as isize - self.height(node.right) as isize
    }

    pub(crate) fn adjust_height(&mut self, id: NodeId) {
        let height = 1 + cmp::max(self.height(self[id].left), self.height(self[id].right));
        self[id].height = height;
    }

    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// Swaps key and payload of two distinct nodes, leaving all links in place.
    pub(crate) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        assert_ne!(a, b);
        let (lo, hi) = (cmp::min(a.0, b.0), cmp::max(a.0, b.0));
        let (head, tail) = self.slots.split_at_mut(hi);
        let (Some(lo_node), Some(hi_node)) = (head[lo].as_mut(), tail[0].as_mut()) else {
            panic!("swap of a freed node slot");
        };
        std::mem::swap(&mut lo_node.key, &mut hi_node.key);
        std::mem::swap(&mut lo_node.payload, &mut hi_node.payload);
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("stale node id {}", id.0),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("stale node id {}", id.0),
        }
    }
}
