use crate::arena::{Link, Node, NodeArena, NodeId};

/// An ordered map from keys to optional payloads, implemented with an AVL tree.
///
/// Keys are compared with `<` only: a key equal to a stored key is routed into
/// its right subtree, so inserting an existing key stores a second entry
/// instead of replacing the first one.
///
/// ```
/// use avltree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(5, "five");
/// tree.insert(4, "four");
/// tree.insert(3, "three");
/// assert_eq!(tree.search(&4), Some(&"four"));
/// tree.delete(&4);
/// assert!(tree.search(&4).is_none());
/// assert_eq!(tree.to_string(), "3 -> (5)");
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V> {
    nodes: NodeArena<K, V>,
    root: Link,
    size: usize,
}

/// An in-order iterator over the entries of a tree.
pub struct Iter<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    next: Link,
    remaining: usize,
}

/// An in-order iterator over the keys of a tree.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

#[cfg(any(test, feature = "consistency_check"))]
#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            size: 0,
        }
    }

    /// Returns a reference to the payload stored with the key.
    ///
    /// Returns `None` if the key is missing or was inserted without a payload.
    pub fn search(&self, key: &K) -> Option<&V> {
        self.find(key)
            .and_then(|node_id| self.nodes[node_id].payload.as_ref())
    }

    /// Returns a mutable reference to the payload stored with the key.
    pub fn search_mut(&mut self, key: &K) -> Option<&mut V> {
        let node_id = self.find(key)?;
        self.nodes[node_id].payload.as_mut()
    }

    /// Returns true if the tree holds a node with the key, with or without payload.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a key with a payload.
    ///
    /// An existing equal key is kept; the new entry is stored next to it.
    pub fn insert(&mut self, key: K, payload: V) {
        self.insert_entry(key, Some(payload));
    }

    /// Inserts a key without a payload.
    pub fn insert_key(&mut self, key: K) {
        self.insert_entry(key, None);
    }

    /// Inserts a key with an optional payload.
    ///
    /// Ties are routed into the right subtree of the equal key.
    pub fn insert_entry(&mut self, key: K, payload: Option<V>) {
        let Some(mut parent_id) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(None, key, payload)));
            self.size = 1;
            return;
        };

        let go_left = loop {
            let parent = &self.nodes[parent_id];
            let go_left = key < parent.key;
            match if go_left { parent.left } else { parent.right } {
                Some(child_id) => parent_id = child_id,
                None => break go_left,
            }
        };

        let leaf_id = self.nodes.alloc(Node::leaf(Some(parent_id), key, payload));
        if go_left {
            self.nodes[parent_id].left = Some(leaf_id);
        } else {
            self.nodes[parent_id].right = Some(leaf_id);
        }
        self.size += 1;
        self.rebalance(Some(leaf_id));
    }

    /// Removes a key from the tree.
    ///
    /// Removing any key from a tree of exactly one entry empties the tree,
    /// whether or not the key matches. Removing a missing key from a larger
    /// tree does nothing.
    ///
    /// Removing an inner node moves the key and payload of its in-order
    /// neighbour into that node and unlinks the neighbour's node instead, so
    /// node contents do not keep their identity across a delete.
    pub fn delete(&mut self, key: &K) {
        if self.size == 1 {
            self.clear();
            return;
        }
        if let Some(node_id) = self.find(key) {
            debug_assert!(self.size >= 2);
            self.unlink_node(node_id);
            self.size -= 1;
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        if let Some(root_id) = self.root {
            assert!(self.nodes[root_id].parent.is_none());
        }

        // Check tree nodes
        let mut num_nodes = 0;
        self.preorder(|node_id| {
            let node = &self.nodes[node_id];
            let mut left_height = 0;
            let mut right_height = 0;

            // Check link for left child node
            if let Some(left_id) = node.left {
                let left = &self.nodes[left_id];
                assert!(left.parent == Some(node_id));
                assert!(left.key <= node.key);
                left_height = left.height;
            }

            // Check link for right child node
            if let Some(right_id) = node.right {
                let right = &self.nodes[right_id];
                assert!(right.parent == Some(node_id));
                assert!(right.key >= node.key);
                right_height = right.height;
            }

            // Check height
            assert_eq!(node.height, 1 + left_height.max(right_height));

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            num_nodes += 1;
        });

        // Check number of nodes
        assert_eq!(num_nodes, self.size);

        // Check in-order sequence
        let mut keys = self.keys();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev <= key);
                prev = key;
            }
        }
    }

    fn find(&self, key: &K) -> Link {
        let mut current = self.root;
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            current = if *key == node.key {
                break;
            } else if *key < node.key {
                node.left
            } else {
                node.right
            };
        }
        current
    }

    fn unlink_node(&mut self, mut node_id: NodeId) {
        // Replace inner nodes by their in-order neighbour until a leaf remains
        loop {
            let node = &self.nodes[node_id];
            let substitute_id = match (node.left, node.right) {
                (None, None) => break,
                (Some(left_id), _) => self.nodes.maximum(left_id),
                (None, Some(right_id)) => self.nodes.minimum(right_id),
            };
            self.nodes.swap_entries(node_id, substitute_id);
            node_id = substitute_id;
        }

        debug_assert!(self.nodes[node_id].is_leaf());
        match self.nodes[node_id].parent {
            None => self.root = None,
            Some(parent_id) => {
                *self.child_slot(parent_id, node_id) = None;
                // Parent node might be out of balance now
                self.rebalance(Some(parent_id));
            }
        }
        self.nodes.free(node_id);
    }

    /// Returns the link of `parent_id` that references `child_id`.
    fn child_slot(&mut self, parent_id: NodeId, child_id: NodeId) -> &mut Link {
        let parent = &mut self.nodes[parent_id];
        if parent.left == Some(child_id) {
            &mut parent.left
        } else if parent.right == Some(child_id) {
            &mut parent.right
        } else {
            panic!("tree is invalid: node is not a child of its parent");
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(node_id) = current {
            let head_id = self.rebalance_node(node_id);
            current = self.nodes[head_id].parent;
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Returns the node now heading the subtree, which differs from the given
    /// node after a rotation.
    fn rebalance_node(&mut self, node_id: NodeId) -> NodeId {
        let node = &self.nodes[node_id];
        let (left, right) = (node.left, node.right);
        for child_id in [left, right].into_iter().flatten() {
            self.nodes.adjust_height(child_id);
        }
        self.nodes.adjust_height(node_id);

        let balance = self.nodes.balance_factor(node_id);
        debug_assert!((-2..=2).contains(&balance));
        if balance > 1 {
            let left_id = self.left_of(node_id);
            if self.nodes.balance_factor(left_id) >= 0 {
                self.rotate_right(node_id)
            } else {
                self.rotate_left_right(node_id)
            }
        } else if balance < -1 {
            let right_id = self.right_of(node_id);
            if self.nodes.balance_factor(right_id) <= 0 {
                self.rotate_left(node_id)
            } else {
                self.rotate_right_left(node_id)
            }
        } else {
            node_id
        }
    }

    //       a          b
    //      / \        / \
    //     b   t3 ->  c   a
    //    / \        / \ / \
    //   c   t2    t0 t1 t2 t3
    //  / \
    // t0  t1
    fn rotate_right(&mut self, a: NodeId) -> NodeId {
        let b = self.left_of(a);
        let c = self.left_of(b);
        let subtrees = [
            self.nodes[c].left,
            self.nodes[c].right,
            self.nodes[b].right,
            self.nodes[a].right,
        ];
        self.restructure(a, b, [c, a], subtrees)
    }

    //     a            c
    //    / \         /   \
    //   b   t3  ->  b     a
    //  / \         / \   / \
    // t0  c       t0 t1 t2 t3
    //    / \
    //   t1  t2
    fn rotate_left_right(&mut self, a: NodeId) -> NodeId {
        let b = self.left_of(a);
        let c = self.right_of(b);
        let subtrees = [
            self.nodes[b].left,
            self.nodes[c].left,
            self.nodes[c].right,
            self.nodes[a].right,
        ];
        self.restructure(a, c, [b, a], subtrees)
    }

    //   a              b
    //  / \            / \
    // t0  b     ->   a   c
    //    / \        / \ / \
    //   t1  c      t0 t1 t2 t3
    //      / \
    //     t2  t3
    fn rotate_left(&mut self, a: NodeId) -> NodeId {
        let b = self.right_of(a);
        let c = self.right_of(b);
        let subtrees = [
            self.nodes[a].left,
            self.nodes[b].left,
            self.nodes[c].left,
            self.nodes[c].right,
        ];
        self.restructure(a, b, [a, c], subtrees)
    }

    //   a              c
    //  / \           /   \
    // t0  b    ->   a     b
    //    / \       / \   / \
    //   c   t3    t0 t1 t2 t3
    //  / \
    // t1  t2
    fn rotate_right_left(&mut self, a: NodeId) -> NodeId {
        let b = self.right_of(a);
        let c = self.left_of(b);
        let subtrees = [
            self.nodes[a].left,
            self.nodes[c].left,
            self.nodes[c].right,
            self.nodes[b].right,
        ];
        self.restructure(a, c, [a, b], subtrees)
    }

    /// Puts `head` in the place of `old_head`, with `low` and `high` as its
    /// children and the four subtrees, in key order, below those two.
    fn restructure(
        &mut self,
        old_head: NodeId,
        head: NodeId,
        [low, high]: [NodeId; 2],
        [t0, t1, t2, t3]: [Link; 4],
    ) -> NodeId {
        let grandparent = self.nodes[old_head].parent;
        match grandparent {
            None => self.root = Some(head),
            Some(grandparent_id) => *self.child_slot(grandparent_id, old_head) = Some(head),
        }
        self.nodes[head].parent = grandparent;

        self.link(head, Some(low), Some(high));
        self.link(low, t0, t1);
        self.link(high, t2, t3);

        self.nodes.adjust_height(low);
        self.nodes.adjust_height(high);
        self.nodes.adjust_height(head);
        head
    }

    fn link(&mut self, parent_id: NodeId, left: Link, right: Link) {
        for child_id in [left, right].into_iter().flatten() {
            self.nodes[child_id].parent = Some(parent_id);
        }
        let parent = &mut self.nodes[parent_id];
        parent.left = left;
        parent.right = right;
    }

    fn left_of(&self, node_id: NodeId) -> NodeId {
        self.nodes[node_id]
            .left
            .unwrap_or_else(|| panic!("tree is invalid: missing left child during rotation"))
    }

    fn right_of(&self, node_id: NodeId) -> NodeId {
        self.nodes[node_id]
            .right
            .unwrap_or_else(|| panic!("tree is invalid: missing right child during rotation"))
    }
}

impl<K, V> AvlTree<K, V> {
    /// Returns true if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        self.nodes.height(self.root)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.size = 0;
    }

    /// Returns the smallest key in the tree.
    pub fn min_key(&self) -> Option<&K> {
        self.root
            .map(|root_id| &self.nodes[self.nodes.minimum(root_id)].key)
    }

    /// Returns the largest key in the tree.
    pub fn max_key(&self) -> Option<&K> {
        self.root
            .map(|root_id| &self.nodes[self.nodes.maximum(root_id)].key)
    }

    /// Gets an iterator over the entries of the tree in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.root.map(|root_id| self.nodes.minimum(root_id)),
            remaining: self.size,
        }
    }

    /// Gets an iterator over the keys of the tree in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn node(&self, node_id: NodeId) -> &Node<K, V> {
        &self.nodes[node_id]
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodeId),
        In: FnMut(NodeId),
        Post: FnMut(NodeId),
    {
        if let Some(mut node_id) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                let node = &self.nodes[node_id];
                match dir {
                    Direction::FromParent => {
                        preorder(node_id);
                        if let Some(left_id) = node.left {
                            node_id = left_id;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_id);
                        if let Some(right_id) = node.right {
                            node_id = right_id;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        postorder(node_id);
                        match node.parent {
                            Some(parent_id) => {
                                if self.nodes[parent_id].left == Some(node_id) {
                                    dir = Direction::FromLeft;
                                } else {
                                    dir = Direction::FromRight;
                                }
                                node_id = parent_id;
                            }
                            None => break,
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    /// Creates an empty tree.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, payload) in iter {
            self.insert(key, payload);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, Option<&'a V>);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, Option<&'a V>);

    fn next(&mut self) -> Option<Self::Item> {
        let node_id = self.next?;
        let node = &self.nodes[node_id];
        self.next = match node.right {
            Some(right_id) => Some(self.nodes.minimum(right_id)),
            None => {
                // Climb until coming up from a left subtree
                let mut child_id = node_id;
                let mut parent = node.parent;
                while let Some(parent_id) = parent {
                    if self.nodes[parent_id].left == Some(child_id) {
                        break;
                    }
                    child_id = parent_id;
                    parent = self.nodes[parent_id].parent;
                }
                parent
            }
        };
        self.remaining -= 1;
        Some((&node.key, node.payload.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
