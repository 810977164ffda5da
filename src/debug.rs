use std::fmt;

use crate::arena::NodeId;
use crate::AvlTree;

struct DebugNode<'a, K, V> {
    tree: &'a AvlTree<K, V>,
    node_id: NodeId,
}

struct DisplayNode<'a, K, V> {
    tree: &'a AvlTree<K, V>,
    node_id: NodeId,
}

/// Prints the structure of the tree: key, payload, height and parent key of
/// every node, followed by its children in brackets.
///
/// ```
/// use avltree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(1, "one");
/// tree.insert(2, "two");
/// assert_eq!(
///     format!("{tree:?}"),
///     r#"key: 1, payload: Some("one"), height: 2, right = [key: 2, payload: Some("two"), height: 1, parent: 1]"#
/// );
/// ```
impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            None => f.write_str("[]"),
            Some(node_id) => fmt::Debug::fmt(&DebugNode { tree: self, node_id }, f),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DebugNode<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.tree.node(self.node_id);
        write!(
            f,
            "key: {:?}, payload: {:?}, height: {}",
            node.key, node.payload, node.height
        )?;
        if let Some(parent_id) = node.parent {
            write!(f, ", parent: {:?}", self.tree.node(parent_id).key)?;
        }
        if let Some(node_id) = node.left {
            let left = DebugNode { tree: self.tree, node_id };
            write!(f, ", left = [{left:?}]")?;
        }
        if let Some(node_id) = node.right {
            let right = DebugNode { tree: self.tree, node_id };
            write!(f, ", right = [{right:?}]")?;
        }
        Ok(())
    }
}

/// Prints the keys in order, with each subtree in parentheses:
/// `(left) <- key -> (right)`.
impl<K: fmt::Display, V> fmt::Display for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            None => f.write_str("[]"),
            Some(node_id) => fmt::Display::fmt(&DisplayNode { tree: self, node_id }, f),
        }
    }
}

impl<K: fmt::Display, V> fmt::Display for DisplayNode<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.tree.node(self.node_id);
        if let Some(node_id) = node.left {
            write!(f, "({}) <- ", DisplayNode { tree: self.tree, node_id })?;
        }
        write!(f, "{}", node.key)?;
        if let Some(node_id) = node.right {
            write!(f, " -> ({})", DisplayNode { tree: self.tree, node_id })?;
        }
        Ok(())
    }
}
