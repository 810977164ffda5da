//! An ordered map implemented with a self-balancing AVL tree.
//!
//! Every node keeps a link to its parent, and after each insert or delete the
//! tree walks from the changed position up to the root, fixing heights and
//! rotating wherever the subtree heights of a node differ by more than one.
//! Nodes live in an arena and link to each other by index.

mod arena;
mod debug;
mod tree;

pub use tree::{AvlTree, Iter, Keys};

#[cfg(test)]
mod proptests;
