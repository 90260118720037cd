//! Symbol nodes: the composable generators a pattern is made of.
//!
//! Nodes live in a [`SymbolTree`] arena and refer to each other through [`NodeId`]s.
//! Every node answers the same protocol:
//!
//! - [`SymbolTree::next`] produces at most one shape for the bounds it is given,
//! - [`SymbolTree::has_finished`] tells whether the current pass is exhausted,
//! - [`SymbolTree::reset`] starts a new pass,
//! - [`SymbolTree::to_json`] serializes the node and its subtree.
//!
//! Kinds are a closed set ([`SymbolKind`]) resolved from string tags by the
//! [`registry`].
pub mod inspector;
pub mod registry;
pub mod selector;
pub mod terminal;
pub mod tree;

use std::fmt;

pub use inspector::{FieldKind, Property};
pub use registry::{is_known_tag, symbol_tags};
pub use selector::{Selector, SelectorEntry};
pub use terminal::{Terminal, TerminalShape};
pub use tree::SymbolTree;

use crate::effects::Effect;
use crate::placer::{NoiseGrid, Placer, Subdivision};

/// Handle of a node inside a [`SymbolTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind-specific configuration and progress of a node.
#[derive(Clone, Debug)]
pub enum SymbolKind {
    Terminal(Terminal),
    Placer(Placer),
    /// Flat Y placer whose child is an internal X placer wrapping a depth placer.
    Grid(Placer),
    NoiseGrid(NoiseGrid),
    Subdivision(Subdivision),
    Selector(Selector),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) tag: &'static str,
    pub(crate) parent: Option<NodeId>,
    pub(crate) effects: Vec<Effect>,
    pub(crate) kind: SymbolKind,
}
