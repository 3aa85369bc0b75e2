//! Node in the ancestry graph.

use serde::Serialize;
use smallvec::SmallVec;

/// Compact handle into the graph's node arena.
///
/// Parent/child links are stored as these indices rather than owning
/// references, so the mutual parent/child linkage never forms an
/// ownership cycle: the arena's lifetime governs every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub(crate) u32);

impl NodeIndex {
    #[inline]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node per identifier ever seen in the parent map (key or parent).
///
/// `parents` is `None` for a ghost: an identifier referenced only as
/// someone else's parent, never itself a key in the input map. A ghost
/// levels like a root and dead-ends the ancestor walk. `Some(empty)` is
/// different — an explicit root.
#[derive(Debug, Clone)]
pub struct KnownNode<K> {
    pub(crate) key: K,
    /// Ordered: callers may rely on primary-parent-first semantics.
    pub(crate) parents: Option<SmallVec<[NodeIndex; 2]>>,
    /// Unordered back-references, filled in as other nodes name this
    /// node as a parent.
    pub(crate) children: Vec<NodeIndex>,
    /// Greatest distance from any root; roots and ghosts sit at 1.
    /// 0 only before the leveling pass has run.
    pub(crate) gdfo: u64,
}

impl<K> KnownNode<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            parents: None,
            children: Vec::new(),
            gdfo: 0,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn gdfo(&self) -> u64 {
        self.gdfo
    }

    /// True when this identifier never appeared as a map key.
    pub fn is_ghost(&self) -> bool {
        self.parents.is_none()
    }

    /// Parent handles in input order; empty for roots and ghosts alike.
    #[inline]
    pub(crate) fn parent_indices(&self) -> &[NodeIndex] {
        self.parents.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub(crate) fn child_indices(&self) -> &[NodeIndex] {
        &self.children
    }
}

/// Resolved snapshot of one node for diagnostics: every handle replaced
/// by the identifier it points at. Not a stable wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView<K> {
    pub key: K,
    pub gdfo: u64,
    pub ghost: bool,
    /// Parent identifiers in input order.
    pub parents: Vec<K>,
    /// Child identifiers in discovery order.
    pub children: Vec<K>,
}
