//! # Graph Engine
//!
//! `KnownGraph` owns the node arena and answers every query. The three
//! concerns split cleanly:
//!
//! | Concern | Module | Description |
//! |---------|--------|-------------|
//! | Construction + accessors | `graph` (this file) | interning, ghost handling, child wiring |
//! | Leveling | `gdfo` | longest-path distance from the roots |
//! | Head queries | `heads` | pruned ancestor walk + memoization |

pub mod gdfo;
pub mod heads;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::model::{KnownNode, NodeIndex, NodeView};
use crate::{Error, Result};
use self::heads::StatCounters;

// ============================================================================
// KnownGraph
// ============================================================================

/// An ancestry graph over a fully-known parent map.
///
/// Built once from `(key, parent_keys)` pairs, leveled immediately
/// (every node gets its GDFO), then read-only. Queries take `&self`;
/// the only interior mutability is the head-query memoization cache.
pub struct KnownGraph<K> {
    /// Dense owning arena; `NodeIndex` handles point into it.
    arena: Vec<KnownNode<K>>,
    /// identifier → arena handle.
    index: HashMap<K, NodeIndex>,
    /// The universal-ancestor identifier ("null revision"). Caller
    /// convention, never interpreted beyond equality.
    null_key: K,
    /// query-key-set → head set. `None` when caching is disabled.
    head_cache: Option<RwLock<HashMap<Box<[NodeIndex]>, HashSet<K>>>>,
    stats: StatCounters,
}

impl<K: Clone + Eq + Hash + fmt::Debug> KnownGraph<K> {
    /// Build a graph with the head cache enabled.
    ///
    /// `parents` maps each key to its ordered parent keys. A parent that
    /// never appears as a key becomes a ghost node (parentless for
    /// leveling, a dead end for ancestor walks). `null_key` is the root
    /// sentinel identifier, see [`KnownGraph::heads`].
    pub fn new<I>(parents: I, null_key: K) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<K>)>,
    {
        Self::with_options(parents, null_key, true)
    }

    /// Build a graph, optionally without the head cache. Queries stay
    /// correct either way; disabling only forfeits memoization.
    pub fn with_options<I>(parents: I, null_key: K, enable_cache: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<K>)>,
    {
        let mut graph = Self {
            arena: Vec::new(),
            index: HashMap::new(),
            null_key,
            head_cache: enable_cache.then(|| RwLock::new(HashMap::new())),
            stats: StatCounters::default(),
        };

        for (key, parent_keys) in parents {
            graph.insert_entry(key, parent_keys)?;
        }

        gdfo::assign_levels(&mut graph.arena)?;
        tracing::debug!(nodes = graph.arena.len(), "ancestry graph leveled");
        Ok(graph)
    }

    /// Get-or-create the node for `key`. Idempotent: the same key always
    /// yields the same handle, which is what makes child back-reference
    /// wiring and handle-equality downstream sound.
    fn intern(
        arena: &mut Vec<KnownNode<K>>,
        index: &mut HashMap<K, NodeIndex>,
        key: &K,
    ) -> NodeIndex {
        if let Some(&ix) = index.get(key) {
            return ix;
        }
        let ix = NodeIndex(arena.len() as u32);
        arena.push(KnownNode::new(key.clone()));
        index.insert(key.clone(), ix);
        ix
    }

    fn insert_entry(&mut self, key: K, parent_keys: Vec<K>) -> Result<()> {
        let ix = Self::intern(&mut self.arena, &mut self.index, &key);
        let parent_ixs: SmallVec<[NodeIndex; 2]> = parent_keys
            .iter()
            .map(|p| Self::intern(&mut self.arena, &mut self.index, p))
            .collect();

        match &self.arena[ix.idx()].parents {
            // Exact duplicate pair: idempotent, children already wired.
            Some(existing) if *existing == parent_ixs => return Ok(()),
            Some(_) => {
                return Err(Error::InvalidInput(format!(
                    "key {key:?} appears twice with conflicting parents"
                )));
            }
            None => {}
        }

        for &p in &parent_ixs {
            self.arena[p.idx()].children.push(ix);
        }
        self.arena[ix.idx()].parents = Some(parent_ixs);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of nodes, ghosts included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Greatest distance from any root: roots and ghosts at 1, each edge
    /// adds 1 along the longest path. `None` for an unknown key.
    pub fn gdfo(&self, key: &K) -> Option<u64> {
        self.node(key).map(KnownNode::gdfo)
    }

    /// True when `key` only ever appeared as someone's parent.
    pub fn is_ghost(&self, key: &K) -> Option<bool> {
        self.node(key).map(KnownNode::is_ghost)
    }

    /// Parent identifiers in input order. Empty for roots and ghosts
    /// alike; [`KnownGraph::is_ghost`] tells those apart.
    pub fn parent_keys(&self, key: &K) -> Option<Vec<K>> {
        self.node(key)
            .map(|n| self.resolve_keys(n.parent_indices()))
    }

    /// Identifiers of every node that names `key` as a parent.
    pub fn child_keys(&self, key: &K) -> Option<Vec<K>> {
        self.node(key).map(|n| self.resolve_keys(n.child_indices()))
    }

    /// Diagnostic snapshot of one node: key, gdfo, parent and child
    /// identifiers. Debug/serde only, not a stable format.
    pub fn node_view(&self, key: &K) -> Option<NodeView<K>> {
        self.node(key).map(|n| NodeView {
            key: n.key().clone(),
            gdfo: n.gdfo(),
            ghost: n.is_ghost(),
            parents: self.resolve_keys(n.parent_indices()),
            children: self.resolve_keys(n.child_indices()),
        })
    }

    /// All keys, every parent strictly before any of its children.
    ///
    /// Sorting by (gdfo, insertion order) is a valid topological order
    /// because leveling guarantees `gdfo(child) > gdfo(parent)`.
    pub fn topo_sort(&self) -> Vec<K> {
        let mut order: Vec<NodeIndex> = (0..self.arena.len() as u32).map(NodeIndex).collect();
        order.sort_by_key(|ix| (self.arena[ix.idx()].gdfo(), ix.idx()));
        order
            .into_iter()
            .map(|ix| self.arena[ix.idx()].key().clone())
            .collect()
    }

    // ========================================================================
    // Internal plumbing shared with the query modules
    // ========================================================================

    fn node(&self, key: &K) -> Option<&KnownNode<K>> {
        self.index.get(key).map(|ix| &self.arena[ix.idx()])
    }

    fn resolve_keys(&self, indices: &[NodeIndex]) -> Vec<K> {
        indices
            .iter()
            .map(|ix| self.arena[ix.idx()].key().clone())
            .collect()
    }

    pub(crate) fn arena(&self) -> &[KnownNode<K>] {
        &self.arena
    }

    pub(crate) fn lookup(&self, key: &K) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub(crate) fn null_key(&self) -> &K {
        &self.null_key
    }

    pub(crate) fn cache(
        &self,
    ) -> Option<&RwLock<HashMap<Box<[NodeIndex]>, HashSet<K>>>> {
        self.head_cache.as_ref()
    }

    pub(crate) fn counters(&self) -> &StatCounters {
        &self.stats
    }
}

impl<K: fmt::Debug> fmt::Debug for KnownGraph<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnownGraph")
            .field("nodes", &self.arena.len())
            .field("null_key", &self.null_key)
            .field("cache_enabled", &self.head_cache.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
