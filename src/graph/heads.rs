//! Heads query: which members of a key set are not ancestors of other
//! members.
//!
//! The walk climbs parents depth-first and prunes on GDFO: once a
//! node's level is at or below the lowest candidate level, nothing in
//! its ancestry can still coincide with a candidate, so it is not
//! expanded. Completed answers are memoized per query key-set.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::graph::KnownGraph;
use crate::model::NodeIndex;
use crate::{Error, Result};

/// Stand-in arena slot for a root sentinel that has no node of its own.
/// Never collides with a real handle: the arena is indexed by u32 and
/// never grows to u32::MAX entries.
const SENTINEL_SLOT: NodeIndex = NodeIndex(u32::MAX);

// ============================================================================
// Query statistics
// ============================================================================

/// Counters kept across the life of one graph. `nodes_walked` is the
/// instrumentation hook for cache behavior: a memoized or short-circuited
/// query walks zero nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HeadsStats {
    /// `heads()` calls issued, including failed ones.
    pub queries: u64,
    /// Calls answered from the memoization cache.
    pub cache_hits: u64,
    /// Ancestor nodes visited across all walks.
    pub nodes_walked: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    queries: AtomicU64,
    cache_hits: AtomicU64,
    nodes_walked: AtomicU64,
}

impl StatCounters {
    pub(crate) fn snapshot(&self) -> HeadsStats {
        HeadsStats {
            queries: self.queries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            nodes_walked: self.nodes_walked.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// heads()
// ============================================================================

impl<K: Clone + Eq + Hash + fmt::Debug> KnownGraph<K> {
    /// Return the members of `keys` that are not strict ancestors of any
    /// other member.
    ///
    /// Duplicates in `keys` are harmless. Every key except the root
    /// sentinel must name a known node, otherwise `Error::NotFound` —
    /// with nothing cached and nothing else disturbed.
    ///
    /// Sentinel rules: the null revision is everyone's ancestor, so it
    /// is never a head alongside other keys; alone, it is the answer.
    pub fn heads<I>(&self, keys: I) -> Result<HashSet<K>>
    where
        I: IntoIterator<Item = K>,
    {
        self.counters().queries.fetch_add(1, Ordering::Relaxed);

        // Resolve and dedup. `pre_key` is the cache lookup key: the
        // candidate set BEFORE the sentinel is dropped.
        let mut pre_key: Vec<NodeIndex> = Vec::new();
        let mut candidates: Vec<NodeIndex> = Vec::new();
        let mut sentinel_present = false;
        for key in keys {
            if key == *self.null_key() {
                sentinel_present = true;
                pre_key.push(self.lookup(&key).unwrap_or(SENTINEL_SLOT));
                continue;
            }
            let ix = self
                .lookup(&key)
                .ok_or_else(|| Error::NotFound(format!("{key:?}")))?;
            pre_key.push(ix);
            candidates.push(ix);
        }
        pre_key.sort_unstable();
        pre_key.dedup();
        candidates.sort_unstable();
        candidates.dedup();

        if sentinel_present && candidates.is_empty() {
            return Ok(std::iter::once(self.null_key().clone()).collect());
        }
        if candidates.len() < 2 {
            // Singleton or empty: trivially its own head set.
            return Ok(self.resolve_set(&candidates));
        }

        if let Some(cache) = self.cache() {
            if let Some(hit) = cache.read().get(pre_key.as_slice()) {
                self.counters().cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.clone());
            }
        }

        let result = self.walk_heads(&candidates);

        if let Some(cache) = self.cache() {
            // Stored under the sentinel-ADJUSTED set. When the query
            // included the sentinel this differs from the lookup key, so
            // re-asking with the sentinel recomputes while the adjusted
            // query hits. Long-standing behavior callers may probe.
            cache
                .write()
                .insert(candidates.into_boxed_slice(), result.clone());
        }

        Ok(result)
    }

    /// Lifetime query counters for this graph.
    pub fn stats(&self) -> HeadsStats {
        self.counters().snapshot()
    }

    /// The pruned ancestor walk. `candidates` are distinct, valid
    /// handles. Marks live in a walk-local table, so nothing needs
    /// resetting and concurrent walks cannot see each other.
    fn walk_heads(&self, candidates: &[NodeIndex]) -> HashSet<K> {
        let arena = self.arena();

        let mut min_gdfo = u64::MAX;
        let mut todo: Vec<NodeIndex> = Vec::new();
        for &ix in candidates {
            let node = &arena[ix.idx()];
            min_gdfo = min_gdfo.min(node.gdfo());
            todo.extend_from_slice(node.parent_indices());
        }

        let mut seen = vec![false; arena.len()];
        let mut walked = 0u64;
        while let Some(ix) = todo.pop() {
            if seen[ix.idx()] {
                continue;
            }
            seen[ix.idx()] = true;
            walked += 1;
            let node = &arena[ix.idx()];
            // Every candidate sits at or above min_gdfo, and ancestry
            // only descends from here, so this subtree cannot reach one.
            if node.gdfo() <= min_gdfo {
                continue;
            }
            todo.extend_from_slice(node.parent_indices());
        }
        self.counters()
            .nodes_walked
            .fetch_add(walked, Ordering::Relaxed);

        let heads: HashSet<K> = candidates
            .iter()
            .filter(|ix| !seen[ix.idx()])
            .map(|ix| arena[ix.idx()].key().clone())
            .collect();
        tracing::trace!(
            candidates = candidates.len(),
            walked,
            heads = heads.len(),
            "heads walk"
        );
        heads
    }

    fn resolve_set(&self, indices: &[NodeIndex]) -> HashSet<K> {
        indices
            .iter()
            .map(|ix| self.arena()[ix.idx()].key().clone())
            .collect()
    }
}
