//! # known-graph — Revision Ancestry Graph
//!
//! An in-memory ancestry engine for a fully-known DAG of revision
//! identifiers, where edges point from a node to its parents.
//!
//! ## Design Principles
//!
//! 1. **Build once, query forever**: the graph is leveled (GDFO) at
//!    construction and read-only afterwards
//! 2. **Arena handles, no reference cycles**: nodes live in one dense
//!    table; parent/child links are compact indices into it
//! 3. **Call-local scratch**: traversals never mutate node state, so
//!    queries take `&self` and errors cannot leave marks behind
//! 4. **Opaque keys**: identifiers only need `Eq + Hash + Clone`
//!
//! ## Quick Start
//!
//! ```rust
//! use known_graph::KnownGraph;
//!
//! # fn example() -> known_graph::Result<()> {
//! // Edges point child -> parents. "null" is the root sentinel.
//! let graph = KnownGraph::new(
//!     vec![
//!         ("root", vec![]),
//!         ("left", vec!["root"]),
//!         ("right", vec!["root"]),
//!         ("merge", vec!["left", "right"]),
//!     ],
//!     "null",
//! )?;
//!
//! assert_eq!(graph.gdfo(&"merge"), Some(3));
//!
//! // "merge" reaches both others, so it is the only head.
//! let heads = graph.heads(["merge", "left", "right"])?;
//! assert_eq!(heads, ["merge"].into_iter().collect());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Queries
//!
//! | Query | Method | Cost |
//! |-------|--------|------|
//! | Longest distance from any root | `gdfo` | precomputed |
//! | Heads of an arbitrary key set | `heads` | pruned walk, memoized |
//! | Topological order of all keys | `topo_sort` | one sort over levels |

// ============================================================================
// Modules
// ============================================================================

pub mod graph;
pub mod model;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{KnownNode, NodeIndex, NodeView};

// ============================================================================
// Re-exports: Graph engine
// ============================================================================

pub use graph::heads::HeadsStats;
pub use graph::KnownGraph;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The construction input was not a proper mapping: the same key
    /// appeared more than once with conflicting parent sequences.
    #[error("Invalid parent map: {0}")]
    InvalidInput(String),

    /// A query referenced an identifier with no node in the graph.
    /// The graph itself remains valid.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The parent map contains a cycle, so ancestry is undefined.
    /// Construction is aborted; no graph value exists.
    #[error("Cyclic parents: {0}")]
    CyclicParents(String),
}

pub type Result<T> = std::result::Result<T, Error>;
