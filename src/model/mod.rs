//! # Ancestry Graph Model
//!
//! The data types the engine operates on: the arena node entity and its
//! diagnostic view.
//!
//! Design rule: this module is pure data — no traversal logic, no locks,
//! no I/O. Everything that walks the graph lives in `crate::graph`.

pub mod node;

pub use node::{KnownNode, NodeIndex, NodeView};
