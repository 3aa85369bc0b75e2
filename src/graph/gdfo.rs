//! Leveling pass: greatest distance from origin.
//!
//! Runs once, at the tail of construction. Roots (empty or absent
//! parents) sit at gdfo 1; every edge adds 1 along the longest path.
//! The pass doubles as cycle detection: a node whose parents can never
//! all be leveled is on a cycle.

use std::fmt;

use crate::model::{KnownNode, NodeIndex};
use crate::{Error, Result};

/// Assign every node its GDFO with a single work-list pass.
///
/// A node is pushed only once all of its parents have contributed, so a
/// popped node's gdfo is final. The outstanding-parent counters live in
/// a pass-local table rather than on the nodes, so a failed pass leaves
/// no scratch state behind.
pub(crate) fn assign_levels<K: fmt::Debug>(arena: &mut [KnownNode<K>]) -> Result<()> {
    // One counter per node: parents not yet leveled. Duplicate parent
    // entries stay consistent because child wiring mirrors them 1:1.
    let mut pending: Vec<u32> = arena
        .iter()
        .map(|n| n.parent_indices().len() as u32)
        .collect();

    let mut todo: Vec<NodeIndex> = Vec::new();
    for (i, node) in arena.iter_mut().enumerate() {
        if node.parent_indices().is_empty() {
            node.gdfo = 1;
            todo.push(NodeIndex(i as u32));
        }
    }

    let mut leveled = todo.len();
    while let Some(ix) = todo.pop() {
        let gdfo = arena[ix.idx()].gdfo;
        for c_pos in 0..arena[ix.idx()].children.len() {
            let child = arena[ix.idx()].children[c_pos];
            let entry = &mut arena[child.idx()];
            // Longest-path relaxation: a child may be raised several
            // times before its last parent lands.
            if gdfo + 1 > entry.gdfo {
                entry.gdfo = gdfo + 1;
            }
            pending[child.idx()] -= 1;
            if pending[child.idx()] == 0 {
                todo.push(child);
                leveled += 1;
            }
        }
    }

    if leveled < arena.len() {
        // Something never satisfied its parent count: a cycle. Name one
        // offender instead of leaving stale levels behind.
        let stuck = arena
            .iter()
            .enumerate()
            .find(|(i, _)| pending[*i] > 0)
            .map(|(_, n)| format!("{:?}", n.key()))
            .unwrap_or_else(|| "<unknown>".to_string());
        return Err(Error::CyclicParents(format!(
            "{stuck} is its own transitive ancestor"
        )));
    }

    Ok(())
}
