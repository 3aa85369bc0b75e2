//! End-to-end tests for head queries: semantics, sentinel handling,
//! and observable cache behavior.

use known_graph::{Error, KnownGraph};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn set(keys: &[&'static str]) -> HashSet<&'static str> {
    keys.iter().copied().collect()
}

/// null <- d <- b,c <- a  (a merges b and c)
fn diamond() -> KnownGraph<&'static str> {
    KnownGraph::new(
        vec![
            ("null", vec![]),
            ("d", vec!["null"]),
            ("b", vec!["d"]),
            ("c", vec!["d"]),
            ("a", vec!["b", "c"]),
        ],
        "null",
    )
    .unwrap()
}

// ============================================================================
// 1. Linear chain: the tip is the only head
// ============================================================================

#[test]
fn test_linear_chain() {
    let g = KnownGraph::new(
        vec![("c", vec![]), ("b", vec!["c"]), ("a", vec!["b"])],
        "null",
    )
    .unwrap();

    assert_eq!(g.heads(["a", "b", "c"]).unwrap(), set(&["a"]));
    assert_eq!(g.heads(["b", "c"]).unwrap(), set(&["b"]));
    assert_eq!(g.heads(["a", "c"]).unwrap(), set(&["a"]));
}

// ============================================================================
// 2. Diamond: merge dominates, siblings coexist
// ============================================================================

#[test]
fn test_diamond() {
    let g = diamond();
    assert_eq!(g.heads(["a", "b", "c", "d"]).unwrap(), set(&["a"]));
    assert_eq!(g.heads(["b", "c"]).unwrap(), set(&["b", "c"]));
    assert_eq!(g.heads(["b", "d"]).unwrap(), set(&["b"]));
}

// ============================================================================
// 3. Idempotence across ordering and duplicates
// ============================================================================

#[test]
fn test_idempotent_over_input_order() {
    let g = diamond();
    let expected = g.heads(["a", "b", "c"]).unwrap();
    assert_eq!(g.heads(["c", "b", "a"]).unwrap(), expected);
    assert_eq!(g.heads(["b", "a", "c", "a", "b"]).unwrap(), expected);
}

// ============================================================================
// 4. Root sentinel rules
// ============================================================================

#[test]
fn test_sentinel_alone_is_the_answer() {
    let g = diamond();
    assert_eq!(g.heads(["null"]).unwrap(), set(&["null"]));
    assert_eq!(g.heads(["null", "null"]).unwrap(), set(&["null"]));
}

#[test]
fn test_sentinel_never_heads_alongside_others() {
    let g = diamond();
    assert_eq!(g.heads(["null", "a"]).unwrap(), set(&["a"]));
    assert_eq!(g.heads(["null", "b", "c"]).unwrap(), set(&["b", "c"]));
}

// ============================================================================
// 5. Result is always a subset of the adjusted query set
// ============================================================================

#[test]
fn test_result_subset_of_keys() {
    let g = diamond();
    let query = ["null", "a", "c", "d"];
    let heads = g.heads(query).unwrap();
    for head in &heads {
        assert!(query.contains(head));
        assert_ne!(*head, "null");
    }
}

// ============================================================================
// 6. Cache: hits observable through stats, misses recompute
// ============================================================================

#[test]
fn test_cache_hit_observable() {
    let g = diamond();

    let first = g.heads(["a", "c"]).unwrap();
    let after_first = g.stats();
    assert_eq!(after_first.cache_hits, 0);
    assert!(after_first.nodes_walked > 0);

    // Same set, different order: a hit, no new walking.
    let second = g.heads(["c", "a"]).unwrap();
    let after_second = g.stats();
    assert_eq!(first, second);
    assert_eq!(after_second.cache_hits, 1);
    assert_eq!(after_second.nodes_walked, after_first.nodes_walked);

    // A different set misses and walks again.
    g.heads(["b", "c"]).unwrap();
    let after_third = g.stats();
    assert_eq!(after_third.cache_hits, 1);
    assert!(after_third.nodes_walked > after_second.nodes_walked);
}

#[test]
fn test_cache_disabled_recomputes_every_time() {
    let g = KnownGraph::with_options(
        vec![
            ("null", vec![]),
            ("d", vec!["null"]),
            ("b", vec!["d"]),
            ("c", vec!["d"]),
            ("a", vec!["b", "c"]),
        ],
        "null",
        false,
    )
    .unwrap();

    let first = g.heads(["a", "c"]).unwrap();
    let walked = g.stats().nodes_walked;
    let second = g.heads(["a", "c"]).unwrap();
    let stats = g.stats();

    assert_eq!(first, second);
    assert_eq!(stats.cache_hits, 0);
    assert!(stats.nodes_walked > walked);
}

// ============================================================================
// 7. The sentinel-key cache asymmetry (long-standing behavior)
// ============================================================================

#[test]
fn test_sentinel_cache_asymmetry() {
    let g = diamond();

    // A completed sentinel query stores under the adjusted set {b, c}.
    g.heads(["null", "b", "c"]).unwrap();
    let walked = g.stats().nodes_walked;

    // The adjusted set hits that entry.
    g.heads(["b", "c"]).unwrap();
    assert_eq!(g.stats().cache_hits, 1);
    assert_eq!(g.stats().nodes_walked, walked);

    // The sentinel form always recomputes: its lookup key still
    // contains the sentinel, which no store key ever does.
    g.heads(["null", "b", "c"]).unwrap();
    assert_eq!(g.stats().cache_hits, 1);
    assert!(g.stats().nodes_walked > walked);
}

// ============================================================================
// 8. Errors leave the cache untouched
// ============================================================================

#[test]
fn test_not_found_preserves_cached_results() {
    let g = diamond();

    let cached = g.heads(["a", "b"]).unwrap();
    let walked = g.stats().nodes_walked;

    let err = g.heads(["a", "nope"]).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // The earlier entry still hits; the failed query walked nothing.
    assert_eq!(g.heads(["a", "b"]).unwrap(), cached);
    let stats = g.stats();
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.nodes_walked, walked);
}

// ============================================================================
// 9. Concurrent queries need no external lock
// ============================================================================

#[test]
fn test_parallel_heads_queries() {
    let g = diamond();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    assert_eq!(g.heads(["a", "b", "c", "d"]).unwrap(), set(&["a"]));
                    assert_eq!(g.heads(["b", "c"]).unwrap(), set(&["b", "c"]));
                }
            });
        }
    });

    assert_eq!(g.stats().queries, 400);
}
