//! Topological scheduling of resource deletions
//!
//! Repeated-pass variant of Kahn's algorithm: each pass walks the
//! remaining nodes in insertion order and emits every node whose
//! dependencies have all been emitted. A pass that emits nothing while
//! nodes remain means a cycle (or a dependency that is never provided).
//! Worst case is O(V²), which is fine for stacks of a few hundred resources.

use super::graph::DependencyGraph;
use std::collections::{BTreeSet, HashSet, VecDeque};
use thiserror::Error;

/// The dependency graph cannot be fully ordered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to order stack resources for deletion, unresolved: {}", .unresolved.join(", "))]
pub struct TopologicalSortFailure {
    /// Nodes left when the scan stalled, in insertion order
    pub unresolved: Vec<String>,
}

/// Lazy topological order over a [`DependencyGraph`].
///
/// Yields `Ok(name)` for every node once all of its dependencies have been
/// yielded, then either stops or yields a single `Err` on a stall.
#[derive(Debug)]
pub struct TopologicalOrder {
    /// Nodes not yet examined in the current pass
    pending: VecDeque<(String, BTreeSet<String>)>,
    /// Nodes examined in the current pass but not yet resolvable
    deferred: Vec<(String, BTreeSet<String>)>,
    provided: HashSet<String>,
    emitted_in_pass: bool,
    done: bool,
}

impl TopologicalOrder {
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            pending: graph.into_nodes().into(),
            deferred: Vec::new(),
            provided: HashSet::new(),
            emitted_in_pass: false,
            done: false,
        }
    }
}

impl Iterator for TopologicalOrder {
    type Item = Result<String, TopologicalSortFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            while let Some((name, deps)) = self.pending.pop_front() {
                if deps.iter().all(|d| self.provided.contains(d)) {
                    self.provided.insert(name.clone());
                    self.emitted_in_pass = true;
                    return Some(Ok(name));
                }
                self.deferred.push((name, deps));
            }

            // End of a pass
            if self.deferred.is_empty() {
                self.done = true;
                return None;
            }

            if !self.emitted_in_pass {
                self.done = true;
                let unresolved = self.deferred.drain(..).map(|(name, _)| name).collect();
                return Some(Err(TopologicalSortFailure { unresolved }));
            }

            self.pending.extend(self.deferred.drain(..));
            self.emitted_in_pass = false;
        }
    }
}

/// Collect the full order, failing on a cycle or missing node.
pub fn topological_sort(graph: DependencyGraph) -> Result<Vec<String>, TopologicalSortFailure> {
    TopologicalOrder::new(graph).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for (name, deps) in edges {
            graph.entry(name);
            for dep in *deps {
                graph.add_dependency(name, dep);
            }
        }
        graph
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(topological_sort(DependencyGraph::default()), Ok(vec![]));
    }

    #[test]
    fn test_chain_is_emitted_dependencies_first() {
        let g = graph(&[("server", &["port"]), ("port", &["net"]), ("net", &[])]);
        assert_eq!(
            topological_sort(g).unwrap(),
            vec!["net".to_string(), "port".to_string(), "server".to_string()]
        );
    }

    #[test]
    fn test_independent_nodes_keep_insertion_order() {
        let g = graph(&[("c", &[]), ("a", &[]), ("b", &[])]);
        assert_eq!(topological_sort(g).unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_provided_updates_within_a_pass() {
        // "b" can be emitted in the same pass as "a" because "a" comes first
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["d"]), ("d", &[])]);
        assert_eq!(topological_sort(g).unwrap(), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_cycle_fails() {
        let g = graph(&[("a", &["b"]), ("b", &["a"]), ("free", &[])]);
        let mut order = TopologicalOrder::new(g);

        assert_eq!(order.next(), Some(Ok("free".to_string())));
        assert_eq!(
            order.next(),
            Some(Err(TopologicalSortFailure {
                unresolved: vec!["a".to_string(), "b".to_string()]
            }))
        );
        assert_eq!(order.next(), None);
    }

    #[test]
    fn test_self_reference_fails() {
        let g = graph(&[("a", &["a"])]);
        let err = topological_sort(g).unwrap_err();
        assert_eq!(err.unresolved, vec!["a"]);
        assert_eq!(
            err.to_string(),
            "Unable to order stack resources for deletion, unresolved: a"
        );
    }

    #[test]
    fn test_missing_dependency_fails() {
        let mut g = DependencyGraph::default();
        g.add_dependency("server", "never-listed");
        assert!(topological_sort(g).is_err());
    }

    /// Random DAG: node i may only depend on nodes with a smaller index,
    /// then nodes are inserted in a shuffled order.
    fn arb_dag() -> impl Strategy<Value = DependencyGraph> {
        (1usize..30)
            .prop_flat_map(|n| {
                let deps = proptest::collection::vec(any::<prop::sample::Index>(), 0..4);
                let edges = proptest::collection::vec(deps, n);
                (edges, Just((0..n).collect::<Vec<_>>()).prop_shuffle())
            })
            .prop_map(|(edges, order)| {
                let mut g = DependencyGraph::default();
                for &i in &order {
                    g.entry(&format!("r{i}"));
                    for idx in &edges[i] {
                        if i > 0 {
                            let dep = idx.index(i);
                            g.add_dependency(&format!("r{i}"), &format!("r{dep}"));
                        }
                    }
                }
                g
            })
    }

    proptest! {
        #[test]
        fn prop_acyclic_graph_is_fully_ordered(g in arb_dag()) {
            let expected: HashMap<String, BTreeSet<String>> = g
                .iter()
                .map(|(name, deps)| (name.to_string(), deps.clone()))
                .collect();

            let order = topological_sort(g).unwrap();
            prop_assert_eq!(order.len(), expected.len());

            let mut seen = HashSet::new();
            for name in &order {
                for dep in &expected[name] {
                    prop_assert!(seen.contains(dep), "{} emitted before its dependency {}", name, dep);
                }
                prop_assert!(seen.insert(name.clone()), "{} emitted twice", name);
            }
        }

        #[test]
        fn prop_cycle_is_detected(g in arb_dag(), pick in any::<prop::sample::Index>()) {
            // Reverse an existing edge, or add a self-loop if there is none
            let edge = g
                .iter()
                .find_map(|(name, deps)| deps.iter().next().map(|d| (name.to_string(), d.clone())));
            let mut cyclic = g.clone();
            match edge {
                Some((name, dep)) => cyclic.add_dependency(&dep, &name),
                None => {
                    let names: Vec<String> = g.iter().map(|(n, _)| n.to_string()).collect();
                    let node = &names[pick.index(names.len())];
                    cyclic.add_dependency(node, node);
                }
            }

            let mut emitted = HashSet::new();
            let mut failed = false;
            for item in TopologicalOrder::new(cyclic) {
                match item {
                    Ok(name) => prop_assert!(emitted.insert(name)),
                    Err(e) => {
                        failed = true;
                        prop_assert!(!e.unresolved.is_empty());
                        for name in &e.unresolved {
                            prop_assert!(!emitted.contains(name));
                        }
                    }
                }
            }
            prop_assert!(failed);
        }
    }
}
