//! Dependency graph over a stack's resources
//!
//! Heat lists, for every resource, the names of the resources that
//! require it. The graph inverts that relation into "name → names that
//! must be emitted before it", keeping the listing's insertion order so
//! that the schedule is deterministic for a given listing.

use crate::openstack::StackResource;
use std::collections::{BTreeSet, HashMap};

/// Insertion-ordered mapping from resource name to its dependency names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: Vec<(String, BTreeSet<String>)>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph from a resource listing.
    ///
    /// Every resource gets an entry; for every name `D` in a resource `R`'s
    /// `required_by`, `R` is recorded as a dependency of `D`.
    pub fn from_resources<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = &'a StackResource>,
    {
        let mut graph = Self::default();

        for resource in resources {
            graph.entry(&resource.name);
            for dependent in &resource.required_by {
                graph.add_dependency(dependent, &resource.name);
            }
        }

        graph
    }

    /// Ensure `name` has an entry, returning its dependency set.
    pub fn entry(&mut self, name: &str) -> &mut BTreeSet<String> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.nodes.push((name.to_string(), BTreeSet::new()));
                self.index.insert(name.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx].1
    }

    /// Record that `dependency` must be emitted before `name`.
    pub fn add_dependency(&mut self, name: &str, dependency: &str) {
        self.entry(name).insert(dependency.to_string());
    }

    /// Dependencies of `name`, if it is a node
    pub fn dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.index.get(name).map(|&idx| &self.nodes[idx].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.nodes.iter().map(|(name, deps)| (name.as_str(), deps))
    }

    pub(crate) fn into_nodes(self) -> Vec<(String, BTreeSet<String>)> {
        self.nodes
    }
}
