//! Namespace graph: namespaces and their dependency edges.
//!
//! Build order is a topological order of the dependency graph. Among
//! namespaces that are ready at the same time, the one declared first goes
//! first, so the core namespace (declared first, no dependencies) leads.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::Entity;
use crate::fault::{CompileFault, ModelRule};

/// A named scope of entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub is_extension: bool,
    #[serde(default)]
    pub project_extension: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Namespace {
    pub fn core(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_extension: false,
            project_extension: String::new(),
            dependencies: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn extension(name: &str, project_extension: &str, dependencies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            is_extension: true,
            project_extension: project_extension.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }
}

/// Build order and transitive reachability for a set of namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceGraph {
    order: Vec<String>,
    reachable: BTreeMap<String, BTreeSet<String>>,
}

impl NamespaceGraph {
    pub fn new(namespaces: &[Namespace]) -> Result<Self, CompileFault> {
        let order = build_order_indices(namespaces)?;
        let order: Vec<String> = order.into_iter().map(|i| namespaces[i].name.clone()).collect();

        let by_name: BTreeMap<&str, &Namespace> =
            namespaces.iter().map(|n| (n.name.as_str(), n)).collect();

        // Build order guarantees dependencies are complete before dependents.
        let mut reachable: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for name in &order {
            let mut closure = BTreeSet::new();
            if let Some(namespace) = by_name.get(name.as_str()) {
                for dependency in &namespace.dependencies {
                    closure.insert(dependency.clone());
                    if let Some(transitive) = reachable.get(dependency) {
                        closure.extend(transitive.iter().cloned());
                    }
                }
            }
            reachable.insert(name.clone(), closure);
        }

        debug!(order = ?order, "resolved namespace build order");
        Ok(Self { order, reachable })
    }

    /// Namespace names, dependencies first.
    pub fn build_order(&self) -> &[String] {
        &self.order
    }

    /// Whether code in `from` may reference entities declared in `target`.
    pub fn is_visible(&self, from: &str, target: &str) -> bool {
        from == target
            || self
                .reachable
                .get(from)
                .is_some_and(|deps| deps.contains(target))
    }

    /// Namespaces searched for an unqualified reference from `from`: the
    /// namespace itself, then its dependencies in build order.
    pub fn search_order<'s>(&'s self, from: &'s str) -> Vec<&'s str> {
        let mut names = vec![from];
        if let Some(deps) = self.reachable.get(from) {
            names.extend(
                self.order
                    .iter()
                    .filter(|n| deps.contains(n.as_str()))
                    .map(|n| n.as_str()),
            );
        }
        names
    }
}

/// Order namespaces so that every namespace follows all of its dependencies.
pub fn resolve_build_order(namespaces: &[Namespace]) -> Result<Vec<&Namespace>, CompileFault> {
    Ok(build_order_indices(namespaces)?
        .into_iter()
        .map(|i| &namespaces[i])
        .collect())
}

fn build_order_indices(namespaces: &[Namespace]) -> Result<Vec<usize>, CompileFault> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();

    for (i, namespace) in namespaces.iter().enumerate() {
        if nodes.insert(namespace.name.as_str(), graph.add_node(i)).is_some() {
            return Err(CompileFault::invalid(
                namespace.name.clone(),
                ModelRule::DuplicateNamespace {
                    name: namespace.name.clone(),
                },
            ));
        }
    }

    // Edges point from a dependency to its dependent.
    for namespace in namespaces {
        if !namespace.is_extension && !namespace.dependencies.is_empty() {
            return Err(CompileFault::invalid(
                namespace.name.clone(),
                ModelRule::CoreDependency {
                    name: namespace.name.clone(),
                },
            ));
        }
        let dependent = nodes[namespace.name.as_str()];
        for dependency in &namespace.dependencies {
            let Some(&source) = nodes.get(dependency.as_str()) else {
                return Err(CompileFault::invalid(
                    namespace.name.clone(),
                    ModelRule::UnknownNamespace {
                        name: dependency.clone(),
                    },
                ));
            };
            graph.update_edge(source, dependent, ());
        }
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| Reverse(graph[n]))
        .collect();

    let mut order = Vec::with_capacity(namespaces.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        let node = NodeIndex::new(i);
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                ready.push(Reverse(graph[next]));
            }
        }
    }

    if order.len() < namespaces.len() {
        return Err(CompileFault::CyclicDependency {
            cycle: describe_cycle(&graph, namespaces),
        });
    }

    Ok(order)
}

// Names of one strongly connected component that forms a cycle, closed back
// on its first member.
fn describe_cycle(graph: &DiGraph<usize, ()>, namespaces: &[Namespace]) -> Vec<String> {
    let component = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|n| graph.contains_edge(*n, *n)))
        .min_by_key(|scc| scc.iter().map(|n| graph[*n]).min().unwrap_or(usize::MAX));

    let mut members: Vec<usize> = component
        .unwrap_or_default()
        .into_iter()
        .map(|n| graph[n])
        .collect();
    members.sort_unstable();

    let mut cycle: Vec<String> = members.iter().map(|i| namespaces[*i].name.clone()).collect();
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}
