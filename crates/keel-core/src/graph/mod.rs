//! # Keel Dependency Graph
//!
//! A small directed-graph utility shared by the manager registry and the DI
//! container: nodes name their dependencies, the graph keeps the reverse
//! `dependents` edges in sync, produces a dependency-first topological order
//! and reports structural problems.
//!
//! Ordering is a depth-first walk with three-color marking. A node for which
//! the caller's skip predicate holds (a lazily initialized manager, for
//! example) is never used as a starting point and never emitted, but it is
//! still walked through when an eager node depends on it, so a cycle running
//! through it is reported.
pub mod error;

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

pub use error::GraphError;

/// A named vertex with its outgoing (`dependencies`) and incoming (`dependents`) edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    pub dependencies: Vec<String>,
    /// Back-references, maintained by the graph.
    pub dependents: Vec<String>,
}

/// Outcome of [`DependencyGraph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Directed dependency graph preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or replaces the dependency list of an existing one.
    pub fn add_node(&mut self, name: &str, dependencies: &[&str]) {
        let dependencies: Vec<String> = dependencies.iter().map(|d| d.to_string()).collect();

        if let Some(&idx) = self.index.get(name) {
            let previous = std::mem::take(&mut self.nodes[idx].dependencies);
            for dep in &previous {
                if let Some(&dep_idx) = self.index.get(dep) {
                    self.nodes[dep_idx].dependents.retain(|d| d != name);
                }
            }
            self.nodes[idx].dependencies = dependencies.clone();
        } else {
            // Nodes registered earlier may already point at this one.
            let dependents = self
                .nodes
                .iter()
                .filter(|n| n.dependencies.iter().any(|d| d == name))
                .map(|n| n.name.clone())
                .collect();
            self.index.insert(name.to_string(), self.nodes.len());
            self.nodes.push(Node {
                name: name.to_string(),
                dependencies: dependencies.clone(),
                dependents,
            });
        }

        for dep in &dependencies {
            if let Some(&dep_idx) = self.index.get(dep) {
                let dependents = &mut self.nodes[dep_idx].dependents;
                if !dependents.iter().any(|d| d == name) {
                    dependents.push(name.to_string());
                }
            }
        }
    }

    /// Removes a node and every back-reference to it. Dependencies other nodes
    /// declare on it are kept and become missing.
    pub fn remove_node(&mut self, name: &str) -> Option<Node> {
        let idx = self.index.remove(name)?;
        let node = self.nodes.remove(idx);
        for other in &mut self.nodes {
            other.dependents.retain(|d| d != name);
        }
        self.reindex();
        Some(node)
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.node(name).map(|n| n.dependencies.clone()).unwrap_or_default()
    }

    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        self.node(name).map(|n| n.dependents.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Dependency-first order of every node for which `skip` does not hold.
    ///
    /// Fails on the first cycle or unregistered dependency encountered.
    pub fn topological_order<F>(&self, skip: F) -> Result<Vec<String>, GraphError>
    where
        F: Fn(&Node) -> bool,
    {
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            if skip(node) {
                continue;
            }
            self.visit(node, &skip, true, &mut marks, &mut stack, &mut order)?;
        }
        Ok(order)
    }

    /// Structural check: unregistered dependencies and cycles are errors,
    /// isolated nodes are warnings.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for node in &self.nodes {
            for dep in &node.dependencies {
                if !self.contains(dep) {
                    report.errors.push(
                        GraphError::MissingDependency {
                            node: node.name.clone(),
                            dependency: dep.clone(),
                        }
                        .to_string(),
                    );
                }
            }
            if node.dependencies.is_empty() && node.dependents.is_empty() {
                report.warnings.push(format!(
                    "Node '{}' has no dependencies and no dependents",
                    node.name
                ));
            }
        }

        if let Some(cycle) = self.find_cycle() {
            report.errors.push(cycle.to_string());
        }

        report.valid = report.errors.is_empty();
        report
    }

    /// First cycle found walking every node, ignoring unregistered dependencies.
    pub fn find_cycle(&self) -> Option<GraphError> {
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut sink = Vec::new();
        let no_skip = |_: &Node| false;

        for node in &self.nodes {
            if let Err(err) = self.visit(node, &no_skip, false, &mut marks, &mut stack, &mut sink) {
                return Some(err);
            }
        }
        None
    }

    fn visit<'g, F>(
        &'g self,
        node: &'g Node,
        skip: &F,
        strict: bool,
        marks: &mut HashMap<&'g str, Mark>,
        stack: &mut Vec<&'g str>,
        order: &mut Vec<String>,
    ) -> Result<(), GraphError>
    where
        F: Fn(&Node) -> bool,
    {
        match marks.get(node.name.as_str()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = stack.iter().position(|n| *n == node.name).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                path.push(node.name.clone());
                return Err(GraphError::CircularDependency {
                    node: node.name.clone(),
                    path,
                });
            }
            None => {}
        }

        marks.insert(&node.name, Mark::InProgress);
        stack.push(&node.name);

        for dep in &node.dependencies {
            match self.node(dep) {
                Some(target) => self.visit(target, skip, strict, marks, stack, order)?,
                None if strict => {
                    return Err(GraphError::MissingDependency {
                        node: node.name.clone(),
                        dependency: dep.clone(),
                    });
                }
                None => {}
            }
        }

        stack.pop();
        marks.insert(&node.name, Mark::Done);
        if !skip(node) {
            order.push(node.name.clone());
        }
        Ok(())
    }

    /// Graphviz description of the graph. `attributes` may return extra node
    /// attributes (e.g. `style=dashed`).
    pub fn to_dot<F>(&self, graph_name: &str, attributes: F) -> String
    where
        F: Fn(&Node) -> Option<String>,
    {
        let mut out = String::new();
        let _ = writeln!(out, "digraph \"{}\" {{", graph_name);
        for node in &self.nodes {
            match attributes(node) {
                Some(attrs) => {
                    let _ = writeln!(out, "    \"{}\" [{}];", node.name, attrs);
                }
                None => {
                    let _ = writeln!(out, "    \"{}\";", node.name);
                }
            }
        }
        for node in &self.nodes {
            for dep in &node.dependencies {
                let _ = writeln!(out, "    \"{}\" -> \"{}\";", node.name, dep);
            }
        }
        out.push_str("}\n");
        out
    }
}
