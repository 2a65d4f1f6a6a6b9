use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::graph::{DependencyGraph, GraphError, ValidationReport};
use crate::kernel::error::Error;
use crate::manager::error::ManagerError;
use crate::manager::traits::Manager;

/// Bookkeeping for one registered manager.
#[derive(Debug, Clone)]
pub struct ManagerStatus {
    pub name: String,
    pub dependencies: Vec<String>,
    /// Filled from the dependency graph when the status is read.
    pub dependents: Vec<String>,
    pub initialized: bool,
    pub lazy: bool,
    pub init_time: Option<DateTime<Utc>>,
    /// Last initialization failure, kept for inspection.
    pub error: Option<Arc<Error>>,
}

/// Result of [`ManagerRegistry::check_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyCheck {
    pub satisfied: bool,
    pub missing: Vec<String>,
}

/// Tracks manager registration, declared dependencies and initialization status.
#[derive(Debug, Default)]
pub struct ManagerRegistry {
    graph: DependencyGraph,
    statuses: HashMap<String, ManagerStatus>,
    init_order: Vec<String>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a manager. A name that is already registered is logged and
    /// ignored; registration order is not stable across restarts.
    pub fn register(&mut self, name: &str, dependencies: &[&str], lazy: bool) {
        if self.statuses.contains_key(name) {
            log::warn!("Manager '{}' is already registered, ignoring duplicate registration", name);
            return;
        }

        self.graph.add_node(name, dependencies);
        self.statuses.insert(
            name.to_string(),
            ManagerStatus {
                name: name.to_string(),
                dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
                dependents: Vec::new(),
                initialized: false,
                lazy,
                init_time: None,
                error: None,
            },
        );
        log::debug!("Registered manager '{}' (deps: {:?}, lazy: {})", name, dependencies, lazy);
    }

    /// Registers a typed manager using its own name, dependencies and laziness.
    pub fn register_manager(&mut self, manager: &dyn Manager) {
        let dependencies = manager.dependencies();
        let deps: Vec<&str> = dependencies.iter().map(String::as_str).collect();
        self.register(manager.name(), &deps, manager.is_lazy());
    }

    /// Records the outcome of a manager's initialization.
    pub fn mark_initialized(&mut self, name: &str, error: Option<Error>) -> Result<(), ManagerError> {
        let status = self
            .statuses
            .get_mut(name)
            .ok_or_else(|| ManagerError::NotRegistered { name: name.to_string() })?;

        status.init_time = Some(Utc::now());
        match error {
            None => {
                status.initialized = true;
                status.error = None;
                if !self.init_order.iter().any(|n| n == name) {
                    self.init_order.push(name.to_string());
                }
                log::info!("Manager '{}' initialized", name);
            }
            Some(err) => {
                status.initialized = false;
                log::error!("Manager '{}' failed to initialize: {}", name, err);
                status.error = Some(Arc::new(err));
            }
        }
        Ok(())
    }

    /// Checks the direct dependencies of `name`. Transitive dependencies are
    /// satisfied by construction when managers are initialized in order.
    pub fn check_dependencies(&self, name: &str) -> Result<DependencyCheck, ManagerError> {
        let status = self
            .statuses
            .get(name)
            .ok_or_else(|| ManagerError::NotRegistered { name: name.to_string() })?;

        let missing: Vec<String> = status
            .dependencies
            .iter()
            .filter(|dep| !self.statuses.get(*dep).is_some_and(|s| s.initialized))
            .cloned()
            .collect();

        Ok(DependencyCheck {
            satisfied: missing.is_empty(),
            missing,
        })
    }

    /// Dependency-first order of the eager managers.
    pub fn get_initialization_order(&self) -> Result<Vec<String>, GraphError> {
        self.graph.topological_order(|node| self.is_lazy(&node.name))
    }

    /// Dependency-first order of `name` and everything it transitively
    /// depends on, lazy or not. Ends with `name` itself.
    pub fn initialization_path(&self, name: &str) -> Result<Vec<String>, GraphError> {
        let mut needed: HashSet<String> = HashSet::new();
        let mut pending = vec![name.to_string()];
        while let Some(current) = pending.pop() {
            if needed.insert(current.clone()) {
                pending.extend(self.graph.dependencies_of(&current));
            }
        }
        self.graph.topological_order(|node| !needed.contains(&node.name))
    }

    pub fn validate_dependency_graph(&self) -> ValidationReport {
        self.graph.validate()
    }

    /// Graphviz description: lazy managers dashed, initialized managers filled.
    pub fn generate_dependency_graph(&self) -> String {
        self.graph.to_dot("managers", |node| {
            let status = self.statuses.get(&node.name)?;
            match (status.lazy, status.initialized) {
                (true, true) => Some("style=\"dashed,filled\"".to_string()),
                (true, false) => Some("style=dashed".to_string()),
                (false, true) => Some("style=filled".to_string()),
                (false, false) => None,
            }
        })
    }

    pub fn status(&self, name: &str) -> Option<ManagerStatus> {
        self.statuses.get(name).map(|status| {
            let mut status = status.clone();
            status.dependents = self.graph.dependents_of(name);
            status
        })
    }

    /// Statuses in registration order.
    pub fn statuses(&self) -> Vec<ManagerStatus> {
        self.graph
            .nodes()
            .iter()
            .filter_map(|node| self.status(&node.name))
            .collect()
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.statuses.get(name).is_some_and(|s| s.initialized)
    }

    pub fn is_lazy(&self, name: &str) -> bool {
        self.statuses.get(name).is_some_and(|s| s.lazy)
    }

    /// Names in the order they were successfully initialized.
    pub fn init_order(&self) -> &[String] {
        &self.init_order
    }

    pub fn has(&self, name: &str) -> bool {
        self.statuses.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Marks every manager uninitialized again, keeping registrations.
    /// Failure records and init times are cleared too.
    pub fn reset_initialization(&mut self) {
        for status in self.statuses.values_mut() {
            status.initialized = false;
            status.init_time = None;
            status.error = None;
        }
        self.init_order.clear();
    }

    /// Drops every registration and status.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.statuses.clear();
        self.init_order.clear();
    }
}
