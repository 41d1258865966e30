use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DefaultIx, NodeIndex};
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::IntoEdgeReferences;
use petgraph::Direction;

use crate::module::{Dependency, Module, ModuleId, ProvideEdge};

pub struct ModuleGraph {
    id_index_map: HashMap<ModuleId, NodeIndex<DefaultIx>>,
    pub graph: StableDiGraph<Module, Dependency>,
    entries: HashSet<ModuleId>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self {
            id_index_map: HashMap::new(),
            graph: StableDiGraph::new(),
            entries: HashSet::new(),
        }
    }

    pub fn get_entry_modules(&self) -> Vec<&ModuleId> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort();
        entries
    }

    /// Adds a module, replacing the node of an already known id.
    pub fn add_module(&mut self, module: Module) {
        if module.is_entry {
            self.entries.insert(module.id.clone());
        }
        if let Some(i) = self.id_index_map.get(&module.id) {
            self.graph[*i] = module;
            return;
        }
        let id = module.id.clone();
        let idx = self.graph.add_node(module);
        self.id_index_map.insert(id, idx);
    }

    pub fn has_module(&self, module_id: &ModuleId) -> bool {
        self.id_index_map.contains_key(module_id)
    }

    pub fn get_module(&self, module_id: &ModuleId) -> Option<&Module> {
        self.id_index_map
            .get(module_id)
            .and_then(|i| self.graph.node_weight(*i))
    }

    pub fn get_module_mut(&mut self, module_id: &ModuleId) -> Option<&mut Module> {
        self.id_index_map
            .get(module_id)
            .and_then(|i| self.graph.node_weight_mut(*i))
    }

    pub fn get_modules(&self) -> Vec<&Module> {
        self.graph.node_weights().collect()
    }

    pub fn get_module_ids(&self) -> Vec<ModuleId> {
        self.graph
            .node_weights()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Edges are unique per (source, resolve type) between two modules, so
    /// two identifiers provided from the same target keep their own edge.
    pub fn add_dependency(&mut self, from: &ModuleId, to: &ModuleId, edge: Dependency) {
        let from = *self
            .id_index_map
            .get(from)
            .unwrap_or_else(|| panic!("module_id {:?} not found in the module graph", from));
        let to = *self
            .id_index_map
            .get(to)
            .unwrap_or_else(|| panic!("module_id {:?} not found in the module graph", to));
        let exists = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .any(|e| {
                e.target() == to
                    && e.weight().source == edge.source
                    && e.weight().resolve_type == edge.resolve_type
            });
        if !exists {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn get_dependencies(&self, module_id: &ModuleId) -> Vec<(&ModuleId, &Dependency)> {
        let Some(i) = self.id_index_map.get(module_id) else {
            return vec![];
        };
        let mut deps = self
            .graph
            .edges_directed(*i, Direction::Outgoing)
            .map(|edge| (&self.graph[edge.target()].id, edge.weight()))
            .collect::<Vec<_>>();
        deps.sort_by_key(|(_, dep)| dep.order);
        deps
    }

    pub fn get_targets(&self, module_id: &ModuleId) -> Vec<ModuleId> {
        let Some(i) = self.id_index_map.get(module_id) else {
            return vec![];
        };
        let mut targets = self
            .graph
            .neighbors_directed(*i, Direction::Incoming)
            .map(|idx| self.graph[idx].id.clone())
            .collect::<Vec<_>>();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Every injected import, sorted by importer then identifier.
    pub fn provided_edges(&self) -> Vec<ProvideEdge> {
        let mut edges = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let binding = edge.weight().provided_binding()?;
                Some(ProvideEdge {
                    from: self.graph[edge.source()].id.clone(),
                    identifier: binding.identifier.clone(),
                    request: binding.target.request().to_string(),
                    export: binding.target.export().map(|e| e.to_string()),
                    to: self.graph[edge.target()].id.clone(),
                })
            })
            .collect::<Vec<_>>();
        edges.sort();
        edges
    }
}

impl fmt::Display for ModuleGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut nodes = self
            .graph
            .node_weights()
            .map(|node| &node.id.id)
            .collect::<Vec<_>>();
        let mut references = self
            .graph
            .edge_references()
            .map(|edge| {
                let source = &self.graph[edge.source()].id.id;
                let target = &self.graph[edge.target()].id.id;
                match edge.weight().provided_binding() {
                    Some(binding) => {
                        format!("{} -> {} ({})", source, target, binding.identifier)
                    }
                    None => format!("{} -> {}", source, target),
                }
            })
            .collect::<Vec<_>>();
        nodes.sort();
        references.sort();
        write!(
            f,
            "graph\n nodes:{:?} \n references:{:?}",
            &nodes, &references
        )
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}
