//! Function-call transition graph
//!
//! Nodes are function names; a directed edge `a -> b` counts how many times
//! `a` was immediately followed by `b` in the wallet's call sequence.
//! Records without an entry function are skipped before pairing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::profile::record::TransactionRecord;

/// A weighted directed edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Transition graph with nodes and edges in first-seen order
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitionGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<TransitionEdge>,

    /// name -> index into `nodes`
    #[serde(skip)]
    node_index: HashMap<String, usize>,

    /// (source, target) -> index into `edges`
    #[serde(skip)]
    edge_index: HashMap<(String, String), usize>,
}

impl TransitionGraph {
    /// Build from the ordered record sequence
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        Self::from_functions(records.iter().map(|r| r.function.as_str()))
    }

    /// Build from an ordered sequence of function names
    pub fn from_functions<'a, I>(functions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let calls: Vec<&str> = functions.into_iter().filter(|f| !f.is_empty()).collect();

        calls
            .windows(2)
            .fold(Self::default(), |graph, pair| graph.with_transition(pair[0], pair[1]))
    }

    fn with_transition(mut self, source: &str, target: &str) -> Self {
        self.add_node(source);
        self.add_node(target);

        let key = (source.to_string(), target.to_string());
        match self.edge_index.get(&key) {
            Some(&idx) => self.edges[idx].weight += 1,
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(TransitionEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    weight: 1,
                });
            }
        }
        self
    }

    fn add_node(&mut self, name: &str) {
        if !self.node_index.contains_key(name) {
            self.node_index.insert(name.to_string(), self.nodes.len());
            self.nodes.push(name.to_string());
        }
    }

    /// Weight of the `source -> target` edge, zero when absent
    pub fn edge_weight(&self, source: &str, target: &str) -> u32 {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
            .map(|e| e.weight)
            .unwrap_or(0)
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Heaviest edge weight, for scaling edge thickness
    pub fn max_weight(&self) -> u32 {
        self.edges.iter().map(|e| e.weight).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl PartialEq for TransitionGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_sequence() {
        let graph = TransitionGraph::from_functions(vec!["A", "B", "A", "B", "C"]);

        assert_eq!(graph.nodes, vec!["A", "B", "C"]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge_weight("A", "B"), 2);
        assert_eq!(graph.edge_weight("B", "A"), 1);
        assert_eq!(graph.edge_weight("B", "C"), 1);
        assert_eq!(graph.edge_weight("C", "A"), 0);
        assert_eq!(graph.max_weight(), 2);
    }

    #[test]
    fn test_self_loop() {
        let graph = TransitionGraph::from_functions(vec!["coin::transfer", "coin::transfer", "coin::transfer"]);
        assert_eq!(graph.nodes, vec!["coin::transfer"]);
        assert_eq!(graph.edge_weight("coin::transfer", "coin::transfer"), 2);
    }

    #[test]
    fn test_empty_functions_are_skipped_before_pairing() {
        // The empty entry sits between A and B, so A -> B is still adjacent
        let graph = TransitionGraph::from_functions(vec!["A", "", "B"]);
        assert_eq!(graph.edge_weight("A", "B"), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_empty_and_single_inputs() {
        let empty = TransitionGraph::from_functions(Vec::<&str>::new());
        assert!(empty.is_empty());
        assert_eq!(empty.edge_count(), 0);
        assert_eq!(empty.max_weight(), 0);

        let single = TransitionGraph::from_functions(vec!["A"]);
        assert_eq!(single.edge_count(), 0);
        assert_eq!(single.node_count(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let graph = TransitionGraph::from_functions(vec!["A", "B"]);
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"], serde_json::json!(["A", "B"]));
        assert_eq!(
            value["edges"],
            serde_json::json!([{ "source": "A", "target": "B", "weight": 1 }])
        );
        assert!(value.get("edge_index").is_none());
        assert!(value.get("node_index").is_none());
    }

    #[test]
    fn test_many_distinct_functions() {
        let names: Vec<String> = (0..2_000).map(|i| format!("m{}::f", i % 500)).collect();
        let graph = TransitionGraph::from_functions(names.iter().map(String::as_str));

        assert_eq!(graph.node_count(), 500);
        assert_eq!(graph.nodes[0], "m0::f");
        assert_eq!(graph.nodes[499], "m499::f");
        assert!(graph.contains_node("m250::f"));
        // 0 -> 1 occurs once per lap, four laps
        assert_eq!(graph.edge_weight("m0::f", "m1::f"), 4);
        assert_eq!(graph.edge_weight("m499::f", "m0::f"), 3);
    }
}
