//! Longest causal chain through the timeline.
//!
//! Nodes are event indices, edges run from cause to effect along `causedBy`.
//! Acyclic graphs get an exact memoized longest-path search; graphs with
//! cycles fall back to a depth-first search over simple paths, bounded by
//! `critical_path_budget` steps.

use std::collections::BTreeSet;

use layered_timeline::{EventId, Timeline};
use pathfinding::prelude::strongly_connected_components;

use crate::analyzer::ChronologyAnalyzer;

impl ChronologyAnalyzer {
    /// The longest simple path from a node without causes to a node without
    /// effects. Ties go to the path found first in timeline order; paths
    /// shorter than two events are reported as empty.
    pub fn find_critical_path(&self, timeline: &Timeline) -> Vec<EventId> {
        let graph = CausalGraph::new(timeline);
        let path = if graph.is_acyclic() {
            graph.longest_acyclic()
        } else {
            tracing::debug!("causal graph has cycles, using bounded search");
            graph.longest_bounded(self.config.critical_path_budget)
        };

        if path.len() < 2 {
            return Vec::new();
        }
        path.into_iter()
            .map(|idx| timeline.events[idx].id.clone())
            .collect()
    }
}

struct CausalGraph {
    successors: Vec<BTreeSet<usize>>,
    in_degree: Vec<usize>,
}

impl CausalGraph {
    fn new(timeline: &Timeline) -> Self {
        let index = timeline.index();
        let mut successors = vec![BTreeSet::new(); timeline.events.len()];
        for (effect, event) in timeline.events.iter().enumerate() {
            for cause_id in &event.caused_by {
                if let Some(&cause) = index.get(cause_id) {
                    successors[cause].insert(effect);
                }
            }
        }
        let mut in_degree = vec![0; successors.len()];
        for targets in &successors {
            for &target in targets {
                in_degree[target] += 1;
            }
        }
        Self {
            successors,
            in_degree,
        }
    }

    fn is_acyclic(&self) -> bool {
        let nodes: Vec<usize> = (0..self.successors.len()).collect();
        let has_self_loop = nodes.iter().any(|&n| self.successors[n].contains(&n));
        !has_self_loop
            && strongly_connected_components(&nodes, |&n| self.successors[n].iter().copied())
                .iter()
                .all(|component| component.len() == 1)
    }

    fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.successors.len()).filter(|&n| self.in_degree[n] == 0)
    }

    fn longest_acyclic(&self) -> Vec<usize> {
        let mut memo: Vec<Option<(usize, Option<usize>)>> = vec![None; self.successors.len()];
        let mut best: Option<(usize, usize)> = None;
        for source in self.sources() {
            let (length, _) = self.longest_from(source, &mut memo);
            if best.map_or(true, |(_, top)| length > top) {
                best = Some((source, length));
            }
        }

        let mut path = Vec::new();
        let mut current = best.map(|(source, _)| source);
        while let Some(node) = current {
            path.push(node);
            current = memo[node].and_then(|(_, next)| next);
        }
        path
    }

    /// Length of the longest path starting at `node` and the successor it continues through.
    fn longest_from(
        &self,
        node: usize,
        memo: &mut Vec<Option<(usize, Option<usize>)>>,
    ) -> (usize, Option<usize>) {
        if let Some(known) = memo[node] {
            return known;
        }
        let mut result = (1, None);
        for &next in &self.successors[node] {
            let (length, _) = self.longest_from(next, memo);
            if length + 1 > result.0 {
                result = (length + 1, Some(next));
            }
        }
        memo[node] = Some(result);
        result
    }

    fn longest_bounded(&self, budget: usize) -> Vec<usize> {
        let mut search = BoundedSearch {
            graph: self,
            budget,
            on_path: vec![false; self.successors.len()],
            path: Vec::new(),
            best: Vec::new(),
        };
        for source in self.sources() {
            if search.budget == 0 {
                break;
            }
            search.visit(source);
        }
        search.best
    }
}

struct BoundedSearch<'g> {
    graph: &'g CausalGraph,
    budget: usize,
    on_path: Vec<bool>,
    path: Vec<usize>,
    best: Vec<usize>,
}

impl BoundedSearch<'_> {
    fn visit(&mut self, node: usize) {
        if self.budget == 0 {
            return;
        }
        self.budget -= 1;
        self.on_path[node] = true;
        self.path.push(node);

        let graph = self.graph;
        if graph.successors[node].is_empty() {
            if self.path.len() > self.best.len() {
                self.best = self.path.clone();
            }
        } else {
            for &next in &graph.successors[node] {
                if !self.on_path[next] {
                    self.visit(next);
                }
            }
        }

        self.path.pop();
        self.on_path[node] = false;
    }
}
