//! Dependency-graph tile scrambler.
//!
//! Two generators are built from the same seed. The first supplies the base
//! permutation. The second is only used as a PRNG stream: it draws a random
//! DAG over the tiles (2..=4 candidate predecessors per tile, cycles
//! rejected), and Kahn's algorithm turns that DAG into a scramble path. The
//! final mapping is the base permutation indexed through the path.

use std::collections::VecDeque;

use unpanel_core::{Seed, TileMapping, UnpanelError, UnpanelResult, MAX_TOTAL_TILES};

use crate::randomizer::TileRandomizer;
use crate::DEFAULT_FEISTEL_ROUNDS;

/// Candidate draws for a tile that ended the first pass with no predecessor
const SYNTHETIC_PREDECESSOR_ATTEMPTS: usize = 10;

/// Directed graph over tile indices; an edge `u -> v` places `u` before `v`.
///
/// Successor lists keep insertion order and may hold the same edge twice;
/// Kahn's ordering depends on both.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl DependencyGraph {
    pub fn new(nodes: usize) -> Self {
        Self {
            successors: vec![Vec::new(); nodes],
            in_degree: vec![0; nodes],
        }
    }

    /// Draw a random DAG from `rng`'s stream.
    pub fn build(nodes: usize, rng: &mut TileRandomizer) -> Self {
        let mut graph = Self::new(nodes);
        let n = nodes as u64;

        for r in 0..nodes {
            let edge_count = rng.next_u64() % 3 + 2;
            for _ in 0..edge_count {
                let j = (rng.next_u64() % n) as usize;
                graph.try_add_edge(j, r);
            }
        }

        for r in 0..nodes {
            if graph.in_degree[r] != 0 {
                continue;
            }
            for _ in 0..SYNTHETIC_PREDECESSOR_ATTEMPTS {
                let s = (rng.next_u64() % n) as usize;
                if graph.try_add_edge(s, r) {
                    break;
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.in_degree[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// Nodes with no predecessor, ascending.
    pub fn sources(&self) -> Vec<usize> {
        (0..self.len()).filter(|&v| self.in_degree[v] == 0).collect()
    }

    /// Add `from -> to` unless it is a self-loop or would close a cycle.
    pub fn try_add_edge(&mut self, from: usize, to: usize) -> bool {
        if from == to || self.reaches(to, from) {
            return false;
        }
        self.successors[from].push(to);
        self.in_degree[to] += 1;
        true
    }

    /// Whether `target` is reachable from `start` along existing edges.
    pub fn reaches(&self, start: usize, target: usize) -> bool {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(u) = stack.pop() {
            if u == target {
                return true;
            }
            for &v in &self.successors[u] {
                if !seen[v] {
                    seen[v] = true;
                    stack.push(v);
                }
            }
        }
        false
    }

    /// Kahn's algorithm, FIFO, seeded with sources in ascending order.
    ///
    /// Shorter than `len()` only if the graph has a cycle, which
    /// [`try_add_edge`](Self::try_add_edge) never allows.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<usize> = self.sources().into();
        let mut order = Vec::with_capacity(self.len());

        while let Some(u) = queue.pop_front() {
            order.push(u);
            for &v in &self.successors[u] {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        order
    }
}

/// Tile mapping generator for one page seed.
#[derive(Debug, Clone)]
pub struct Scrambler {
    seed: Seed,
    permutation: TileRandomizer,
    graph: DependencyGraph,
}

impl Scrambler {
    /// Build the base permutation and dependency graph for a `grid_size`² grid.
    pub fn new(seed: Seed, grid_size: usize) -> UnpanelResult<Self> {
        Self::with_rounds(seed, grid_size, DEFAULT_FEISTEL_ROUNDS)
    }

    pub fn with_rounds(seed: Seed, grid_size: usize, rounds: usize) -> UnpanelResult<Self> {
        if grid_size == 0 {
            return Err(UnpanelError::InvalidMapping("grid size must be at least 1".into()));
        }
        let total = grid_size
            .checked_mul(grid_size)
            .filter(|&total| total <= MAX_TOTAL_TILES)
            .ok_or_else(|| {
                UnpanelError::InvalidMapping(format!(
                    "grid size {grid_size} exceeds {MAX_TOTAL_TILES} tiles"
                ))
            })?;

        let permutation = TileRandomizer::with_rounds(seed, total, rounds);
        let mut stream = TileRandomizer::with_rounds(seed, total, rounds);
        let graph = DependencyGraph::build(total, &mut stream);

        tracing::trace!(
            %seed,
            tiles = total,
            sources = graph.sources().len(),
            "built tile dependency graph"
        );

        Ok(Self {
            seed,
            permutation,
            graph,
        })
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn total_tiles(&self) -> usize {
        self.permutation.order().len()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn scramble_path(&self) -> Vec<usize> {
        self.graph.topological_order()
    }

    /// `position -> source tile` for every position of the grid.
    pub fn mapping(&self) -> TileMapping {
        let mut base = self.permutation.order().to_vec();
        let path = self.scramble_path();
        if path.len() == base.len() {
            base = path.iter().map(|&p| base[p]).collect();
        } else {
            tracing::warn!(
                seed = %self.seed,
                path = path.len(),
                tiles = base.len(),
                "scramble path incomplete, using base permutation"
            );
        }
        TileMapping::from_sources(base)
    }
}
