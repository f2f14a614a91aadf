//! Graph view of the passages of a maze
//!
//! Used to check that a carved maze is perfect: connected and without loops.

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};

use crate::{Grid, Point};

/// Undirected graph with one node per passage cell and one edge per pair
/// of adjacent passage cells
pub struct MazeGraph {
    /// Node indices, indexed `[y][x]`
    nodes: Vec<Vec<Option<NodeIndex>>>,
    /// Node weights are the cell coordinates
    graph: Graph<Point, (), Undirected>,
}

impl MazeGraph {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut graph = Graph::new_undirected();
        let mut nodes: Vec<Vec<Option<NodeIndex>>> = vec![vec![None; grid.width()]; grid.depth()];

        for at in grid.passages() {
            let node_a = Self::get_or_create_node(at, &mut nodes, &mut graph);
            // Undirected, so looking right and down covers every pair
            for next in [Point::new(at.x + 1, at.y), Point::new(at.x, at.y + 1)] {
                if grid.is_passage(next.x, next.y).unwrap_or(false) {
                    let node_b = Self::get_or_create_node(next, &mut nodes, &mut graph);
                    graph.add_edge(node_a, node_b, ());
                }
            }
        }

        MazeGraph { nodes, graph }
    }

    fn get_or_create_node(
        at: Point,
        nodes: &mut [Vec<Option<NodeIndex>>],
        graph: &mut Graph<Point, (), Undirected>,
    ) -> NodeIndex {
        if let Some(node) = nodes[at.y][at.x] {
            node
        } else {
            let node = graph.add_node(at);
            nodes[at.y][at.x] = Some(node);
            node
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of separate passage regions
    pub fn components(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Number of open neighbours of `at`, `None` for walls
    pub fn degree(&self, at: Point) -> Option<usize> {
        let node = (*self.nodes.get(at.y)?.get(at.x)?)?;
        Some(self.graph.neighbors(node).count())
    }

    /// Passage cells with a single open neighbour
    pub fn dead_ends(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|n| self.graph.neighbors(*n).count() == 1)
            .count()
    }

    /// Connected and free of loops, i.e. the passages form a spanning tree
    pub fn is_perfect(&self) -> bool {
        self.node_count() > 0
            && self.components() == 1
            && self.edge_count() == self.node_count() - 1
    }
}
