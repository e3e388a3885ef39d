//! Location-to-location cost matrix.
//!
//! Location 0 is the depot; locations `1..` are the candidate bins.  Each
//! row is one shortest-path tree, so a matrix over `n` locations costs `n`
//! one-to-all searches and keeps the trees around for path reconstruction.

use cr_core::NodeId;
use cr_network::{shortest_path_tree, Exclusions, GeoGraph, Path, PathTree};

pub(crate) struct CostMatrix<'g> {
    nodes: Vec<NodeId>,
    trees: Vec<PathTree<'g>>,
}

impl<'g> CostMatrix<'g> {
    /// With the `parallel` feature the searches run on Rayon's thread pool.
    pub(crate) fn build(graph: &'g GeoGraph, nodes: Vec<NodeId>) -> Self {
        let exclusions = Exclusions::new();

        #[cfg(not(feature = "parallel"))]
        let trees = nodes
            .iter()
            .map(|&n| shortest_path_tree(graph, n, &exclusions))
            .collect();

        #[cfg(feature = "parallel")]
        let trees = {
            use rayon::prelude::*;
            nodes
                .par_iter()
                .map(|&n| shortest_path_tree(graph, n, &exclusions))
                .collect()
        };

        Self { nodes, trees }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Least cost from location `i` to location `j`; `INFINITY` if
    /// unreachable.
    #[inline]
    pub(crate) fn cost(&self, i: usize, j: usize) -> f64 {
        self.trees[i].cost_to(self.nodes[j]).unwrap_or(f64::INFINITY)
    }

    pub(crate) fn path(&self, i: usize, j: usize) -> Option<Path> {
        self.trees[i].path_to(self.nodes[j]).into_path()
    }

    /// Cost of the open or closed tour `depot → order… [→ depot]`.
    pub(crate) fn tour_cost(&self, order: &[usize], close: bool) -> f64 {
        let mut total = 0.0;
        let mut at = 0;
        for &next in order {
            total += self.cost(at, next);
            at = next;
        }
        if close {
            total += self.cost(at, 0);
        }
        total
    }
}
