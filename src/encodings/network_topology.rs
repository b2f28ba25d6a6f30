use std::ops::Range;

/// The node-numbering scheme of the candidate networks and the legal
/// parent/child relations between the node slots.
///
/// A network over `n` taxa with at most `k` reticulations is built on
/// `2n - 1 + 2k` node slots, partitioned into three fixed ranges:
/// leaves `[0, n)` (one per taxon), tree nodes `[n, 2n - 1 + k)` with the
/// last one being the root, and reticulation nodes on the `k` remaining
/// slots. The numbering is a fixed total order; the legal parent/child
/// relations below force children to carry smaller ids than their parent
/// (reticulations excepted), which is the symmetry break avoiding
/// relabeling-equivalent duplicate networks.
///
/// All queries are pure; the type is cheap to copy.
#[derive(Clone, Copy, Debug)]
pub struct NetworkTopology {
    n_taxa: usize,
    n_reticulations: usize,
    reticulation_connection: bool,
}

impl NetworkTopology {
    /// Builds the topology model for `n` taxa and `k` reticulation slots.
    ///
    /// If `reticulation_connection` is `true`, reticulation nodes may be
    /// linked to each other (lower id below higher id), enabling more
    /// complex networks at a higher variable and clause cost.
    pub fn new(n_taxa: usize, n_reticulations: usize, reticulation_connection: bool) -> Self {
        Self {
            n_taxa,
            n_reticulations,
            reticulation_connection,
        }
    }

    /// Returns the number of taxa `n`.
    pub fn n_taxa(&self) -> usize {
        self.n_taxa
    }

    /// Returns the reticulation budget `k`.
    pub fn n_reticulations(&self) -> usize {
        self.n_reticulations
    }

    /// Returns the number of leaf and tree-node slots, `2n - 1 + k`.
    ///
    /// This is also the lowest reticulation slot id.
    pub fn tree_node_count(&self) -> usize {
        2 * self.n_taxa - 1 + self.n_reticulations
    }

    /// Returns the total number of node slots, `2n - 1 + 2k`.
    pub fn node_count(&self) -> usize {
        self.tree_node_count() + self.n_reticulations
    }

    /// Returns the root slot id, `tree_node_count() - 1`.
    pub fn root(&self) -> usize {
        self.tree_node_count() - 1
    }

    /// Returns the range of all node slots.
    pub fn all_nodes(&self) -> Range<usize> {
        0..self.node_count()
    }

    /// Returns the range of the internal tree-node slots.
    pub fn tree_nodes(&self) -> Range<usize> {
        self.n_taxa..self.tree_node_count()
    }

    /// Returns the range of the reticulation slots.
    pub fn reticulation_nodes(&self) -> Range<usize> {
        self.tree_node_count()..self.node_count()
    }

    /// Returns `true` if and only if the slot is a leaf or tree node.
    pub fn is_tree_node(&self, node: usize) -> bool {
        node < self.tree_node_count()
    }

    /// Returns the slots allowed as a child of `node`, in increasing order.
    ///
    /// Leaves have no children. A tree node may take any lower-numbered
    /// leaf/tree node or any reticulation node. A reticulation node may take
    /// any non-root leaf/tree node, plus lower-numbered reticulations when
    /// reticulation connections are enabled.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a valid slot id.
    pub fn possible_children(&self, node: usize) -> Vec<usize> {
        self.check_bounds(node);
        let tree_node_count = self.tree_node_count();
        if node < self.n_taxa {
            return vec![];
        }
        self.all_nodes()
            .filter(|child| {
                if node < tree_node_count {
                    *child < node || *child >= tree_node_count
                } else {
                    *child < tree_node_count - 1
                        || (self.reticulation_connection
                            && *child >= tree_node_count
                            && *child < node)
                }
            })
            .collect()
    }

    /// Returns the slots allowed as a parent of `node`, in increasing order.
    ///
    /// The root has no parent. Leaves may take any tree or reticulation
    /// node. A tree node may take any higher-numbered tree node or any
    /// reticulation node. A reticulation node may take any tree node, plus
    /// higher-numbered reticulations when reticulation connections are
    /// enabled.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a valid slot id.
    pub fn possible_parents(&self, node: usize) -> Vec<usize> {
        self.check_bounds(node);
        let tree_node_count = self.tree_node_count();
        if node == self.root() {
            return vec![];
        }
        (self.n_taxa..self.node_count())
            .filter(|parent| {
                if node < self.n_taxa {
                    true
                } else if node < tree_node_count {
                    node < *parent
                } else {
                    *parent < tree_node_count
                        || (self.reticulation_connection && node < *parent)
                }
            })
            .collect()
    }

    /// Returns the subset of [`possible_parents`](Self::possible_parents)
    /// made of tree nodes, i.e. the candidate nearest used ancestors of
    /// `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a valid slot id.
    pub fn possible_up(&self, node: usize) -> Vec<usize> {
        let tree_node_count = self.tree_node_count();
        self.possible_parents(node)
            .into_iter()
            .filter(|parent| *parent < tree_node_count)
            .collect()
    }

    fn check_bounds(&self, node: usize) {
        if node >= self.node_count() {
            panic!(
                "node slot {} is out of bounds (the network has {} slots)",
                node,
                self.node_count()
            );
        }
    }
}
