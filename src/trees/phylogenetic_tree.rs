use anyhow::{anyhow, Result};

/// An immutable rooted binary phylogenetic tree over `n` taxa.
///
/// Nodes are numbered so that all leaves precede all internal nodes and
/// children precede their parent; the root is thus the last node. Leaves are
/// numbered by their taxon id, so a tree over `n` taxa has leaves `0..n-1`
/// and internal nodes `n..2n-2`, with `2n-2` being the root.
///
/// All structural queries (parent, depth, subtree size, subtree taxa and
/// node sets) are precomputed at construction time; instances never change
/// afterwards.
pub struct PhylogeneticTree {
    n_taxa: usize,
    parents: Vec<Option<usize>>,
    depths: Vec<usize>,
    subtree_taxa: Vec<Vec<usize>>,
    subtree_nodes: Vec<Vec<usize>>,
}

impl PhylogeneticTree {
    /// Builds a tree from its parent links.
    ///
    /// `parents[v]` must give the parent of node `v`, or `None` for the root
    /// only. The numbering scheme described at the type level is checked:
    /// an error is returned if the node count does not match the taxa count,
    /// if a parent link points downwards or to a leaf, or if an internal
    /// node does not have exactly two children.
    pub fn new_with_parent_links(n_taxa: usize, parents: Vec<Option<usize>>) -> Result<Self> {
        if n_taxa < 2 {
            return Err(anyhow!("a phylogenetic tree needs at least 2 taxa"));
        }
        let node_count = 2 * n_taxa - 1;
        if parents.len() != node_count {
            return Err(anyhow!(
                "a binary tree over {} taxa must have {} nodes; got {}",
                n_taxa,
                node_count,
                parents.len()
            ));
        }
        let root = node_count - 1;
        let mut n_children = vec![0_usize; node_count];
        for (v, p) in parents.iter().enumerate() {
            match p {
                None => {
                    if v != root {
                        return Err(anyhow!("node {} has no parent but is not the root", v));
                    }
                }
                Some(p) => {
                    if *p < n_taxa || *p >= node_count {
                        return Err(anyhow!("node {} has a leaf or unknown node as parent", v));
                    }
                    if *p <= v {
                        return Err(anyhow!(
                            "node {} must be numbered after its child {}",
                            p,
                            v
                        ));
                    }
                    n_children[*p] += 1;
                }
            }
        }
        if let Some(v) = (n_taxa..node_count).find(|v| n_children[*v] != 2) {
            return Err(anyhow!(
                "internal node {} has {} children; the tree must be binary",
                v,
                n_children[v]
            ));
        }
        let mut depths = vec![0_usize; node_count];
        for v in (0..root).rev() {
            depths[v] = depths[parents[v].unwrap()] + 1;
        }
        let mut subtree_taxa: Vec<Vec<usize>> = (0..node_count)
            .map(|v| if v < n_taxa { vec![v] } else { vec![] })
            .collect();
        let mut subtree_nodes: Vec<Vec<usize>> = (0..node_count).map(|v| vec![v]).collect();
        for v in 0..root {
            let p = parents[v].unwrap();
            let taxa = subtree_taxa[v].clone();
            subtree_taxa[p].extend(taxa);
            let nodes = subtree_nodes[v].clone();
            subtree_nodes[p].extend(nodes);
        }
        subtree_taxa.iter_mut().for_each(|s| s.sort_unstable());
        subtree_nodes.iter_mut().for_each(|s| s.sort_unstable());
        Ok(Self {
            n_taxa,
            parents,
            depths,
            subtree_taxa,
            subtree_nodes,
        })
    }

    /// Returns the number of taxa (and leaves) of this tree.
    pub fn n_taxa(&self) -> usize {
        self.n_taxa
    }

    /// Returns the total number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.parents.len()
    }

    /// Returns the root node id (always the last node).
    pub fn root(&self) -> usize {
        self.parents.len() - 1
    }

    /// Returns the parent of a node, or `None` for the root.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents[node]
    }

    /// Returns the depth of a node; the root has depth 0.
    pub fn depth(&self, node: usize) -> usize {
        self.depths[node]
    }

    /// Returns the number of nodes, leaves included, in the subtree rooted
    /// at a node.
    pub fn subtree_size(&self, node: usize) -> usize {
        self.subtree_nodes[node].len()
    }

    /// Returns the sorted taxon ids found in the subtree rooted at a node.
    pub fn taxa_in_subtree(&self, node: usize) -> &[usize] {
        &self.subtree_taxa[node]
    }

    /// Returns the sorted node ids of the subtree rooted at a node, the node
    /// itself included.
    pub fn subtree_nodes(&self, node: usize) -> &[usize] {
        &self.subtree_nodes[node]
    }

    /// Returns `true` if and only if `node` belongs to the subtree rooted at
    /// `subtree_root`.
    pub fn is_in_subtree(&self, node: usize, subtree_root: usize) -> bool {
        self.subtree_nodes[subtree_root].binary_search(&node).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // the tree ((0,1),2): internal node 3 joins the leaves 0 and 1
    fn cherry_tree() -> PhylogeneticTree {
        PhylogeneticTree::new_with_parent_links(3, vec![Some(3), Some(3), Some(4), Some(4), None])
            .unwrap()
    }

    #[test]
    fn test_structure_queries() {
        let t = cherry_tree();
        assert_eq!(3, t.n_taxa());
        assert_eq!(5, t.node_count());
        assert_eq!(4, t.root());
        assert_eq!(Some(3), t.parent(0));
        assert_eq!(Some(4), t.parent(3));
        assert_eq!(None, t.parent(4));
    }

    #[test]
    fn test_depths() {
        let t = cherry_tree();
        assert_eq!(0, t.depth(4));
        assert_eq!(1, t.depth(3));
        assert_eq!(1, t.depth(2));
        assert_eq!(2, t.depth(0));
        assert_eq!(2, t.depth(1));
    }

    #[test]
    fn test_subtree_queries() {
        let t = cherry_tree();
        assert_eq!(3, t.subtree_size(3));
        assert_eq!(5, t.subtree_size(4));
        assert_eq!(1, t.subtree_size(0));
        assert_eq!(&[0, 1], t.taxa_in_subtree(3));
        assert_eq!(&[0, 1, 2], t.taxa_in_subtree(4));
        assert_eq!(&[0, 1, 3], t.subtree_nodes(3));
        assert!(t.is_in_subtree(1, 3));
        assert!(!t.is_in_subtree(2, 3));
    }

    #[test]
    fn test_too_few_taxa() {
        assert!(PhylogeneticTree::new_with_parent_links(1, vec![None]).is_err());
    }

    #[test]
    fn test_wrong_node_count() {
        assert!(PhylogeneticTree::new_with_parent_links(3, vec![Some(3), Some(3), None]).is_err());
    }

    #[test]
    fn test_leaf_as_parent() {
        assert!(
            PhylogeneticTree::new_with_parent_links(2, vec![Some(1), Some(2), None]).is_err()
        );
    }

    #[test]
    fn test_parent_numbered_before_child() {
        assert!(PhylogeneticTree::new_with_parent_links(
            3,
            vec![Some(4), Some(4), Some(3), None, Some(3)]
        )
        .is_err());
    }

    #[test]
    fn test_missing_root() {
        assert!(PhylogeneticTree::new_with_parent_links(
            2,
            vec![Some(2), None, Some(2)]
        )
        .is_err());
    }

    #[test]
    fn test_non_binary_internal_node() {
        // four taxa all attached to node 4, node 5 with a single child
        assert!(PhylogeneticTree::new_with_parent_links(
            4,
            vec![Some(4), Some(4), Some(4), Some(4), Some(5), Some(6), None]
        )
        .is_err());
    }

    #[test]
    fn test_minimal_tree() {
        let t =
            PhylogeneticTree::new_with_parent_links(2, vec![Some(2), Some(2), None]).unwrap();
        assert_eq!(2, t.root());
        assert_eq!(&[0, 1], t.taxa_in_subtree(2));
    }
}
