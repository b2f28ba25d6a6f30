//! The constraints relating the mappings of two input trees: clades over the
//! same taxa must be realized by the same network node, and clades over
//! disjoint taxa by different ones.

use super::network_encoder::EncodingSession;
use crate::cnf::{clause, VarKey};

pub(crate) fn encode_for_pair(session: &mut EncodingSession, tree1: usize, tree2: usize) {
    let topology = session.topology;
    let n_taxa = topology.n_taxa();
    let phylogeny1 = session.tree(tree1);
    let phylogeny2 = session.tree(tree2);

    let mut n_equal = 0;
    let mut n_disjoint = 0;
    // non-root internal nodes only; roots always hold all the taxa
    for node1 in n_taxa..2 * n_taxa - 2 {
        let taxa1 = phylogeny1.taxa_in_subtree(node1);
        for node2 in n_taxa..2 * n_taxa - 2 {
            let taxa2 = phylogeny2.taxa_in_subtree(node2);
            if taxa1 == taxa2 {
                encode_equal_clades(session, tree1, node1, tree2, node2);
                n_equal += 1;
            }
            if tree1 < tree2
                && session.options().disjoint_clade_constraints
                && disjoint(taxa1, taxa2)
            {
                encode_disjoint_clades(session, tree1, node1, tree2, node2);
                n_disjoint += 1;
            }
        }
    }
    session.comment(&format!(
        "trees {} and {}: {} equal and {} disjoint clade pairs",
        tree1, tree2, n_equal, n_disjoint
    ));
}

/// Two clades over the same taxa must be realized by the same network node,
/// and the subtree below one cannot overlap the outside of the other.
fn encode_equal_clades(
    session: &mut EncodingSession,
    tree1: usize,
    node1: usize,
    tree2: usize,
    node2: usize,
) {
    let topology = session.topology;
    let n_taxa = topology.n_taxa();
    let phylogeny1 = session.tree(tree1);
    let phylogeny2 = session.tree(tree2);
    session.comment(&format!(
        "node {} of tree {} and node {} of tree {} hold the same {} taxa",
        node1,
        tree1,
        node2,
        tree2,
        phylogeny1.subtree_size(node1)
    ));

    for node in topology.tree_nodes() {
        session.clause(clause![
            session.neg(VarKey::mapping(tree1, node1, node)),
            session.pos(VarKey::mapping(tree2, node2, node)),
        ]);
    }

    for subtree_node in phylogeny1.subtree_nodes(node1) {
        if *subtree_node < n_taxa {
            continue;
        }
        for outside_node in n_taxa..2 * n_taxa - 1 {
            if phylogeny2.is_in_subtree(outside_node, node2) {
                continue;
            }
            for node in topology.tree_nodes() {
                session.clause(clause![
                    session.neg(VarKey::mapping(tree1, *subtree_node, node)),
                    session.neg(VarKey::mapping(tree2, outside_node, node)),
                ]);
            }
        }
    }
}

/// Two clades over disjoint taxa can never be realized by the same node.
fn encode_disjoint_clades(
    session: &mut EncodingSession,
    tree1: usize,
    node1: usize,
    tree2: usize,
    node2: usize,
) {
    let topology = session.topology;
    session.comment(&format!(
        "node {} of tree {} and node {} of tree {} hold disjoint taxa",
        node1, tree1, node2, tree2
    ));
    for node in topology.tree_nodes() {
        session.clause(clause![
            session.neg(VarKey::mapping(tree1, node1, node)),
            session.neg(VarKey::mapping(tree2, node2, node)),
        ]);
    }
}

/// Both slices are sorted, so a single merge scan decides disjointness.
fn disjoint(taxa1: &[usize], taxa2: &[usize]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < taxa1.len() && j < taxa2.len() {
        match taxa1[i].cmp(&taxa2[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::VariableRegistry;
    use crate::encodings::{EncodingOptions, NetworkEncoder};
    use crate::io::NewickReader;
    use crate::trees::PhylogeneticTree;

    fn read_trees(newick: &str) -> Vec<PhylogeneticTree> {
        NewickReader::default()
            .read(&mut newick.as_bytes())
            .unwrap()
            .1
    }

    #[test]
    fn test_disjoint() {
        assert!(disjoint(&[0, 2], &[1, 3]));
        assert!(!disjoint(&[0, 2], &[2, 3]));
        assert!(disjoint(&[], &[1]));
    }

    #[test]
    fn test_equal_clades_share_their_realization() {
        // the cherry (a,b) appears in both trees; their mapping variables
        // must be pairwise linked in both directions
        let trees = read_trees("((a,b),c);((a,b),c);");
        let formula = NetworkEncoder::new(
            &trees,
            EncodingOptions::default(),
            VariableRegistry::default(),
        )
        .unwrap()
        .encode();
        let registry = formula.registry();
        for node in 3..5 {
            let x1 = registry.lookup(VarKey::mapping(0, 3, node));
            let x2 = registry.lookup(VarKey::mapping(1, 3, node));
            let forward = format!("-{} {} 0", x1, x2);
            let backward = format!("-{} {} 0", x2, x1);
            assert!(formula.dimacs().lines().any(|l| l == forward));
            assert!(formula.dimacs().lines().any(|l| l == backward));
        }
    }

    #[test]
    fn test_disjoint_clades_can_be_skipped() {
        let trees = read_trees("((a,b),(c,d));((c,d),(a,b));");
        let encode = |disjoint_clade_constraints| {
            NetworkEncoder::new(
                &trees,
                EncodingOptions {
                    disjoint_clade_constraints,
                    ..Default::default()
                },
                VariableRegistry::default(),
            )
            .unwrap()
            .encode()
            .n_clauses()
        };
        assert!(encode(true) > encode(false));
    }

    #[test]
    fn test_pair_summary_comment() {
        let trees = read_trees("((a,b),c);(a,(b,c));");
        let formula = NetworkEncoder::new(
            &trees,
            EncodingOptions::default(),
            VariableRegistry::default(),
        )
        .unwrap()
        .encode();
        assert!(formula
            .dimacs()
            .lines()
            .any(|l| l.starts_with("c trees 0 and 1:")));
    }
}
