//! The constraints making one input tree displayable by the network: each
//! reticulation picks a direction, the used part of the network forms a
//! binary tree, and the input tree's internal nodes map onto it.

use super::network_encoder::EncodingSession;
use crate::cnf::{clause, VarKey};

pub(crate) fn encode_for_tree(session: &mut EncodingSession, tree: usize) {
    encode_direction_and_used(session, tree);
    if session.options().reticulation_connection {
        encode_reticulation_used(session, tree);
    }
    encode_nearest_used_ancestor(session, tree);
    encode_mapping(session, tree);
    encode_tree_structure(session, tree);
}

/// A reticulation parent edge not matching the chosen direction cannot lead
/// to a used tree node.
fn encode_direction_and_used(session: &mut EncodingSession, tree: usize) {
    let topology = session.topology;
    let mut first_id = session.next_var_id();
    for node in topology.reticulation_nodes() {
        session.declare(VarKey::direction(tree, node));
    }
    session.comment(&format!(
        "variables dir({}, v) are in [{}, {}]",
        tree,
        first_id,
        session.n_declared()
    ));
    first_id = session.next_var_id();
    for node in topology.tree_nodes() {
        session.declare(VarKey::used(tree, node));
    }
    session.comment(&format!(
        "variables used({}, v) are in [{}, {}]",
        tree,
        first_id,
        session.n_declared()
    ));

    session.comment("a reticulation edge against the chosen direction cannot reach a used node");
    for node in topology.reticulation_nodes() {
        for parent in topology.possible_parents(node) {
            if topology.is_tree_node(parent) {
                let direction = session.pos(VarKey::direction(tree, node));
                let used = session.neg(VarKey::used(tree, parent));
                session.clause(clause![
                    direction,
                    session.neg(VarKey::left_parent(node, parent)),
                    used,
                ]);
                session.clause(clause![
                    direction.negate(),
                    session.neg(VarKey::right_parent(node, parent)),
                    used,
                ]);
            }
        }
    }
}

/// With reticulation connections enabled, a reticulation is "used" when its
/// designated subtree is realized; propagation goes through reticulation
/// chains following the chosen directions.
fn encode_reticulation_used(session: &mut EncodingSession, tree: usize) {
    let topology = session.topology;
    let first_id = session.next_var_id();
    for node in topology.reticulation_nodes() {
        session.declare(VarKey::ret_used(tree, node));
    }
    session.comment(&format!(
        "variables rused({}, v) are in [{}, {}]",
        tree,
        first_id,
        session.n_declared()
    ));

    session.comment("propagation of rused(t, v) along reticulation chains");
    for node in topology.reticulation_nodes() {
        let ret_used = session.pos(VarKey::ret_used(tree, node));
        for child in topology.possible_children(node) {
            let designated = session.pos(VarKey::ret_child(node, child));
            if topology.is_tree_node(child) {
                session.clause(clause![designated.negate(), ret_used]);
            } else {
                let child_ret_used = session.pos(VarKey::ret_used(tree, child));
                let child_direction = session.pos(VarKey::direction(tree, child));
                let left_parent = session.pos(VarKey::left_parent(child, node));
                let right_parent = session.pos(VarKey::right_parent(child, node));
                session.clause(clause![
                    designated.negate(),
                    child_ret_used,
                    ret_used.negate(),
                ]);
                session.clause(clause![
                    left_parent.negate(),
                    child_direction,
                    ret_used.negate(),
                ]);
                session.clause(clause![
                    left_parent.negate(),
                    child_direction.negate(),
                    child_ret_used.negate(),
                    ret_used,
                ]);
                session.clause(clause![
                    right_parent.negate(),
                    child_direction.negate(),
                    ret_used.negate(),
                ]);
                session.clause(clause![
                    right_parent.negate(),
                    child_direction,
                    child_ret_used.negate(),
                    ret_used,
                ]);
            }
        }
    }

    session.comment("a tree node feeding an unrealized reticulation is unused");
    for node in topology.reticulation_nodes() {
        let ret_used = session.pos(VarKey::ret_used(tree, node));
        for parent in topology.possible_parents(node) {
            if topology.is_tree_node(parent) {
                let used = session.neg(VarKey::used(tree, parent));
                session.clause(clause![
                    session.neg(VarKey::left_parent(node, parent)),
                    ret_used,
                    used,
                ]);
                session.clause(clause![
                    session.neg(VarKey::right_parent(node, parent)),
                    ret_used,
                    used,
                ]);
            }
        }
    }
}

/// Every non-root node has exactly one nearest used ancestor, obtained by
/// following parent edges upwards and skipping unused nodes.
fn encode_nearest_used_ancestor(session: &mut EncodingSession, tree: usize) {
    let topology = session.topology;
    let first_id = session.next_var_id();
    for node in topology.all_nodes() {
        for ancestor in topology.possible_up(node) {
            session.declare(VarKey::up(tree, node, ancestor));
        }
    }
    session.comment(&format!(
        "variables up({}, v, u) are in [{}, {}]",
        tree,
        first_id,
        session.n_declared()
    ));

    session.comment(&format!("at-least-one constraints for up({}, v, u)", tree));
    for node in topology.all_nodes() {
        if node != topology.root() {
            let at_least_one = topology
                .possible_up(node)
                .into_iter()
                .map(|ancestor| session.pos(VarKey::up(tree, node, ancestor)))
                .collect();
            session.clause(at_least_one);
        }
    }

    session.comment(&format!("at-most-one constraints for up({}, v, u)", tree));
    for node in topology.all_nodes() {
        let ancestors = topology.possible_up(node);
        for (i, ancestor) in ancestors.iter().enumerate() {
            for other_ancestor in &ancestors[i + 1..] {
                session.clause(clause![
                    session.neg(VarKey::up(tree, node, *ancestor)),
                    session.neg(VarKey::up(tree, node, *other_ancestor)),
                ]);
            }
        }
    }

    session.comment(&format!(
        "channeling up({}, v, u) with the parent and used variables (tree node parents)",
        tree
    ));
    for node in 0..topology.tree_node_count() {
        for parent in topology.possible_parents(node) {
            let parent_edge = session.pos(VarKey::parent(node, parent));
            if topology.is_tree_node(parent) {
                let up = session.pos(VarKey::up(tree, node, parent));
                let used = session.pos(VarKey::used(tree, parent));
                session.clause(clause![parent_edge.negate(), used.negate(), up]);
                session.clause(clause![parent_edge.negate(), up.negate(), used]);
                // an unused parent passes its own nearest used ancestor down
                for transitive in topology.possible_up(parent) {
                    let node_up = session.pos(VarKey::up(tree, node, transitive));
                    let parent_up = session.pos(VarKey::up(tree, parent, transitive));
                    session.clause(clause![
                        parent_edge.negate(),
                        used,
                        parent_up.negate(),
                        node_up,
                    ]);
                    session.clause(clause![
                        parent_edge.negate(),
                        used,
                        node_up.negate(),
                        parent_up,
                    ]);
                }
            } else {
                for transitive in topology.possible_up(parent) {
                    let parent_up = session.pos(VarKey::up(tree, parent, transitive));
                    if transitive <= node {
                        session.clause(clause![parent_edge.negate(), parent_up.negate()]);
                    } else {
                        session.clause(clause![
                            parent_edge.negate(),
                            parent_up.negate(),
                            session.pos(VarKey::up(tree, node, transitive)),
                        ]);
                    }
                }
            }
        }
    }

    session.comment(&format!(
        "channeling up({}, v, u) with the parent and used variables (reticulations)",
        tree
    ));
    for node in topology.reticulation_nodes() {
        let direction = session.pos(VarKey::direction(tree, node));
        for parent in topology.possible_parents(node) {
            let left_parent = session.pos(VarKey::left_parent(node, parent));
            let right_parent = session.pos(VarKey::right_parent(node, parent));
            if topology.is_tree_node(parent) {
                let parent_used = session.pos(VarKey::used(tree, parent));
                let up = session.pos(VarKey::up(tree, node, parent));
                session.clause(clause![
                    left_parent.negate(),
                    direction.negate(),
                    parent_used.negate(),
                    up,
                ]);
                session.clause(clause![
                    right_parent.negate(),
                    direction,
                    parent_used.negate(),
                    up,
                ]);
                for transitive in topology.possible_up(parent) {
                    let parent_up = session.pos(VarKey::up(tree, parent, transitive));
                    let node_up = session.pos(VarKey::up(tree, node, transitive));
                    session.clause(clause![
                        left_parent.negate(),
                        direction.negate(),
                        parent_used,
                        parent_up.negate(),
                        node_up,
                    ]);
                    session.clause(clause![
                        right_parent.negate(),
                        direction,
                        parent_used,
                        parent_up.negate(),
                        node_up,
                    ]);
                }
            } else {
                for transitive in topology.possible_up(parent) {
                    let parent_up = session.pos(VarKey::up(tree, parent, transitive));
                    let node_up = session.pos(VarKey::up(tree, node, transitive));
                    session.clause(clause![
                        left_parent.negate(),
                        direction.negate(),
                        parent_up.negate(),
                        node_up,
                    ]);
                    session.clause(clause![
                        right_parent.negate(),
                        direction,
                        parent_up.negate(),
                        node_up,
                    ]);
                }
            }
        }
    }
}

/// Every internal node of the input tree is realized by exactly one network
/// tree node, injectively, and realizing nodes are used.
fn encode_mapping(session: &mut EncodingSession, tree: usize) {
    let topology = session.topology;
    let n_taxa = topology.n_taxa();
    let first_id = session.next_var_id();
    for tree_node in n_taxa..2 * n_taxa - 1 {
        for node in topology.tree_nodes() {
            session.declare(VarKey::mapping(tree, tree_node, node));
        }
    }
    session.comment(&format!(
        "variables x({}, tv, v) are in [{}, {}]",
        tree,
        first_id,
        session.n_declared()
    ));

    session.comment(&format!("at-least-one constraints for x({}, tv, v)", tree));
    for tree_node in n_taxa..2 * n_taxa - 1 {
        let at_least_one = topology
            .tree_nodes()
            .map(|node| session.pos(VarKey::mapping(tree, tree_node, node)))
            .collect();
        session.clause(at_least_one);
    }

    session.comment(&format!("at-most-one constraints for x({}, tv, v)", tree));
    for tree_node in n_taxa..2 * n_taxa - 1 {
        for node in topology.tree_nodes() {
            for other_node in node + 1..topology.tree_node_count() {
                session.clause(clause![
                    session.neg(VarKey::mapping(tree, tree_node, node)),
                    session.neg(VarKey::mapping(tree, tree_node, other_node)),
                ]);
            }
        }
    }

    session.comment("no two tree nodes are realized by the same network node");
    for tree_node in n_taxa..2 * n_taxa - 1 {
        for other_tree_node in n_taxa..tree_node {
            for node in topology.tree_nodes() {
                session.clause(clause![
                    session.neg(VarKey::mapping(tree, tree_node, node)),
                    session.neg(VarKey::mapping(tree, other_tree_node, node)),
                ]);
            }
        }
    }

    session.comment("a realizing network node is used");
    for tree_node in n_taxa..2 * n_taxa - 1 {
        for node in topology.tree_nodes() {
            session.clause(clause![
                session.neg(VarKey::mapping(tree, tree_node, node)),
                session.pos(VarKey::used(tree, node)),
            ]);
        }
    }
}

/// Ties the mapping to the input tree's edges: the realization of a node's
/// parent must be the nearest used ancestor of the node's realization. Also
/// prunes realizations incompatible with the node's depth or subtree size.
fn encode_tree_structure(session: &mut EncodingSession, tree: usize) {
    let topology = session.topology;
    let phylogeny = session.tree(tree);
    let n_taxa = topology.n_taxa();

    session.comment(&format!(
        "channeling the mapping of tree {} with the nearest-used-ancestor variables",
        tree
    ));
    for tree_node in 0..phylogeny.node_count() {
        let tree_parent = match phylogeny.parent(tree_node) {
            None => {
                // the input tree root is realized by the network root
                session.clause(clause![session.pos(VarKey::mapping(
                    tree,
                    tree_node,
                    topology.root()
                ))]);
                continue;
            }
            Some(p) => p,
        };
        if tree_node < n_taxa {
            for node in topology.tree_nodes() {
                session.clause(clause![
                    session.neg(VarKey::mapping(tree, tree_parent, node)),
                    session.pos(VarKey::up(tree, tree_node, node)),
                ]);
            }
        } else {
            for node in topology.tree_nodes() {
                let mapped = session.pos(VarKey::mapping(tree, tree_node, node));
                for ancestor in topology.possible_up(node) {
                    let parent_mapped =
                        session.pos(VarKey::mapping(tree, tree_parent, ancestor));
                    let up = session.pos(VarKey::up(tree, node, ancestor));
                    session.clause(clause![mapped.negate(), parent_mapped.negate(), up]);
                    session.clause(clause![mapped.negate(), up.negate(), parent_mapped]);
                }
                for ancestor in topology.tree_nodes() {
                    if ancestor < node {
                        session.clause(clause![
                            mapped.negate(),
                            session.neg(VarKey::mapping(tree, tree_parent, ancestor)),
                        ]);
                    }
                }
            }
        }
    }

    session.comment(&format!(
        "pruning from the depths and subtree sizes of tree {}",
        tree
    ));
    for tree_node in n_taxa..phylogeny.node_count() - 1 {
        let non_leaf_count = phylogeny.subtree_size(tree_node) / 2 - 1;
        for node in n_taxa..n_taxa + non_leaf_count {
            session.clause(clause![session.neg(VarKey::mapping(tree, tree_node, node))]);
        }
        for node in topology.tree_node_count() - phylogeny.depth(tree_node)
            ..topology.tree_node_count()
        {
            session.clause(clause![session.neg(VarKey::mapping(tree, tree_node, node))]);
        }
    }
}
