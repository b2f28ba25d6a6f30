//! The tree-independent constraints shaping the candidate networks: every
//! node slot gets exactly one parent, every internal slot exactly one child
//! per child slot, and the slot variables of a child and of its parent agree.

use super::network_encoder::EncodingSession;
use crate::cnf::{clause, VarKey};

pub(crate) fn encode(session: &mut EncodingSession) {
    encode_parent_constraints(session);
    encode_child_slot_constraints(session);
    encode_reticulation_child_constraints(session);
    encode_reticulation_parent_constraints(session);
    encode_child_parent_agreement(session);
}

/// Every non-root node has exactly one parent among its candidates.
fn encode_parent_constraints(session: &mut EncodingSession) {
    let topology = session.topology;
    let first_id = session.next_var_id();
    for node in 0..topology.tree_node_count() - 1 {
        for parent in topology.possible_parents(node) {
            session.declare(VarKey::parent(node, parent));
        }
    }
    session.comment(&format!(
        "variables parent(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));

    session.comment("at-least-one constraints for parent(v, u)");
    for node in 0..topology.tree_node_count() - 1 {
        let at_least_one = topology
            .possible_parents(node)
            .into_iter()
            .map(|parent| session.pos(VarKey::parent(node, parent)))
            .collect();
        session.clause(at_least_one);
    }

    session.comment("at-most-one constraints for parent(v, u)");
    for node in 0..topology.tree_node_count() - 1 {
        let parents = topology.possible_parents(node);
        for (i, parent) in parents.iter().enumerate() {
            for other_parent in &parents[i + 1..] {
                session.clause(clause![
                    session.neg(VarKey::parent(node, *parent)),
                    session.neg(VarKey::parent(node, *other_parent)),
                ]);
            }
        }
    }
}

/// Every tree node has exactly one left child and exactly one right child.
fn encode_child_slot_constraints(session: &mut EncodingSession) {
    let topology = session.topology;
    let mut first_id = session.next_var_id();
    for node in topology.tree_nodes() {
        for child in topology.possible_children(node) {
            session.declare(VarKey::left(node, child));
        }
    }
    session.comment(&format!(
        "variables left(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));
    first_id = session.next_var_id();
    for node in topology.tree_nodes() {
        for child in topology.possible_children(node) {
            session.declare(VarKey::right(node, child));
        }
    }
    session.comment(&format!(
        "variables right(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));

    session.comment("at-least-one constraints for left(v, u) and right(v, u)");
    for node in topology.tree_nodes() {
        let children = topology.possible_children(node);
        let at_least_one_left = children
            .iter()
            .map(|child| session.pos(VarKey::left(node, *child)))
            .collect();
        session.clause(at_least_one_left);
        let at_least_one_right = children
            .iter()
            .map(|child| session.pos(VarKey::right(node, *child)))
            .collect();
        session.clause(at_least_one_right);
    }

    session.comment("at-most-one constraints for left(v, u) and right(v, u)");
    for node in topology.tree_nodes() {
        let children = topology.possible_children(node);
        for (i, child) in children.iter().enumerate() {
            for other_child in &children[i + 1..] {
                session.clause(clause![
                    session.neg(VarKey::left(node, *child)),
                    session.neg(VarKey::left(node, *other_child)),
                ]);
                session.clause(clause![
                    session.neg(VarKey::right(node, *child)),
                    session.neg(VarKey::right(node, *other_child)),
                ]);
            }
        }
    }

    if session.options().strict_slot_ordering {
        session.comment("ordering constraints: the left child gets the lower slot id");
        for node in topology.tree_nodes() {
            let children = topology.possible_children(node);
            for child in &children {
                for other_child in &children {
                    if child <= other_child {
                        session.clause(clause![
                            session.neg(VarKey::right(node, *child)),
                            session.neg(VarKey::left(node, *other_child)),
                        ]);
                    }
                }
            }
        }
    }
}

/// Every reticulation node designates exactly one child.
fn encode_reticulation_child_constraints(session: &mut EncodingSession) {
    let topology = session.topology;
    let first_id = session.next_var_id();
    for node in topology.reticulation_nodes() {
        for child in topology.possible_children(node) {
            session.declare(VarKey::ret_child(node, child));
        }
    }
    session.comment(&format!(
        "variables ch(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));

    session.comment("at-least-one constraints for ch(v, u)");
    for node in topology.reticulation_nodes() {
        let at_least_one = topology
            .possible_children(node)
            .into_iter()
            .map(|child| session.pos(VarKey::ret_child(node, child)))
            .collect();
        session.clause(at_least_one);
    }

    session.comment("at-most-one constraints for ch(v, u)");
    for node in topology.reticulation_nodes() {
        let children = topology.possible_children(node);
        for (i, child) in children.iter().enumerate() {
            for other_child in &children[i + 1..] {
                session.clause(clause![
                    session.neg(VarKey::ret_child(node, *child)),
                    session.neg(VarKey::ret_child(node, *other_child)),
                ]);
            }
        }
    }
}

/// Every reticulation node takes exactly one left parent edge and exactly one
/// right parent edge.
fn encode_reticulation_parent_constraints(session: &mut EncodingSession) {
    let topology = session.topology;
    let mut first_id = session.next_var_id();
    for node in topology.reticulation_nodes() {
        for parent in topology.possible_parents(node) {
            session.declare(VarKey::left_parent(node, parent));
        }
    }
    session.comment(&format!(
        "variables lp(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));
    first_id = session.next_var_id();
    for node in topology.reticulation_nodes() {
        for parent in topology.possible_parents(node) {
            session.declare(VarKey::right_parent(node, parent));
        }
    }
    session.comment(&format!(
        "variables rp(v, u) are in [{}, {}]",
        first_id,
        session.n_declared()
    ));

    session.comment("at-least-one constraints for lp(v, u) and rp(v, u)");
    for node in topology.reticulation_nodes() {
        let parents = topology.possible_parents(node);
        let at_least_one_left = parents
            .iter()
            .map(|parent| session.pos(VarKey::left_parent(node, *parent)))
            .collect();
        session.clause(at_least_one_left);
        let at_least_one_right = parents
            .iter()
            .map(|parent| session.pos(VarKey::right_parent(node, *parent)))
            .collect();
        session.clause(at_least_one_right);
    }

    session.comment("at-most-one constraints for lp(v, u) and rp(v, u)");
    for node in topology.reticulation_nodes() {
        let parents = topology.possible_parents(node);
        for (i, parent) in parents.iter().enumerate() {
            for other_parent in &parents[i + 1..] {
                session.clause(clause![
                    session.neg(VarKey::left_parent(node, *parent)),
                    session.neg(VarKey::left_parent(node, *other_parent)),
                ]);
                session.clause(clause![
                    session.neg(VarKey::right_parent(node, *parent)),
                    session.neg(VarKey::right_parent(node, *other_parent)),
                ]);
            }
        }
    }

    if session.options().strict_slot_ordering {
        session.comment("ordering constraints: the left parent gets the lower slot id");
        for node in topology.reticulation_nodes() {
            let parents = topology.possible_parents(node);
            for parent in &parents {
                for other_parent in &parents {
                    if parent <= other_parent {
                        session.clause(clause![
                            session.neg(VarKey::right_parent(node, *parent)),
                            session.neg(VarKey::left_parent(node, *other_parent)),
                        ]);
                    }
                }
            }
        }
    }
}

/// The child slot variables of a node and the parent variables of its
/// children must describe the same edges.
fn encode_child_parent_agreement(session: &mut EncodingSession) {
    let topology = session.topology;
    session.comment("channeling between tree node slots and the children's parent variables");
    for node in topology.tree_nodes() {
        for child in topology.possible_children(node) {
            let left = session.pos(VarKey::left(node, child));
            let right = session.pos(VarKey::right(node, child));
            if topology.is_tree_node(child) {
                let parent = session.pos(VarKey::parent(child, node));
                session.clause(clause![left.negate(), parent]);
                session.clause(clause![right.negate(), parent]);
                session.clause(clause![parent.negate(), left, right]);
            } else {
                let left_parent = session.pos(VarKey::left_parent(child, node));
                let right_parent = session.pos(VarKey::right_parent(child, node));
                session.clause(clause![left.negate(), left_parent, right_parent]);
                session.clause(clause![right.negate(), left_parent, right_parent]);
                session.clause(clause![left_parent.negate(), left, right]);
                session.clause(clause![right_parent.negate(), left, right]);
            }
        }
    }

    session.comment("channeling between reticulation children and the children's parent variables");
    for node in topology.reticulation_nodes() {
        for child in topology.possible_children(node) {
            let designated = session.pos(VarKey::ret_child(node, child));
            if topology.is_tree_node(child) {
                let parent = session.pos(VarKey::parent(child, node));
                session.clause(clause![designated.negate(), parent]);
                session.clause(clause![parent.negate(), designated]);
            } else {
                let left_parent = session.pos(VarKey::left_parent(child, node));
                let right_parent = session.pos(VarKey::right_parent(child, node));
                session.clause(clause![left_parent.negate(), designated]);
                session.clause(clause![right_parent.negate(), designated]);
                session.clause(clause![designated.negate(), left_parent, right_parent]);
            }
        }
    }

    session.comment("ordering between a reticulation's child and its parents");
    for node in topology.reticulation_nodes() {
        for child in topology.possible_children(node) {
            if topology.is_tree_node(child) {
                let designated = session.pos(VarKey::ret_child(node, child));
                for parent in topology.n_taxa()..=child {
                    session.clause(clause![
                        designated.negate(),
                        session.neg(VarKey::left_parent(node, parent)),
                    ]);
                    session.clause(clause![
                        designated.negate(),
                        session.neg(VarKey::right_parent(node, parent)),
                    ]);
                }
            }
        }
    }
}
