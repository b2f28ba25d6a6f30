use super::Variable;
use std::collections::HashMap;

/// A structured key denoting one boolean proposition about the network under
/// construction.
///
/// Each variant corresponds to one variable role of the encoding; the role
/// parameters are network node slots, input tree indices and input tree node
/// ids. Two keys are equal if and only if they denote the same proposition,
/// so roles with equal-looking parameter lists can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// Network node `node` has `parent` as its single parent.
    Parent {
        /// The child node.
        node: usize,
        /// The candidate parent node.
        parent: usize,
    },
    /// Tree node `node` has `child` in its left child slot.
    Left {
        /// The parent tree node.
        node: usize,
        /// The candidate child node.
        child: usize,
    },
    /// Tree node `node` has `child` in its right child slot.
    Right {
        /// The parent tree node.
        node: usize,
        /// The candidate child node.
        child: usize,
    },
    /// Reticulation node `node` has `child` as its designated child.
    ReticulationChild {
        /// The reticulation node.
        node: usize,
        /// The candidate child node.
        child: usize,
    },
    /// Reticulation node `node` has `parent` as its left incoming edge.
    LeftParent {
        /// The reticulation node.
        node: usize,
        /// The candidate parent node.
        parent: usize,
    },
    /// Reticulation node `node` has `parent` as its right incoming edge.
    RightParent {
        /// The reticulation node.
        node: usize,
        /// The candidate parent node.
        parent: usize,
    },
    /// For input tree `tree`, reticulation `node` takes its left parent edge.
    Direction {
        /// The input tree index.
        tree: usize,
        /// The reticulation node.
        node: usize,
    },
    /// For input tree `tree`, network node `node` carries mapped content.
    Used {
        /// The input tree index.
        tree: usize,
        /// The network tree node.
        node: usize,
    },
    /// For input tree `tree`, the content below reticulation `node` is
    /// realized somewhere downstream.
    ReticulationUsed {
        /// The input tree index.
        tree: usize,
        /// The reticulation node.
        node: usize,
    },
    /// For input tree `tree`, the nearest used ancestor of `node` is
    /// `ancestor`.
    Up {
        /// The input tree index.
        tree: usize,
        /// The network node.
        node: usize,
        /// The candidate nearest used ancestor (a tree node).
        ancestor: usize,
    },
    /// Input tree node `tree_node` of tree `tree` is realized by network
    /// node `node`.
    Mapping {
        /// The input tree index.
        tree: usize,
        /// The input tree internal node.
        tree_node: usize,
        /// The network tree node realizing it.
        node: usize,
    },
}

impl VarKey {
    /// Builds a [`VarKey::Parent`] key.
    pub fn parent(node: usize, parent: usize) -> Self {
        VarKey::Parent { node, parent }
    }

    /// Builds a [`VarKey::Left`] key.
    pub fn left(node: usize, child: usize) -> Self {
        VarKey::Left { node, child }
    }

    /// Builds a [`VarKey::Right`] key.
    pub fn right(node: usize, child: usize) -> Self {
        VarKey::Right { node, child }
    }

    /// Builds a [`VarKey::ReticulationChild`] key.
    pub fn ret_child(node: usize, child: usize) -> Self {
        VarKey::ReticulationChild { node, child }
    }

    /// Builds a [`VarKey::LeftParent`] key.
    pub fn left_parent(node: usize, parent: usize) -> Self {
        VarKey::LeftParent { node, parent }
    }

    /// Builds a [`VarKey::RightParent`] key.
    pub fn right_parent(node: usize, parent: usize) -> Self {
        VarKey::RightParent { node, parent }
    }

    /// Builds a [`VarKey::Direction`] key.
    pub fn direction(tree: usize, node: usize) -> Self {
        VarKey::Direction { tree, node }
    }

    /// Builds a [`VarKey::Used`] key.
    pub fn used(tree: usize, node: usize) -> Self {
        VarKey::Used { tree, node }
    }

    /// Builds a [`VarKey::ReticulationUsed`] key.
    pub fn ret_used(tree: usize, node: usize) -> Self {
        VarKey::ReticulationUsed { tree, node }
    }

    /// Builds a [`VarKey::Up`] key.
    pub fn up(tree: usize, node: usize, ancestor: usize) -> Self {
        VarKey::Up {
            tree,
            node,
            ancestor,
        }
    }

    /// Builds a [`VarKey::Mapping`] key.
    pub fn mapping(tree: usize, tree_node: usize, node: usize) -> Self {
        VarKey::Mapping {
            tree,
            tree_node,
            node,
        }
    }
}

/// A deterministic symbol table mapping [`VarKey`]s to variable ids.
///
/// Ids are positive integers assigned in first-declaration order, starting
/// at 1 and strictly increasing. Ids are stable for the whole registry
/// lifetime: there is no deletion and no renumbering.
///
/// The registry enforces a create-once/read-many discipline: a key must be
/// declared exactly once with [`declare`](Self::declare) and only read
/// afterwards with [`lookup`](Self::lookup). Violating this discipline is a
/// bug in the encoder, not a data problem, so both methods panic instead of
/// returning an error.
#[derive(Default)]
pub struct VariableRegistry {
    ids: HashMap<VarKey, Variable>,
}

impl VariableRegistry {
    /// Declares a new key, assigning it the next unused variable id.
    ///
    /// # Panics
    ///
    /// Panics if the key has already been declared.
    pub fn declare(&mut self, key: VarKey) -> Variable {
        let next = Variable::from(self.ids.len() + 1);
        if self.ids.insert(key, next).is_some() {
            panic!("variable key declared twice: {:?}", key);
        }
        next
    }

    /// Returns the variable id of an already-declared key.
    ///
    /// # Panics
    ///
    /// Panics if the key has not been declared.
    pub fn lookup(&self, key: VarKey) -> Variable {
        match self.ids.get(&key) {
            Some(v) => *v,
            None => panic!("lookup of an undeclared variable key: {:?}", key),
        }
    }

    /// Returns the number of declared variables.
    ///
    /// Since ids are assigned sequentially from 1, this is also the highest
    /// id declared so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if and only if no variable has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns an iterator over the declared keys and their ids.
    ///
    /// The iteration order is unspecified; callers needing the declaration
    /// order must sort on the returned ids.
    pub fn iter(&self) -> impl Iterator<Item = (&VarKey, Variable)> + '_ {
        self.ids.iter().map(|(k, v)| (k, *v))
    }
}
