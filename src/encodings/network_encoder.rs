use super::{
    cross_tree_constraints_encoder, structural_constraints_encoder, tree_consistency_encoder,
    NetworkTopology,
};
use crate::{
    cnf::{FormulaBuffer, Literal, VarKey, Variable, VariableRegistry},
    trees::PhylogeneticTree,
};
use anyhow::{anyhow, Result};
use log::debug;

/// The construction parameters of an encoding.
#[derive(Clone, Copy, Debug)]
pub struct EncodingOptions {
    /// The reticulation budget `k`: the number of hybridization nodes the
    /// candidate networks may contain.
    pub hybridization_number: usize,
    /// Permits reticulation-to-reticulation edges, enabling more complex
    /// networks at a higher variable and clause cost.
    pub reticulation_connection: bool,
    /// Suppresses the human-readable comment lines, reducing the output
    /// size with no semantic change.
    pub disable_comments: bool,
    /// Emits the strict `left < right` (and `lp < rp`) slot ordering
    /// clauses, halving the slot-swap-symmetric solution space.
    pub strict_slot_ordering: bool,
    /// Emits the cross-tree exclusion clauses for clades with disjoint
    /// taxon sets.
    pub disjoint_clade_constraints: bool,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            hybridization_number: 0,
            reticulation_connection: false,
            disable_comments: false,
            strict_slot_ordering: false,
            disjoint_clade_constraints: true,
        }
    }
}

/// The result of an encoding: the DIMACS document and the variable table
/// needed to interpret a SAT solver's model of it.
pub struct EncodedFormula {
    dimacs: String,
    registry: VariableRegistry,
    n_variables: usize,
    n_clauses: usize,
}

impl EncodedFormula {
    /// Returns the DIMACS CNF text.
    pub fn dimacs(&self) -> &str {
        &self.dimacs
    }

    /// Consumes the formula, returning the DIMACS CNF text.
    pub fn into_dimacs(self) -> String {
        self.dimacs
    }

    /// Returns the registry mapping variable keys to the ids used in the
    /// document.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Returns the number of variables declared by the encoding.
    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    /// Returns the number of clauses of the document.
    pub fn n_clauses(&self) -> usize {
        self.n_clauses
    }
}

/// The encoder translating a "does a network with at most `k` reticulations
/// embed all the input trees?" question into a CNF formula.
///
/// The encoder owns all the encoding state (variable registry and clause
/// buffer) for the lifetime of one encoding session; [`encode`](Self::encode)
/// consumes it, so a session can never be reused or finalized twice.
///
/// # Example
///
/// ```
/// # use phylocnf::encodings::{EncodingOptions, NetworkEncoder};
/// # use phylocnf::cnf::VariableRegistry;
/// # use phylocnf::io::NewickReader;
/// let mut input = "((a,b),c);(a,(b,c));".as_bytes();
/// let (_, trees) = NewickReader::default().read(&mut input).unwrap();
/// let encoder = NetworkEncoder::new(
///     &trees,
///     EncodingOptions { hybridization_number: 1, ..Default::default() },
///     VariableRegistry::default(),
/// ).unwrap();
/// let formula = encoder.encode();
/// assert!(formula.dimacs().starts_with("p cnf "));
/// ```
pub struct NetworkEncoder<'a> {
    session: EncodingSession<'a>,
}

impl<'a> NetworkEncoder<'a> {
    /// Builds a new encoder for the given trees and parameters.
    ///
    /// The caller provides the variable registry the encoding will fill; it
    /// must be empty. An error is returned if it is not, if no tree is
    /// given, or if the trees do not share the same taxon count.
    pub fn new(
        trees: &'a [PhylogeneticTree],
        options: EncodingOptions,
        registry: VariableRegistry,
    ) -> Result<Self> {
        if trees.is_empty() {
            return Err(anyhow!("cannot encode an empty collection of trees"));
        }
        if !registry.is_empty() {
            return Err(anyhow!("the provided variable registry is not empty"));
        }
        let n_taxa = trees[0].n_taxa();
        if let Some(t) = trees.iter().position(|t| t.n_taxa() != n_taxa) {
            return Err(anyhow!(
                "tree with index {} has {} taxa while the first tree has {}",
                t,
                trees[t].n_taxa(),
                n_taxa
            ));
        }
        let topology = NetworkTopology::new(
            n_taxa,
            options.hybridization_number,
            options.reticulation_connection,
        );
        let buffer = FormulaBuffer::new(!options.disable_comments);
        Ok(Self {
            session: EncodingSession {
                topology,
                trees,
                options,
                registry,
                buffer,
            },
        })
    }

    /// Runs the whole encoding and finalizes the CNF document.
    ///
    /// The structural constraints are emitted once, the consistency
    /// constraints once per input tree, and the cross-tree constraints once
    /// per tree pair; the header is computed last, once the variable and
    /// clause totals are known.
    pub fn encode(mut self) -> EncodedFormula {
        let session = &mut self.session;
        session.comment(&format!(
            "n = {}; k = {}; trees count = {}",
            session.topology.n_taxa(),
            session.topology.n_reticulations(),
            session.trees.len()
        ));
        structural_constraints_encoder::encode(session);
        debug!(
            "structural constraints encoded ({} clauses so far)",
            session.buffer.n_clauses()
        );
        for tree_index in 0..session.trees.len() {
            tree_consistency_encoder::encode_for_tree(session, tree_index);
            debug!(
                "consistency constraints encoded for tree {} ({} clauses so far)",
                tree_index,
                session.buffer.n_clauses()
            );
        }
        for tree_index in 0..session.trees.len() {
            for other_tree in 0..session.trees.len() {
                if tree_index != other_tree {
                    cross_tree_constraints_encoder::encode_for_pair(
                        session, tree_index, other_tree,
                    );
                }
            }
        }
        debug!(
            "cross-tree constraints encoded ({} clauses in total)",
            session.buffer.n_clauses()
        );
        let n_variables = session.registry.len();
        let n_clauses = session.buffer.n_clauses();
        let EncodingSession {
            registry, buffer, ..
        } = self.session;
        EncodedFormula {
            dimacs: buffer.into_dimacs(n_variables),
            registry,
            n_variables,
            n_clauses,
        }
    }
}

/// The state shared by the encoder stages: the topology model, the input
/// trees, and the registry/buffer pair every stage appends to.
pub(crate) struct EncodingSession<'a> {
    pub(crate) topology: NetworkTopology,
    trees: &'a [PhylogeneticTree],
    options: EncodingOptions,
    registry: VariableRegistry,
    buffer: FormulaBuffer,
}

impl<'a> EncodingSession<'a> {
    #[cfg(test)]
    pub(crate) fn new_for_tests(
        topology: NetworkTopology,
        trees: &'a [PhylogeneticTree],
        options: EncodingOptions,
    ) -> Self {
        Self {
            topology,
            trees,
            options,
            registry: VariableRegistry::default(),
            buffer: FormulaBuffer::new(!options.disable_comments),
        }
    }

    pub(crate) fn options(&self) -> EncodingOptions {
        self.options
    }

    pub(crate) fn tree(&self, tree_index: usize) -> &'a PhylogeneticTree {
        &self.trees[tree_index]
    }

    pub(crate) fn declare(&mut self, key: VarKey) -> Variable {
        self.registry.declare(key)
    }

    /// The id the next declared variable will get; used to report the id
    /// interval of each variable kind in the comments.
    pub(crate) fn next_var_id(&self) -> usize {
        self.registry.len() + 1
    }

    pub(crate) fn n_declared(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn pos(&self, key: VarKey) -> Literal {
        self.registry.lookup(key).positive()
    }

    pub(crate) fn neg(&self, key: VarKey) -> Literal {
        self.registry.lookup(key).negative()
    }

    pub(crate) fn clause(&mut self, literals: Vec<Literal>) {
        self.buffer.add_clause(literals);
    }

    pub(crate) fn comment(&mut self, text: &str) {
        self.buffer.comment(text);
    }

    #[cfg(test)]
    pub(crate) fn into_dimacs_for_tests(self) -> String {
        let n_variables = self.registry.len();
        self.buffer.into_dimacs(n_variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NewickReader;

    fn read_trees(newick: &str) -> Vec<PhylogeneticTree> {
        NewickReader::default()
            .read(&mut newick.as_bytes())
            .unwrap()
            .1
    }

    fn encode_str(newick: &str, options: EncodingOptions) -> EncodedFormula {
        let trees = read_trees(newick);
        NetworkEncoder::new(&trees, options, VariableRegistry::default())
            .unwrap()
            .encode()
    }

    #[test]
    fn test_rejects_non_empty_registry() {
        let trees = read_trees("((a,b),c);");
        let mut registry = VariableRegistry::default();
        registry.declare(VarKey::parent(0, 3));
        assert!(
            NetworkEncoder::new(&trees, EncodingOptions::default(), registry).is_err()
        );
    }

    #[test]
    fn test_rejects_empty_tree_list() {
        assert!(NetworkEncoder::new(
            &[],
            EncodingOptions::default(),
            VariableRegistry::default()
        )
        .is_err());
    }

    #[test]
    fn test_rejects_inconsistent_taxon_counts() {
        let mut trees = read_trees("((a,b),c);");
        trees.append(&mut read_trees("(a,b);"));
        assert!(NetworkEncoder::new(
            &trees,
            EncodingOptions::default(),
            VariableRegistry::default()
        )
        .is_err());
    }

    #[test]
    fn test_header_matches_totals() {
        let formula = encode_str("((a,b),c);(a,(b,c));", EncodingOptions::default());
        let header = formula.dimacs().lines().next().unwrap().to_string();
        assert_eq!(
            format!("p cnf {} {}", formula.n_variables(), formula.n_clauses()),
            header
        );
        let body_clauses = formula
            .dimacs()
            .lines()
            .skip(1)
            .filter(|l| !l.starts_with("c "))
            .count();
        assert_eq!(formula.n_clauses(), body_clauses);
    }

    #[test]
    fn test_all_literals_within_header_bound() {
        let formula = encode_str(
            "((a,b),c);(a,(b,c));",
            EncodingOptions {
                hybridization_number: 1,
                ..Default::default()
            },
        );
        let max_var = formula
            .dimacs()
            .lines()
            .skip(1)
            .filter(|l| !l.starts_with("c "))
            .flat_map(|l| l.split_ascii_whitespace())
            .map(|w| w.parse::<isize>().unwrap().unsigned_abs())
            .max()
            .unwrap();
        assert_eq!(formula.n_variables(), max_var);
    }

    #[test]
    fn test_determinism() {
        let options = EncodingOptions {
            hybridization_number: 2,
            ..Default::default()
        };
        let first = encode_str("((a,b),(c,d));((a,c),(b,d));", options);
        let second = encode_str("((a,b),(c,d));((a,c),(b,d));", options);
        assert_eq!(first.dimacs(), second.dimacs());
    }

    #[test]
    fn test_root_fixation_unit_clauses() {
        let trees = read_trees("((a,b),c);(a,(b,c));");
        let formula = NetworkEncoder::new(
            &trees,
            EncodingOptions::default(),
            VariableRegistry::default(),
        )
        .unwrap()
        .encode();
        // both input tree roots (node 4) must map to the network root (4)
        for tree_index in 0..2 {
            let root_var = formula.registry().lookup(VarKey::mapping(tree_index, 4, 4));
            let unit = format!("{} 0", root_var);
            assert!(formula.dimacs().lines().any(|l| l == unit));
        }
    }

    #[test]
    fn test_no_reticulation_variables_when_k_is_zero() {
        let formula = encode_str("((a,b),c);", EncodingOptions::default());
        assert!(formula.registry().iter().all(|(k, _)| !matches!(
            k,
            VarKey::ReticulationChild { .. }
                | VarKey::LeftParent { .. }
                | VarKey::RightParent { .. }
                | VarKey::Direction { .. }
                | VarKey::ReticulationUsed { .. }
        )));
    }

    #[test]
    fn test_comments_can_be_disabled() {
        let formula = encode_str(
            "((a,b),c);",
            EncodingOptions {
                disable_comments: true,
                ..Default::default()
            },
        );
        assert!(formula.dimacs().lines().all(|l| !l.starts_with('c')));
    }

    #[test]
    fn test_encode_with_reticulation_connections() {
        let formula = encode_str(
            "((a,b),c);",
            EncodingOptions {
                hybridization_number: 2,
                reticulation_connection: true,
                ..Default::default()
            },
        );
        let header = formula.dimacs().lines().next().unwrap().to_string();
        assert_eq!(
            format!("p cnf {} {}", formula.n_variables(), formula.n_clauses()),
            header
        );
        // the network root (6 here) never takes a reticulation parent slot
        assert!(formula
            .registry()
            .iter()
            .all(|(k, _)| !matches!(k, VarKey::Parent { node: 6, .. })));
    }

    #[test]
    fn test_reticulation_used_variables_only_with_connections() {
        let with = encode_str(
            "((a,b),c);",
            EncodingOptions {
                hybridization_number: 1,
                reticulation_connection: true,
                ..Default::default()
            },
        );
        assert!(with
            .registry()
            .iter()
            .any(|(k, _)| matches!(k, VarKey::ReticulationUsed { .. })));
        let without = encode_str(
            "((a,b),c);",
            EncodingOptions {
                hybridization_number: 1,
                ..Default::default()
            },
        );
        assert!(without
            .registry()
            .iter()
            .all(|(k, _)| !matches!(k, VarKey::ReticulationUsed { .. })));
    }
}
