//! The input data model: taxa and rooted binary phylogenetic trees.

mod phylogenetic_tree;
pub use phylogenetic_tree::PhylogeneticTree;

mod taxon_set;
pub use taxon_set::LabelType;
pub use taxon_set::Taxon;
pub use taxon_set::TaxonSet;
