//! The CNF encodings of the minimal hybridization problem.

mod cross_tree_constraints_encoder;

mod network_encoder;
pub use network_encoder::EncodedFormula;
pub use network_encoder::EncodingOptions;
pub use network_encoder::NetworkEncoder;

mod network_topology;
pub use network_topology::NetworkTopology;

mod structural_constraints_encoder;

mod tree_consistency_encoder;
