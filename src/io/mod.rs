//! Objects used to read the input tree files.

mod newick_reader;
pub use newick_reader::NewickReader;
pub use newick_reader::WarningHandler;
