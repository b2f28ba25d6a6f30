//! Phylocnf translates the minimal hybridization network problem into CNF.
//!
//! Given a collection of rooted binary phylogenetic trees over the same taxa
//! and a reticulation budget `k`, the [`NetworkEncoder`](encodings::NetworkEncoder)
//! produces a DIMACS CNF document which is satisfiable if and only if a
//! rooted phylogenetic network with at most `k` reticulation nodes embeds
//! every input tree. The document is meant to be fed to an external SAT
//! solver; this crate never solves anything itself.

#![warn(missing_docs)]

pub mod cnf;

pub mod encodings;

pub mod io;

pub mod trees;
