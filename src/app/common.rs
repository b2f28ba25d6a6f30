use anyhow::{Context, Result};
use clap::Arg;
use log::{info, warn};
use phylocnf::{
    io::NewickReader,
    trees::{PhylogeneticTree, TaxonSet},
};
use std::{fs::File, io::BufReader, path::PathBuf};

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_arg() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains the trees, in Newick format")
        .required(true)
}

pub(crate) fn read_file_path(file_path: &str) -> Result<(TaxonSet<String>, Vec<PhylogeneticTree>)> {
    let mut reader = NewickReader::default();
    reader.add_warning_handler(Box::new(|tree_index, msg| {
        warn!("in tree {}: {}", tree_index, msg)
    }));
    let canonical = PathBuf::from(file_path)
        .canonicalize()
        .with_context(|| format!(r#"while opening file "{}""#, file_path))?;
    info!("reading trees from {:?}", canonical);
    let file = File::open(canonical)
        .with_context(|| format!(r#"while opening file "{}""#, file_path))?;
    let (taxa, trees) = reader
        .read(&mut BufReader::new(file))
        .with_context(|| format!(r#"while parsing file "{}""#, file_path))?;
    info!(
        "read {} tree(s) over {} taxa",
        trees.len(),
        taxa.len()
    );
    Ok((taxa, trees))
}
