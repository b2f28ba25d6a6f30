use super::{cli_manager, command::Command, common};
use anyhow::{Context, Result};
use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use log::info;
use phylocnf::{
    cnf::VariableRegistry,
    encodings::{EncodingOptions, NetworkEncoder},
};
use std::fs;

const CMD_NAME: &str = "encode";

const ARG_HYBRIDIZATION_NUMBER: &str = "HYBRIDIZATION_NUMBER";
const ARG_OUT: &str = "OUT";
const ARG_RETICULATION_CONNECTION: &str = "RETICULATION_CONNECTION";
const ARG_NO_COMMENTS: &str = "NO_COMMENTS";
const ARG_STRICT_SLOT_ORDERING: &str = "STRICT_SLOT_ORDERING";
const ARG_SKIP_DISJOINT_CLADES: &str = "SKIP_DISJOINT_CLADES";

/// The command encoding a set of trees into a DIMACS CNF document.
pub(crate) struct EncodeCommand;

impl EncodeCommand {
    pub fn new() -> Self {
        EncodeCommand
    }
}

impl<'a> Command<'a> for EncodeCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> clap::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Encodes a minimal hybridization problem into a CNF formula")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_arg())
            .arg(cli_manager::logging_level_cli_arg())
            .arg(
                Arg::with_name(ARG_HYBRIDIZATION_NUMBER)
                    .short("k")
                    .long("hybridization-number")
                    .empty_values(false)
                    .multiple(false)
                    .help("the number of reticulation nodes of the candidate networks")
                    .required(true),
            )
            .arg(
                Arg::with_name(ARG_OUT)
                    .short("o")
                    .long("output")
                    .empty_values(false)
                    .multiple(false)
                    .help("the output file for the encoding")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_RETICULATION_CONNECTION)
                    .long("reticulation-connection")
                    .takes_value(false)
                    .help("allow edges between reticulation nodes"),
            )
            .arg(
                Arg::with_name(ARG_NO_COMMENTS)
                    .long("no-comments")
                    .takes_value(false)
                    .help("do not write comment lines in the CNF document"),
            )
            .arg(
                Arg::with_name(ARG_STRICT_SLOT_ORDERING)
                    .long("strict-slot-ordering")
                    .takes_value(false)
                    .help("force the left child (resp. parent) slot to hold the lower node id"),
            )
            .arg(
                Arg::with_name(ARG_SKIP_DISJOINT_CLADES)
                    .long("skip-disjoint-clades")
                    .takes_value(false)
                    .help("do not emit the constraints for cross-tree disjoint clades"),
            )
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let (_, trees) = common::read_file_path(arg_matches.value_of(common::ARG_INPUT).unwrap())?;
        let str_k = arg_matches.value_of(ARG_HYBRIDIZATION_NUMBER).unwrap();
        let hybridization_number = str_k
            .parse::<usize>()
            .with_context(|| format!(r#"while parsing the hybridization number "{}""#, str_k))?;
        let options = EncodingOptions {
            hybridization_number,
            reticulation_connection: arg_matches.is_present(ARG_RETICULATION_CONNECTION),
            disable_comments: arg_matches.is_present(ARG_NO_COMMENTS),
            strict_slot_ordering: arg_matches.is_present(ARG_STRICT_SLOT_ORDERING),
            disjoint_clade_constraints: !arg_matches.is_present(ARG_SKIP_DISJOINT_CLADES),
        };
        let encoder = NetworkEncoder::new(&trees, options, VariableRegistry::default())?;
        let formula = encoder.encode();
        info!(
            "encoded {} tree(s) with k = {} into {} variables and {} clauses",
            trees.len(),
            hybridization_number,
            formula.n_variables(),
            formula.n_clauses()
        );
        if let Some(output_file) = arg_matches.value_of(ARG_OUT) {
            fs::write(output_file, formula.dimacs())
                .with_context(|| format!(r#"while writing file "{}""#, output_file))?;
            info!("CNF document written to {}", output_file);
        } else {
            print!("{}", formula.dimacs());
        }
        Ok(())
    }
}
