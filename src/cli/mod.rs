//! CLI module: clap-based argument parsing merged over the JSON config file.

mod clap_parser;

pub use clap_parser::Cli;
