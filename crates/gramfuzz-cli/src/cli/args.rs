//! Command-line surface for the grammar-to-fuzzer compiler.
//!
//! One flag per entry in the reference tool's argument table, plus the
//! ambient `-v`/`--color` ergonomics any finished CLI carries.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gramfuzz",
    version,
    about = "Compiles an ANTLR v4 grammar into fuzzer source code",
    long_about = "Reads one or more ANTLR v4 grammar files (a single combined grammar, \
or a separate lexer/parser pair) and writes a <GrammarName>Generator.py \
source file that produces random strings conforming to the grammar when \
run against the grammarinator runtime."
)]
pub struct Cli {
    /// ANTLR grammar file(s) describing the format to generate.
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub grammar: Vec<PathBuf>,

    /// Treat all semantic predicates and embedded actions as absent.
    #[arg(long)]
    pub no_actions: bool,

    /// Grammar file encoding.
    #[arg(long, value_name = "ENC", default_value = "utf-8")]
    pub encoding: String,

    /// Alternative location to search for imported grammars.
    #[arg(long, value_name = "DIR")]
    pub lib: Option<PathBuf>,

    /// Apply a cosmetic pretty-printer to the emitted file.
    #[arg(long)]
    pub pep8: bool,

    /// Working/output directory the generator file is written into.
    #[arg(short, long = "out", value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Retain the temporary ANTLR working subdirectory instead of
    /// removing it after a successful run.
    #[arg(long)]
    pub no_cleanup: bool,

    /// Path to the ANTLR jar. Unused by this implementation's grammar
    /// parser (a native recursive-descent parser, not a jar-based one)
    /// but accepted for command-line compatibility.
    #[arg(long, value_name = "PATH")]
    pub antlr: Option<PathBuf>,

    /// Print informational progress lines (files loaded, output path
    /// written). Repeat for more detail.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize rendered diagnostics.
    #[arg(
        long,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    pub color: String,
}
