//! Grammar-to-fuzzer compiler: parser, loader, emitter, and finalizer.
//!
//! This crate provides the compilation pipeline for turning an ANTLR v4
//! grammar into fuzzer source text:
//! - `parser` - lexer, CST, and AST construction over the `.g4` surface syntax
//! - `loader` - import resolution and rule-list merging
//! - `emit` - grammar-graph-building, placeholder-producing tree walk
//! - `finalize` - depth solving and placeholder substitution
//! - `diagnostics` - error reporting

pub mod diagnostics;
pub mod emit;
pub mod finalize;
pub mod loader;
pub mod parser;

use std::path::{Path, PathBuf};

pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use gramfuzz_core::{GraphError, SubstitutionError};
pub use loader::{Loader, MergedGrammar};

/// Errors that can occur while compiling a grammar into a fuzzer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Grammar file missing, unreadable, wrongly encoded, or an imported
    /// grammar not locatable.
    #[error("{message}")]
    InputError { message: String },

    /// Surfaced from the grammar parser.
    #[error("parsing failed with {} errors", .0.error_count())]
    ParseError(Diagnostics),

    /// Infinite or unreachable rule, or a rule with no alternatives.
    #[error("ill-formed grammar: {0}")]
    IllFormedGrammar(GraphError),

    /// Invariant violation: edge to an unknown vertex, unexpected tree
    /// shape, a missing placeholder at substitution time. Indicates a
    /// compiler bug, not a bad input.
    #[error("internal error: {message}")]
    InternalAssertion { message: String },

    /// Failure to write the emitted file or create working directories.
    #[error("cannot write output: {message}")]
    OutputError { message: String },
}

impl From<SubstitutionError> for Error {
    fn from(err: SubstitutionError) -> Self {
        Error::InternalAssertion {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Knobs that affect compilation but not the grammar's own text.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Alternate import search directory, consulted before the directory
    /// of the importing file.
    pub lib_dir: Option<PathBuf>,
    /// Treat every semantic predicate and embedded action as absent.
    pub no_actions: bool,
    /// Encoding every grammar file (entry and transitive imports) is read
    /// with. Defaults to `utf-8`.
    pub encoding: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            lib_dir: None,
            no_actions: false,
            encoding: "utf-8".to_string(),
        }
    }
}

/// The result of compiling one entry grammar (and its transitive imports)
/// into fuzzer source text.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub source: String,
    pub generator_name: String,
    pub diagnostics: Diagnostics,
}

/// Parses `entry` and every grammar it imports, builds the grammar graph,
/// solves minimum derivation depths, and emits fuzzer source text.
pub fn compile(entry: &Path, options: &CompileOptions) -> Result<CompileOutput> {
    let loader = Loader::new(options.lib_dir.as_deref()).with_encoding(&options.encoding);
    let (grammar, diagnostics) = loader.load(entry)?;
    compile_merged(grammar, diagnostics, options)
}

/// Like [`compile`], but for one or more top-level grammar files (e.g. a
/// split `XLexer.g4` + `XParser.g4` pair) instead of a single entry point.
/// See [`Loader::load_many`] for how they're combined.
pub fn compile_files(entries: &[PathBuf], options: &CompileOptions) -> Result<CompileOutput> {
    let loader = Loader::new(options.lib_dir.as_deref()).with_encoding(&options.encoding);
    let (grammar, diagnostics) = loader.load_many(entries)?;
    compile_merged(grammar, diagnostics, options)
}

fn compile_merged(
    grammar: MergedGrammar,
    mut diagnostics: Diagnostics,
    options: &CompileOptions,
) -> Result<CompileOutput> {
    let emitted = emit::Emitter::new(options.no_actions).emit_grammar(&grammar)?;
    let finalized = finalize::finalize(emitted)?;
    diagnostics.extend(finalized.diagnostics);

    Ok(CompileOutput {
        source: finalized.source,
        generator_name: finalized.generator_name,
        diagnostics,
    })
}
