//! The compiler's one job: read grammar file(s), compile them, write the
//! generator. Silent on success, like `cargo check` — matching the
//! reference tool's own convention of only speaking up about problems.

use std::fs;

use gramfuzz_compiler::{CompileOptions, Diagnostics, Error};

use crate::cli::{Cli, ColorChoice};
use crate::cosmetic;
use crate::exit_code;

pub fn run(cli: Cli) -> i32 {
    for path in &cli.grammar {
        if !path.is_file() {
            eprintln!("error: grammar file `{}` does not exist", path.display());
            return exit_code::INPUT_ERROR;
        }
    }

    let color = ColorChoice::parse(&cli.color).should_colorize();

    let options = CompileOptions {
        lib_dir: cli.lib.clone(),
        no_actions: cli.no_actions,
        encoding: cli.encoding.clone(),
    };

    if cli.verbose > 0 {
        for path in &cli.grammar {
            eprintln!("gramfuzz: loading `{}`", path.display());
        }
    }

    let output = match gramfuzz_compiler::compile_files(&cli.grammar, &options) {
        Ok(output) => output,
        Err(err) => return report_error(&cli, &err, color),
    };

    if !output.diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(&output.diagnostics, color));
    }

    let mut source = output.source;
    if cli.pep8 {
        source = cosmetic::tidy(&source);
    }

    if let Err(e) = fs::create_dir_all(&cli.out) {
        eprintln!(
            "error: cannot create output directory `{}`: {e}",
            cli.out.display()
        );
        return exit_code::OUTPUT_ERROR;
    }

    let out_path = cli.out.join(format!("{}.py", output.generator_name));
    if let Err(e) = fs::write(&out_path, source) {
        eprintln!("error: cannot write `{}`: {e}", out_path.display());
        return exit_code::OUTPUT_ERROR;
    }

    if cli.verbose > 0 {
        eprintln!("gramfuzz: wrote `{}`", out_path.display());
    }

    // The native grammar parser replaces the jar-based ANTLR parser this
    // flag was written for, so there is no temporary ANTLR subdirectory
    // to retain or clean up.
    if cli.no_cleanup && cli.verbose > 0 {
        eprintln!(
            "gramfuzz: --no-cleanup has no effect: there is no ANTLR working subdirectory to retain"
        );
    }

    exit_code::SUCCESS
}

fn report_error(cli: &Cli, err: &Error, color: bool) -> i32 {
    match err {
        Error::ParseError(diagnostics) if cli.grammar.len() == 1 => {
            let source = fs::read_to_string(&cli.grammar[0]).unwrap_or_default();
            let path = cli.grammar[0].display().to_string();
            let rendered = diagnostics
                .printer()
                .source(&source)
                .path(&path)
                .colored(color)
                .render();
            eprint!("{rendered}");
        }
        Error::ParseError(diagnostics) => {
            eprint!("{}", render_diagnostics(diagnostics, color));
        }
        other => eprintln!("error: {other}"),
    }
    exit_code::for_error(err)
}

fn render_diagnostics(diagnostics: &Diagnostics, color: bool) -> String {
    diagnostics.printer().colored(color).render()
}
