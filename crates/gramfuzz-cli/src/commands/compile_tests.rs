use std::fs;
use std::path::PathBuf;

use super::compile::run;
use crate::cli::Cli;

fn base_cli(grammar: Vec<PathBuf>, out: PathBuf) -> Cli {
    Cli {
        grammar,
        no_actions: false,
        encoding: "utf-8".to_string(),
        lib: None,
        pep8: false,
        out,
        no_cleanup: false,
        antlr: None,
        verbose: 0,
        color: "never".to_string(),
    }
}

#[test]
fn compiles_a_combined_grammar_to_the_out_directory() {
    let dir = tempfile::tempdir().unwrap();
    let grammar_path = dir.path().join("Calc.g4");
    fs::write(&grammar_path, "grammar Calc;\nr : 'a' | 'b' ;\n").unwrap();

    let out_dir = dir.path().join("out");
    let cli = base_cli(vec![grammar_path], out_dir.clone());

    let code = run(cli);
    assert_eq!(code, 0);

    let generated = fs::read_to_string(out_dir.join("CalcGenerator.py")).unwrap();
    assert!(generated.contains("class CalcGenerator"));
    assert!(generated.contains("def r(self)"));
}

#[test]
fn missing_grammar_file_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let cli = base_cli(vec![dir.path().join("Missing.g4")], dir.path().to_path_buf());
    assert_eq!(run(cli), crate::exit_code::INPUT_ERROR);
}

#[test]
fn ill_formed_grammar_reports_its_own_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let grammar_path = dir.path().join("Bad.g4");
    // `r` only recurses into itself with no base case: unreachable base depth.
    fs::write(&grammar_path, "grammar Bad;\nr : r 'a' ;\n").unwrap();

    let cli = base_cli(vec![grammar_path], dir.path().join("out"));
    assert_eq!(run(cli), crate::exit_code::ILL_FORMED_GRAMMAR);
}

#[test]
fn pep8_flag_tidies_the_emitted_source() {
    let dir = tempfile::tempdir().unwrap();
    let grammar_path = dir.path().join("Calc.g4");
    fs::write(&grammar_path, "grammar Calc;\nr : 'a' ;\n").unwrap();

    let out_dir = dir.path().join("out");
    let mut cli = base_cli(vec![grammar_path], out_dir.clone());
    cli.pep8 = true;

    assert_eq!(run(cli), 0);
    let generated = fs::read_to_string(out_dir.join("CalcGenerator.py")).unwrap();
    assert!(!generated.lines().any(|line| line != line.trim_end()));
}

#[test]
fn lexer_and_parser_pair_merge_into_one_generator() {
    let dir = tempfile::tempdir().unwrap();
    let lexer_path = dir.path().join("FooLexer.g4");
    let parser_path = dir.path().join("FooParser.g4");
    fs::write(&lexer_path, "lexer grammar FooLexer;\nA : 'a' ;\n").unwrap();
    fs::write(
        &parser_path,
        "parser grammar FooParser;\ns : A ;\n",
    )
    .unwrap();

    let out_dir = dir.path().join("out");
    let cli = base_cli(vec![lexer_path, parser_path], out_dir.clone());

    assert_eq!(run(cli), 0);
    let generated = fs::read_to_string(out_dir.join("FooGenerator.py")).unwrap();
    assert!(generated.contains("def s(self)"));
    assert!(generated.contains("def A(self)"));
}
