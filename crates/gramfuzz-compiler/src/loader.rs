//! Grammar loader: parses the entry `.g4` file, transitively follows
//! `import` declarations, and merges every file's rule list into one
//! logical grammar.
//!
//! Import resolution order: the override library directory first (if
//! one was given), then the directory the importing file lives in.
//! Imports are followed recursively and depth-first, in declaration
//! order. Rule names are not deduplicated as they're collected — the
//! merge is last-write-wins, with a warning diagnostic naming both
//! definition sites (see [`MergedGrammar::rules`]).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::parser::ast::{AstNode, GrammarDecl, ImportRef, LexerRuleSpec, ParserRuleSpec, Root};
use crate::parser::{parse, SyntaxError};
use crate::Error;

/// A parser or lexer rule definition, tagged with the file it came from
/// (for the duplicate-rule warning's `related_to` note). Diagnostics
/// carried on an imported file's own text range can't be rendered
/// alongside the primary file's source in one snippet, so the loader
/// renders those warnings through `Display` (plain) rather than the
/// snippet printer; see `gramfuzz-cli`'s diagnostic rendering.
#[derive(Debug, Clone)]
pub enum RuleDef {
    Parser(ParserRuleSpec),
    Lexer(LexerRuleSpec),
}

impl RuleDef {
    pub fn name(&self) -> Option<String> {
        match self {
            RuleDef::Parser(r) => r.name(),
            RuleDef::Lexer(r) => r.name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamedActionDef {
    pub name: String,
    pub content: Option<String>,
}

/// The merged result of loading one grammar and all of its transitive
/// imports, flattened into a single logical rule list.
#[derive(Debug, Default)]
pub struct MergedGrammar {
    pub name: String,
    pub is_lexer: bool,
    pub is_parser: bool,
    pub options: IndexMap<String, String>,
    pub implicit_tokens: Vec<String>,
    pub named_actions: Vec<NamedActionDef>,
    /// Last-write-wins: a later file's rule of the same name replaces an
    /// earlier one's definition, but keeps the earlier one's position,
    /// matching the order the primary grammar's own rule list declares.
    pub rules: IndexMap<String, RuleDef>,
}

impl MergedGrammar {
    pub fn first_parser_rule(&self) -> Option<&str> {
        self.rules.iter().find_map(|(name, def)| match def {
            RuleDef::Parser(_) => Some(name.as_str()),
            RuleDef::Lexer(_) => None,
        })
    }
}

pub struct Loader<'a> {
    pub lib_dir: Option<&'a Path>,
    pub encoding: &'a str,
}

impl<'a> Loader<'a> {
    pub fn new(lib_dir: Option<&'a Path>) -> Self {
        Self {
            lib_dir,
            encoding: "utf-8",
        }
    }

    /// Sets the encoding grammar files (the entry and every transitively
    /// imported file) are read with. Defaults to `utf-8`.
    pub fn with_encoding(mut self, encoding: &'a str) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reads and decodes a grammar file in `self.encoding`.
    fn read_grammar_file(&self, path: &Path) -> Result<String, Error> {
        let bytes = fs::read(path).map_err(|e| Error::InputError {
            message: format!("cannot read grammar file `{}`: {e}", path.display()),
        })?;

        if self.encoding.eq_ignore_ascii_case("utf-8") || self.encoding.eq_ignore_ascii_case("utf8") {
            return String::from_utf8(bytes).map_err(|e| Error::InputError {
                message: format!("`{}` is not valid UTF-8: {e}", path.display()),
            });
        }

        let encoding = encoding_rs::Encoding::for_label(self.encoding.as_bytes()).ok_or_else(|| {
            Error::InputError {
                message: format!("unknown grammar file encoding `{}`", self.encoding),
            }
        })?;
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            return Err(Error::InputError {
                message: format!(
                    "`{}` could not be decoded as `{}`",
                    path.display(),
                    self.encoding
                ),
            });
        }
        Ok(text.into_owned())
    }

    /// Loads `entry_path` and every grammar it (transitively) imports,
    /// merging them into one [`MergedGrammar`]. Returns the merge
    /// alongside any duplicate-rule warnings collected along the way.
    pub fn load(&self, entry_path: &Path) -> Result<(MergedGrammar, Diagnostics), Error> {
        let mut merged = MergedGrammar::default();
        let mut diagnostics = Diagnostics::new();
        let mut visited = HashSet::new();
        self.load_file(entry_path, true, &mut merged, &mut diagnostics, &mut visited)?;
        Ok((merged, diagnostics))
    }

    /// Loads several top-level grammar files and merges all of them (each
    /// with its own transitive import closure) into one [`MergedGrammar`].
    ///
    /// ANTLR lets a grammar be split into a `XLexer.g4` + `XParser.g4`
    /// pair instead of one combined file; when more than one entry is
    /// given this picks the lexer-or-combined file to process (and name
    /// the generator from) first and the pure-parser file second,
    /// matching the reference tool's own `lexer_root` / `parser_root`
    /// resolution order. A single entry is just [`Loader::load`].
    pub fn load_many(&self, entries: &[PathBuf]) -> Result<(MergedGrammar, Diagnostics), Error> {
        if entries.len() == 1 {
            return self.load(&entries[0]);
        }

        let mut lexer_or_combined: Option<&PathBuf> = None;
        let mut parser_only: Option<&PathBuf> = None;
        let mut any_parser_capable = false;

        for entry in entries {
            let (is_lexer, is_parser) = self.peek_grammar_kind(entry)?;
            if is_parser && !is_lexer {
                parser_only = Some(entry);
                any_parser_capable = true;
            } else {
                lexer_or_combined = Some(entry);
                if !is_lexer {
                    any_parser_capable = true;
                }
            }
        }

        let mut merged = MergedGrammar::default();
        let mut diagnostics = Diagnostics::new();
        let mut visited = HashSet::new();
        let mut name_set = false;

        for path in [lexer_or_combined, parser_only].into_iter().flatten() {
            self.load_file(path, !name_set, &mut merged, &mut diagnostics, &mut visited)?;
            name_set = true;
        }

        merged.is_lexer = !any_parser_capable;
        merged.is_parser = any_parser_capable;

        Ok((merged, diagnostics))
    }

    /// Parses just enough of `path` to read its `grammar`/`lexer grammar`/
    /// `parser grammar` declaration, without merging its rules. Used by
    /// [`Loader::load_many`] to classify each top-level file before
    /// deciding processing order.
    fn peek_grammar_kind(&self, path: &Path) -> Result<(bool, bool), Error> {
        let text = self.read_grammar_file(path)?;
        let output = parse(&text);
        if !output.errors.is_empty() {
            return Err(Error::ParseError(syntax_errors_to_diagnostics(&output.errors)));
        }
        let root = Root::cast(output.syntax()).ok_or_else(|| Error::InternalAssertion {
            message: format!("parser produced no Root node for `{}`", path.display()),
        })?;
        let decl = root.grammar_decl().ok_or_else(|| Error::InputError {
            message: format!("`{}` has no grammar declaration", path.display()),
        })?;
        Ok((decl.is_lexer(), decl.is_parser()))
    }

    fn load_file(
        &self,
        path: &Path,
        is_primary: bool,
        merged: &mut MergedGrammar,
        diagnostics: &mut Diagnostics,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<(), Error> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(canonical) {
            return Ok(());
        }

        let text = self.read_grammar_file(path)?;

        let output = parse(&text);
        if !output.errors.is_empty() {
            return Err(Error::ParseError(syntax_errors_to_diagnostics(&output.errors)));
        }

        let root = Root::cast(output.syntax()).ok_or_else(|| Error::InternalAssertion {
            message: format!("parser produced no Root node for `{}`", path.display()),
        })?;

        let decl = root.grammar_decl();
        if is_primary {
            let decl = decl.as_ref().ok_or_else(|| Error::InputError {
                message: format!("`{}` has no grammar declaration", path.display()),
            })?;
            merged.name = decl.name().unwrap_or_default();
            merged.is_lexer = decl.is_lexer();
            merged.is_parser = decl.is_parser();
        }

        if let Some(options) = root.options_spec() {
            for option in options.options() {
                if let (Some(name), Some(value)) = (option.name(), option.value()) {
                    merged.options.insert(name, value);
                }
            }
        }

        if let Some(tokens) = root.tokens_spec() {
            for name in tokens.names() {
                if !merged.implicit_tokens.contains(&name) {
                    merged.implicit_tokens.push(name);
                }
            }
        }

        for action in root.named_actions() {
            merged.named_actions.push(NamedActionDef {
                name: action.name(),
                content: action.content().map(|t| t.text().to_string()),
            });
        }

        if let Some(list) = root.rule_list() {
            for rule in list.parser_rules() {
                self.merge_rule(merged, diagnostics, rule.name(), RuleDef::Parser(rule), path);
            }
            for rule in list.lexer_rules() {
                self.merge_rule(merged, diagnostics, rule.name(), RuleDef::Lexer(rule), path);
            }
        }

        for import in root.imports() {
            for import_ref in import.refs() {
                self.load_import(&import_ref, path, merged, diagnostics, visited)?;
            }
        }

        Ok(())
    }

    fn merge_rule(
        &self,
        merged: &mut MergedGrammar,
        diagnostics: &mut Diagnostics,
        name: Option<String>,
        def: RuleDef,
        source_path: &Path,
    ) {
        let Some(name) = name else { return };
        if merged.rules.contains_key(&name) {
            diagnostics
                .warning(
                    format!(
                        "rule `{name}` redefined while merging `{}`; the later definition wins",
                        source_path.display()
                    ),
                    rowan::TextRange::empty(0.into()),
                )
                .emit();
        }
        merged.rules.insert(name, def);
    }

    fn load_import(
        &self,
        import_ref: &ImportRef,
        importer_path: &Path,
        merged: &mut MergedGrammar,
        diagnostics: &mut Diagnostics,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<(), Error> {
        let Some(name) = import_ref.name() else {
            return Ok(());
        };
        let file_name = format!("{name}.g4");

        let candidate = self
            .lib_dir
            .map(|dir| dir.join(&file_name))
            .filter(|p| p.is_file())
            .or_else(|| {
                let sibling = importer_path.parent().unwrap_or(Path::new(".")).join(&file_name);
                sibling.is_file().then_some(sibling)
            })
            .ok_or_else(|| Error::InputError {
                message: format!(
                    "cannot locate imported grammar `{name}` (looked in {}{})",
                    self.lib_dir
                        .map(|d| format!("`{}` and ", d.display()))
                        .unwrap_or_default(),
                    importer_path.parent().unwrap_or(Path::new(".")).display()
                ),
            })?;

        self.load_file(&candidate, false, merged, diagnostics, visited)
    }
}

fn syntax_errors_to_diagnostics(errors: &[SyntaxError]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for err in errors {
        diagnostics.error(err.message.clone(), err.span).emit();
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_single_file_grammar() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write_temp(dir.path(), "Solo.g4", "grammar Solo;\nr : 'a' ;\n");
        let loader = Loader::new(None);
        let (merged, diagnostics) = loader.load(&entry).unwrap();
        assert_eq!(merged.name, "Solo");
        assert!(merged.rules.contains_key("r"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn follows_import_and_merges_rules() {
        let dir = tempfile::tempdir().unwrap();
        write_temp(dir.path(), "B.g4", "grammar B;\nx : 'q' ;\n");
        let entry = write_temp(
            dir.path(),
            "A.g4",
            "grammar A;\nimport B;\ns : x ;\n",
        );
        let loader = Loader::new(None);
        let (merged, _diagnostics) = loader.load(&entry).unwrap();
        assert_eq!(merged.name, "A");
        assert!(merged.rules.contains_key("s"));
        assert!(merged.rules.contains_key("x"));
    }

    #[test]
    fn missing_import_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write_temp(dir.path(), "A.g4", "grammar A;\nimport Missing;\ns : 'a' ;\n");
        let loader = Loader::new(None);
        let err = loader.load(&entry).unwrap_err();
        assert!(matches!(err, Error::InputError { .. }));
    }

    #[test]
    fn duplicate_rule_across_imports_warns_and_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_temp(dir.path(), "B.g4", "grammar B;\nr : 'b' ;\n");
        let entry = write_temp(
            dir.path(),
            "A.g4",
            "grammar A;\nimport B;\nr : 'a' ;\n",
        );
        let loader = Loader::new(None);
        let (merged, diagnostics) = loader.load(&entry).unwrap();
        assert!(diagnostics.has_warnings());
        // Primary file's rules are merged before imports, so the import's
        // `r` is the later write and wins.
        match &merged.rules["r"] {
            RuleDef::Parser(spec) => {
                let text = spec.syntax().text().to_string();
                assert!(text.contains('b'));
            }
            RuleDef::Lexer(_) => panic!("expected a parser rule"),
        }
    }
}
