//! Recursive-descent parser producing a rowan CST over [`SyntaxKind`].
//!
//! The grammar covers the ANTLR v4 surface syntax named in
//! [`super::cst`]'s node kinds: the grammar header, the prequel
//! constructs (`import`, `tokens{}`, `channels{}`, `options{}`, named
//! actions), parser and lexer rule lists, labeled alternatives,
//! elements, suffixes, and atoms. Errors are recovered locally — a
//! malformed construct is wrapped in an `Error` node and parsing resumes
//! at the next token in a caller-supplied recovery set — so one bad rule
//! never aborts the rest of the file.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange};

use super::cst::{token_sets, SyntaxKind, SyntaxNode, TokenSet};
use super::lexer::{self, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: TextRange,
}

pub struct ParseOutput {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutput {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }
}

pub fn parse(source: &str) -> ParseOutput {
    let tokens = lexer::lex(source);
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        builder: GreenNodeBuilder::new(),
        errors: Vec::new(),
    };
    parser.parse_root();
    ParseOutput {
        green: parser.builder.finish(),
        errors: parser.errors,
    }
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl Parser<'_> {
    // --- low-level token/tree plumbing ---

    fn skip_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.push_raw();
        }
    }

    fn push_raw(&mut self) {
        let tok = self.tokens[self.pos];
        self.builder.token(tok.kind.into(), &self.source[tok.span]);
        self.pos += 1;
    }

    fn nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia();
        let mut i = self.pos;
        let mut seen = 0;
        loop {
            match self.tokens.get(i) {
                None => return SyntaxKind::Error,
                Some(t) if t.kind.is_trivia() => i += 1,
                Some(t) => {
                    if seen == n {
                        return t.kind;
                    }
                    seen += 1;
                    i += 1;
                }
            }
        }
    }

    fn current(&mut self) -> SyntaxKind {
        self.nth(0)
    }

    fn current_span(&mut self) -> TextRange {
        self.skip_trivia();
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| {
                let end = self.source.len() as u32;
                TextRange::new(end.into(), end.into())
            })
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_end(&mut self) -> bool {
        self.skip_trivia();
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) {
        self.skip_trivia();
        if self.pos < self.tokens.len() {
            self.push_raw();
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(format!("expected {kind:?}, found {:?}", self.current()));
            false
        }
    }

    fn error(&mut self, message: String) {
        let span = self.current_span();
        self.errors.push(SyntaxError { message, span });
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Wraps whatever has been opened (via `checkpoint`) as an `Error`
    /// node and consumes tokens until `recovery` or end of input, so the
    /// caller's enclosing list can keep parsing siblings.
    fn recover(&mut self, checkpoint: Checkpoint, recovery: TokenSet) {
        self.start_node_at(checkpoint, SyntaxKind::Error);
        while !self.at_end() && !recovery.contains(self.current()) {
            self.bump();
        }
        self.finish_node();
    }

    /// Consumes a brace-delimited action or predicate body as one
    /// `ActionContent` token, decided by the caller's context rather
    /// than by the lexer. Expects `current() == BraceOpen`.
    fn bump_action(&mut self) {
        self.skip_trivia();
        debug_assert!(self.at(SyntaxKind::BraceOpen));
        let open_idx = self.pos;
        self.push_raw();
        let (content, close_idx) = lexer::merge_action(self.source, &self.tokens, open_idx);
        if let Some(content) = content {
            self.builder
                .token(content.kind.into(), &self.source[content.span]);
        }
        self.pos = close_idx;
        if self.pos < self.tokens.len() && self.tokens[self.pos].kind == SyntaxKind::BraceClose {
            self.push_raw();
        } else {
            self.error("unterminated action: missing `}`".to_string());
        }
    }

    // --- grammar ---

    fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        if matches!(
            self.current(),
            SyntaxKind::KwLexer | SyntaxKind::KwParser | SyntaxKind::KwGrammar
        ) {
            self.parse_grammar_decl();
        } else {
            self.error("expected a `grammar` declaration".to_string());
        }

        loop {
            match self.current() {
                SyntaxKind::KwImport => self.parse_import_decl(),
                SyntaxKind::KwTokens => self.parse_id_block(SyntaxKind::TokensSpec, SyntaxKind::KwTokens),
                SyntaxKind::KwChannels => {
                    self.parse_id_block(SyntaxKind::ChannelsSpec, SyntaxKind::KwChannels)
                }
                SyntaxKind::KwOptions => self.parse_options_spec(),
                SyntaxKind::At => self.parse_named_action(),
                SyntaxKind::KwMode => self.skip_mode_header(),
                SyntaxKind::Id | SyntaxKind::KwFragment => break,
                _ if self.at_end() => break,
                _ => {
                    let cp = self.checkpoint();
                    self.bump();
                    self.recover(cp, token_sets::PREQUEL_RECOVERY);
                }
            }
        }

        self.parse_rule_list();

        while !self.at_end() {
            let cp = self.checkpoint();
            self.bump();
            self.recover(cp, TokenSet::EMPTY);
        }

        self.finish_node();
    }

    fn parse_grammar_decl(&mut self) {
        self.start_node(SyntaxKind::GrammarDecl);
        if self.at(SyntaxKind::KwLexer) || self.at(SyntaxKind::KwParser) {
            self.bump();
        }
        self.expect(SyntaxKind::KwGrammar);
        self.expect(SyntaxKind::Id);
        self.expect(SyntaxKind::Semi);
        self.finish_node();
    }

    fn parse_import_decl(&mut self) {
        self.start_node(SyntaxKind::ImportDecl);
        self.bump(); // `import`
        self.parse_import_ref();
        while self.at(SyntaxKind::Comma) {
            self.bump();
            self.parse_import_ref();
        }
        self.expect(SyntaxKind::Semi);
        self.finish_node();
    }

    fn parse_import_ref(&mut self) {
        self.start_node(SyntaxKind::ImportRef);
        self.expect(SyntaxKind::Id);
        if self.at(SyntaxKind::Equals) {
            self.bump();
            self.expect(SyntaxKind::Id);
        }
        self.finish_node();
    }

    /// `tokens { A, B, C }` / `channels { X, Y }` — a brace-delimited,
    /// comma-separated identifier list. Braces here are structural, not
    /// an action, so they're ordinary tokens, not merged.
    fn parse_id_block(&mut self, node: SyntaxKind, keyword: SyntaxKind) {
        self.start_node(node);
        self.expect(keyword);
        if self.expect(SyntaxKind::BraceOpen) {
            if self.at(SyntaxKind::Id) {
                self.bump();
                while self.at(SyntaxKind::Comma) {
                    self.bump();
                    self.expect(SyntaxKind::Id);
                }
            }
            self.expect(SyntaxKind::BraceClose);
        }
        self.finish_node();
    }

    fn parse_options_spec(&mut self) {
        self.start_node(SyntaxKind::OptionsSpec);
        self.bump(); // `options`
        if self.expect(SyntaxKind::BraceOpen) {
            while self.at(SyntaxKind::Id) {
                self.parse_option();
            }
            self.expect(SyntaxKind::BraceClose);
        }
        self.finish_node();
    }

    fn parse_option(&mut self) {
        self.start_node(SyntaxKind::Option);
        self.expect(SyntaxKind::Id);
        self.expect(SyntaxKind::Equals);
        // Option values are identifiers, string literals, or integers
        // lexed as `Id`; any of those (or a dotted path) is accepted.
        if matches!(self.current(), SyntaxKind::Id | SyntaxKind::StringLiteral) {
            self.bump();
            while self.at(SyntaxKind::DoubleColon) || self.at(SyntaxKind::Dot) {
                self.bump();
                self.bump();
            }
        } else {
            self.error("expected an option value".to_string());
        }
        self.expect(SyntaxKind::Semi);
        self.finish_node();
    }

    /// `@header { ... }` / `@lexer::members { ... }`.
    fn parse_named_action(&mut self) {
        self.start_node(SyntaxKind::NamedAction);
        self.bump(); // `@`
        self.expect(SyntaxKind::Id);
        while self.at(SyntaxKind::DoubleColon) {
            self.bump();
            self.expect(SyntaxKind::Id);
        }
        if self.at(SyntaxKind::BraceOpen) {
            self.bump_action();
        } else {
            self.error("expected an action block".to_string());
        }
        self.finish_node();
    }

    /// Lexer modes partition rules for ANTLR's own lexer switching, which
    /// the grammar graph has no use for: every rule the mode introduces
    /// still becomes an ordinary graph vertex, so only the `mode Name;`
    /// header itself is consumed here and rule parsing falls straight
    /// through into the same rule list.
    fn skip_mode_header(&mut self) {
        self.bump(); // `mode`
        self.expect(SyntaxKind::Id);
        self.expect(SyntaxKind::Semi);
    }

    fn parse_rule_list(&mut self) {
        self.start_node(SyntaxKind::RuleList);
        loop {
            match self.current() {
                SyntaxKind::KwFragment => self.parse_lexer_rule(),
                SyntaxKind::Id => {
                    if self.id_starts_lexer_rule() {
                        self.parse_lexer_rule();
                    } else {
                        self.parse_parser_rule();
                    }
                }
                SyntaxKind::KwMode => self.skip_mode_header(),
                _ => break,
            }
        }
        self.finish_node();
    }

    /// ANTLR distinguishes parser from lexer rules by the first letter's
    /// case: `TOKEN_REF` rules are upper, `RULE_REF` rules are lower.
    fn id_starts_lexer_rule(&mut self) -> bool {
        self.skip_trivia();
        self.tokens
            .get(self.pos)
            .map(|t| {
                self.source[t.span]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_uppercase())
            })
            .unwrap_or(false)
    }

    fn parse_parser_rule(&mut self) {
        self.start_node(SyntaxKind::ParserRuleSpec);
        self.expect(SyntaxKind::Id);
        self.skip_rule_signature();
        self.expect(SyntaxKind::Colon);
        self.parse_rule_block();
        self.expect(SyntaxKind::Semi);
        self.finish_node();
    }

    /// `returns [...]`, `locals [...]`, `throws X`, `catch [...] { }`,
    /// `finally { }` — rule attributes that shape generated parser code
    /// but carry no weight for what the rule can derive. Skipped whole.
    fn skip_rule_signature(&mut self) {
        loop {
            match self.current() {
                SyntaxKind::KwReturns | SyntaxKind::KwLocals => {
                    self.bump();
                    self.skip_bracket_run();
                }
                SyntaxKind::KwThrows => {
                    self.bump();
                    self.expect(SyntaxKind::Id);
                    while self.at(SyntaxKind::Comma) {
                        self.bump();
                        self.expect(SyntaxKind::Id);
                    }
                }
                SyntaxKind::At => self.parse_named_action(),
                _ => break,
            }
        }
    }

    fn skip_bracket_run(&mut self) {
        if self.expect(SyntaxKind::BracketOpen) {
            let mut depth = 1;
            while depth > 0 && !self.at_end() {
                match self.current() {
                    SyntaxKind::BracketOpen => depth += 1,
                    SyntaxKind::BracketClose => depth -= 1,
                    _ => {}
                }
                self.bump();
            }
        }
    }

    fn parse_lexer_rule(&mut self) {
        self.start_node(SyntaxKind::LexerRuleSpec);
        if self.at(SyntaxKind::KwFragment) {
            self.bump();
        }
        self.expect(SyntaxKind::Id);
        self.expect(SyntaxKind::Colon);
        self.parse_lexer_rule_block();
        self.expect(SyntaxKind::Semi);
        self.finish_node();
    }

    fn parse_rule_block(&mut self) {
        self.start_node(SyntaxKind::RuleBlock);
        self.parse_rule_alt_list();
        self.finish_node();
    }

    fn parse_rule_alt_list(&mut self) {
        self.start_node(SyntaxKind::RuleAltList);
        self.parse_labeled_alt();
        while self.at(SyntaxKind::Pipe) {
            self.bump();
            self.parse_labeled_alt();
        }
        self.finish_node();
    }

    fn parse_labeled_alt(&mut self) {
        let cp = self.checkpoint();
        self.parse_alternative(token_sets::ALTERNATIVE_RECOVERY);
        if self.at(SyntaxKind::Pound) {
            self.start_node_at(cp, SyntaxKind::LabeledAlt);
            self.bump();
            self.expect(SyntaxKind::Id);
            self.finish_node();
        }
    }

    fn parse_alternative(&mut self, recovery: TokenSet) {
        self.start_node(SyntaxKind::Alternative);
        while token_sets::ELEMENT_FIRST.contains(self.current()) {
            self.parse_element(recovery);
        }
        self.finish_node();
    }

    fn parse_element(&mut self, recovery: TokenSet) {
        let cp = self.checkpoint();
        self.start_node(SyntaxKind::Element);
        match self.current() {
            SyntaxKind::BraceOpen => self.parse_action_or_predicate(),
            _ => {
                let label_cp = self.checkpoint();
                if self.current() == SyntaxKind::Id && self.peek_is_label_marker() {
                    self.start_node_at(label_cp, SyntaxKind::LabeledElement);
                    self.bump();
                    self.bump(); // `=` or `+=`
                    self.parse_atom_or_block(recovery);
                    self.finish_node();
                } else {
                    self.parse_atom_or_block(recovery);
                }
                self.parse_optional_suffix(cp);
            }
        }
        self.finish_node();
    }

    /// An `Id` followed by `=` or `+=` is a label, not a rule reference —
    /// distinguished from a bare rule reference by one token of lookahead.
    fn peek_is_label_marker(&mut self) -> bool {
        matches!(self.nth(1), SyntaxKind::Equals | SyntaxKind::PlusEquals)
    }

    fn parse_atom_or_block(&mut self, recovery: TokenSet) {
        match self.current() {
            SyntaxKind::ParenOpen => self.parse_block(recovery),
            _ => self.parse_atom(recovery),
        }
    }

    fn parse_block(&mut self, recovery: TokenSet) {
        self.start_node(SyntaxKind::Block);
        self.bump(); // `(`
        self.parse_rule_alt_list();
        if !self.expect(SyntaxKind::ParenClose) {
            let cp = self.checkpoint();
            self.recover(cp, recovery);
        }
        self.finish_node();
    }

    fn parse_atom(&mut self, recovery: TokenSet) {
        let cp = self.checkpoint();
        match self.current() {
            SyntaxKind::Dot => {
                self.start_node_at(cp, SyntaxKind::Wildcard);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::StringLiteral => {
                self.bump();
                if self.at(SyntaxKind::DotDot) {
                    self.start_node_at(cp, SyntaxKind::CharRange);
                    self.bump();
                    self.expect(SyntaxKind::StringLiteral);
                } else {
                    self.start_node_at(cp, SyntaxKind::Terminal);
                }
                self.finish_node();
            }
            SyntaxKind::Id => {
                self.start_node_at(cp, SyntaxKind::RuleRef);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::Tilde => {
                self.start_node_at(cp, SyntaxKind::NotSet);
                self.bump();
                self.parse_set_element();
                self.finish_node();
            }
            SyntaxKind::BracketOpen => self.parse_char_set(),
            _ => {
                self.error(format!("expected an atom, found {:?}", self.current()));
                self.recover(cp, recovery);
            }
        }
    }

    fn parse_set_element(&mut self) {
        self.start_node(SyntaxKind::SetElement);
        self.parse_one_set_member();
        while self.at(SyntaxKind::Pipe) {
            self.bump();
            self.parse_one_set_member();
        }
        self.finish_node();
    }

    fn parse_one_set_member(&mut self) {
        if self.at(SyntaxKind::BracketOpen) {
            self.parse_char_set();
            return;
        }
        let cp = self.checkpoint();
        self.expect(SyntaxKind::StringLiteral);
        if self.at(SyntaxKind::DotDot) {
            self.start_node_at(cp, SyntaxKind::CharRange);
            self.bump();
            self.expect(SyntaxKind::StringLiteral);
            self.finish_node();
        } else {
            self.start_node_at(cp, SyntaxKind::Terminal);
            self.finish_node();
        }
    }

    /// `'a'..'z'` outside a set, or `[a-zA-Z_]` as a character class —
    /// both represented as a string-literal-valued `CharSet`/`CharRange`
    /// node; the bracket form's contents are carried verbatim as one
    /// literal and interval-expanded later by the emitter.
    ///
    /// A lone `\` inside the brackets lexes as `Garbage` (it matches no
    /// token on its own), so an escape like `\]` or `\-` surfaces as a
    /// `Garbage` token followed by whatever the escaped character lexes as
    /// standalone — `BracketClose` for `\]`. A dangling (odd trailing
    /// count of) `\` must swallow that next token as the escaped
    /// character rather than let it close the set early.
    fn parse_char_set(&mut self) {
        self.start_node(SyntaxKind::CharSet);
        self.bump(); // `[`
        loop {
            match self.current() {
                SyntaxKind::BracketClose | SyntaxKind::Error => break,
                SyntaxKind::Garbage => {
                    let dangling = self.trailing_backslash_count() % 2 == 1;
                    self.bump();
                    if dangling && !self.at_end() {
                        self.bump(); // the character the dangling `\` escapes
                    }
                }
                _ => self.bump(),
            }
        }
        self.expect(SyntaxKind::BracketClose);
        self.finish_node();
    }

    /// How many `\` characters the current (assumed `Garbage`) token ends
    /// with. An odd count means one `\` is left unpaired and still needs
    /// to consume the following token as its escaped character; an even
    /// count means every `\` in the run already paired off with another
    /// `\` (e.g. `\\` escaping a literal backslash) and the next token is
    /// unrelated to this escape.
    fn trailing_backslash_count(&mut self) -> usize {
        self.skip_trivia();
        self.tokens
            .get(self.pos)
            .map(|t| self.source[t.span].chars().rev().take_while(|&c| c == '\\').count())
            .unwrap_or(0)
    }

    fn parse_action_or_predicate(&mut self) {
        let cp = self.checkpoint();
        self.bump_action_block(cp);
        if self.at(SyntaxKind::Question) {
            self.start_node_at(cp, SyntaxKind::Predicate);
            self.bump();
            self.finish_node();
        }
    }

    fn bump_action_block(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::ActionBlock);
        self.bump_action();
        self.finish_node();
    }

    fn parse_optional_suffix(&mut self, element_cp: Checkpoint) {
        if token_sets::QUANTIFIERS.contains(self.current()) {
            self.start_node_at(element_cp, SyntaxKind::Ebnf);
            let suffix_cp = self.checkpoint();
            self.start_node_at(suffix_cp, SyntaxKind::EbnfSuffix);
            self.bump();
            if self.at(SyntaxKind::Question) {
                self.bump(); // non-greedy marker
            }
            self.finish_node();
            self.finish_node();
        }
    }

    // --- lexer rule bodies ---

    fn parse_lexer_rule_block(&mut self) {
        self.start_node(SyntaxKind::LexerRuleBlock);
        self.parse_lexer_alt_list();
        self.finish_node();
    }

    fn parse_lexer_alt_list(&mut self) {
        self.start_node(SyntaxKind::LexerAltList);
        self.parse_lexer_alt();
        while self.at(SyntaxKind::Pipe) {
            self.bump();
            self.parse_lexer_alt();
        }
        self.finish_node();
    }

    fn parse_lexer_alt(&mut self) {
        self.start_node(SyntaxKind::LexerAlt);
        while token_sets::ELEMENT_FIRST.contains(self.current()) {
            self.parse_lexer_element();
        }
        // `-> skip` / `-> channel(HIDDEN)` / `-> type(X), mode(Y)` lexer
        // commands: they steer the real lexer, not derivation, so
        // they're consumed and dropped rather than given a node.
        if self.at(SyntaxKind::Arrow) {
            self.bump();
            self.expect(SyntaxKind::Id);
            if self.at(SyntaxKind::ParenOpen) {
                self.bump();
                while !self.at(SyntaxKind::ParenClose) && !self.at_end() {
                    self.bump();
                }
                self.expect(SyntaxKind::ParenClose);
            }
            while self.at(SyntaxKind::Comma) {
                self.bump();
                self.expect(SyntaxKind::Id);
                if self.at(SyntaxKind::ParenOpen) {
                    self.bump();
                    while !self.at(SyntaxKind::ParenClose) && !self.at_end() {
                        self.bump();
                    }
                    self.expect(SyntaxKind::ParenClose);
                }
            }
        }
        self.finish_node();
    }

    fn parse_lexer_element(&mut self) {
        let cp = self.checkpoint();
        self.start_node(SyntaxKind::LexerElement);
        if self.at(SyntaxKind::BraceOpen) {
            self.parse_action_or_predicate();
        } else {
            self.parse_atom_or_block(token_sets::ALTERNATIVE_RECOVERY);
            self.parse_optional_suffix(cp);
        }
        self.finish_node();
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
