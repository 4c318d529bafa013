//! Tokenizes ANTLR v4 grammar source.
//!
//! Logos handles every token shape that's regular, including the bare
//! `{` and `}` that open and close actions, predicates, and the
//! `tokens{}`/`options{}`/`channels{}` blocks. Those last three are
//! structural — their content is `Id`/`Comma`/`Equals` tokens the parser
//! reads normally — but action and predicate bodies are opaque text in
//! an embedded target language the parser never interprets. Only the
//! parser knows, from context, which kind of brace it's looking at, so
//! the merge of a balanced `{ ... }` run into one
//! [`SyntaxKind::ActionContent`] token happens on demand, via
//! [`merge_action`], rather than as a blanket second lexer pass.

use logos::Logos;
use rowan::{TextRange, TextSize};

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

pub fn token_text<'a>(source: &'a str, token: &Token) -> &'a str {
    &source[token.span]
}

pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = SyntaxKind::lexer(source);
    let mut tokens = Vec::new();
    let mut garbage_start: Option<usize> = None;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => {
                if let Some(start) = garbage_start.take() {
                    tokens.push(make_token(SyntaxKind::Garbage, start, span.start));
                }
                tokens.push(make_token(kind, span.start, span.end));
            }
            Err(()) => {
                garbage_start.get_or_insert(span.start);
            }
        }
    }
    if let Some(start) = garbage_start {
        tokens.push(make_token(SyntaxKind::Garbage, start, source.len()));
    }
    tokens
}

fn make_token(kind: SyntaxKind, start: usize, end: usize) -> Token {
    Token {
        kind,
        span: TextRange::new(TextSize::try_from(start).unwrap(), TextSize::try_from(end).unwrap()),
    }
}

/// Given `tokens[open_idx]` is a `BraceOpen`, finds its balanced match and
/// returns the `ActionContent` token spanning everything between them
/// (`None` if the braces are adjacent, `{}`) together with the index of
/// the matching `BraceClose` — or `tokens.len()` if the action runs
/// unterminated to end of input, in which case the caller should report
/// the missing `}` itself.
///
/// Nesting is tracked over `BraceOpen`/`BraceClose` only: a `}` embedded
/// in a string literal inside the action still lexes as its own brace
/// token, so action bodies that need a literal brace in a string are the
/// one case this can misparse. ANTLR's own grammar has the same limit.
pub fn merge_action(source: &str, tokens: &[Token], open_idx: usize) -> (Option<Token>, usize) {
    debug_assert_eq!(tokens[open_idx].kind, SyntaxKind::BraceOpen);

    let mut depth = 1usize;
    let mut j = open_idx + 1;
    while j < tokens.len() && depth > 0 {
        match tokens[j].kind {
            SyntaxKind::BraceOpen => depth += 1,
            SyntaxKind::BraceClose => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            break;
        }
        j += 1;
    }

    let content_start = tokens[open_idx].span.end();
    let content_end = if j < tokens.len() {
        tokens[j].span.start()
    } else {
        TextSize::try_from(source.len()).unwrap()
    };

    let content = (content_start < content_end).then_some(Token {
        kind: SyntaxKind::ActionContent,
        span: TextRange::new(content_start, content_end),
    });
    (content, j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_grammar_header() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("grammar Foo;"),
            vec![KwGrammar, Whitespace, Id, Semi]
        );
    }

    #[test]
    fn merge_action_spans_balanced_braces() {
        let src = "{ self.count += 1; }";
        let toks = lex(src);
        let (content, close_idx) = merge_action(src, &toks, 0);
        let content = content.expect("non-empty action body");
        assert_eq!(content.kind, SyntaxKind::ActionContent);
        assert_eq!(token_text(src, &content), " self.count += 1; ");
        assert_eq!(toks[close_idx].kind, SyntaxKind::BraceClose);
    }

    #[test]
    fn merge_action_spans_nested_braces() {
        let src = "{ if (x) { y() } }";
        let toks = lex(src);
        let (content, close_idx) = merge_action(src, &toks, 0);
        let content = content.expect("non-empty action body");
        assert_eq!(token_text(src, &content), " if (x) { y() } ");
        assert_eq!(close_idx, toks.len() - 1);
    }

    #[test]
    fn merge_action_on_empty_braces_yields_no_content() {
        let src = "{}";
        let toks = lex(src);
        let (content, close_idx) = merge_action(src, &toks, 0);
        assert!(content.is_none());
        assert_eq!(toks[close_idx].kind, SyntaxKind::BraceClose);
    }

    #[test]
    fn merge_action_reports_unterminated_action() {
        let src = "{ unterminated";
        let toks = lex(src);
        let (content, close_idx) = merge_action(src, &toks, 0);
        assert!(content.is_some());
        assert_eq!(close_idx, toks.len());
    }

    #[test]
    fn lexes_string_literal() {
        use SyntaxKind::*;
        assert_eq!(kinds("'a'"), vec![StringLiteral]);
        assert_eq!(kinds(r"'\n'"), vec![StringLiteral]);
    }
}
