//! Parser infrastructure for the ANTLR v4 grammar surface syntax.
//!
//! Produces a lossless concrete syntax tree (CST) via rowan's green tree
//! builder, then exposes it through the typed wrappers in [`ast`]. The
//! lexer does the regular half of tokenizing; the parser does the rest
//! (deciding `RULE_REF` vs `TOKEN_REF` by case, merging balanced braces
//! into one `ActionContent` token on demand, building labeled
//! alternatives by retroactive node wrapping via rowan checkpoints).

pub mod ast;
pub mod cst;
pub mod lexer;
#[path = "parser.rs"]
pub mod grammar;

pub use ast::{AstNode, Expr};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use grammar::{parse, ParseOutput, SyntaxError};
pub use lexer::{lex, token_text, Token};
