//! Syntax kinds for the ANTLR v4 grammar surface syntax.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition on the token
//! variants; node kinds carry no token/regex attribute. `GLang` implements
//! rowan's `Language` trait so the parser can build a typed CST.

#![allow(dead_code)]

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST`.
/// `#[repr(u16)]` enables the safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,

    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("|")]
    Pipe,
    #[token("+=")]
    PlusEquals,
    #[token("+")]
    Plus,
    #[token("*")]
    Star,
    #[token("?")]
    Question,
    #[token("~")]
    Tilde,
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token("#")]
    Pound,
    #[token("@")]
    At,
    #[token("->")]
    Arrow,
    #[token("-")]
    Minus,

    #[token("grammar")]
    KwGrammar,
    #[token("lexer")]
    KwLexer,
    #[token("parser")]
    KwParser,
    #[token("import")]
    KwImport,
    #[token("fragment")]
    KwFragment,
    #[token("tokens")]
    KwTokens,
    #[token("options")]
    KwOptions,
    #[token("channels")]
    KwChannels,
    #[token("mode")]
    KwMode,
    #[token("returns")]
    KwReturns,
    #[token("locals")]
    KwLocals,
    #[token("throws")]
    KwThrows,
    #[token("catch")]
    KwCatch,
    #[token("finally")]
    KwFinally,

    /// Single-quoted string literal, e.g. `'foo'` or `'\n'`.
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLiteral,

    /// Identifier. Case of the first letter distinguishes `RULE_REF` (lower)
    /// from `TOKEN_REF` (upper) — the parser decides, the lexer doesn't.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Id,

    /// Raw text captured between a balanced `{` `}` pair by the lexer's
    /// brace-merge pass. Never produced directly by a logos regex because
    /// its content can itself contain arbitrarily-nested braces, strings,
    /// and comments in the embedded target language.
    #[doc(hidden)]
    ActionContent,

    #[regex(r"[ \t\r]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    /// Coalesced unrecognized input.
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    GrammarDecl,
    OptionsSpec,
    Option,
    ImportDecl,
    ImportRef,
    TokensSpec,
    ChannelsSpec,
    NamedAction,
    RuleList,
    ParserRuleSpec,
    LexerRuleSpec,
    RuleBlock,
    LexerRuleBlock,
    RuleAltList,
    LexerAltList,
    Alternative,
    LexerAlt,
    LabeledAlt,
    Element,
    LexerElement,
    LabeledElement,
    Ebnf,
    EbnfSuffix,
    Block,
    Atom,
    Terminal,
    RuleRef,
    NotSet,
    SetElement,
    CharSet,
    CharRange,
    Wildcard,
    ActionBlock,
    Predicate,

    /// Must stay last: bounds check in `kind_from_raw`.
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment | BlockComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GLang {}

impl Language for GLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: bounds-checked above; SyntaxKind is repr(u16).
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<GLang>;
pub type SyntaxToken = rowan::SyntaxToken<GLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
        TokenSet(1 << kind)
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets used for FIRST-set dispatch and error recovery.
pub mod token_sets {
    use super::*;

    pub const ELEMENT_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        StringLiteral,
        Id,
        Tilde,
        Dot,
        BraceOpen,
        BracketOpen,
    ]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace, Newline, LineComment, BlockComment]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[Star, Plus, Question]);

    pub const RULE_SPEC_RECOVERY: TokenSet = TokenSet::new(&[Id, KwFragment]);

    pub const ALTERNATIVE_RECOVERY: TokenSet = TokenSet::new(&[Pipe, Semi]);

    /// Resync points while scanning the prequel: the next construct
    /// keyword, the `@` of a named action, or the start of the rule list.
    pub const PREQUEL_RECOVERY: TokenSet = TokenSet::new(&[
        KwImport,
        KwTokens,
        KwChannels,
        KwOptions,
        KwMode,
        At,
        Id,
        KwFragment,
    ]);
}
