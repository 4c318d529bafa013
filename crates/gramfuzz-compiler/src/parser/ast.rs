//! Typed AST wrappers over the untyped [`SyntaxNode`] tree.
//!
//! Every wrapper is a thin newtype: `cast` checks the node's kind and the
//! accessors walk the node's children on demand. Nothing here is cached —
//! the tree is small and short-lived, one compilation's worth.

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn children<T>(node: &SyntaxNode) -> impl Iterator<Item = T> + '_
where
    T: AstNode,
{
    node.children().filter_map(T::cast)
}

fn child<T>(node: &SyntaxNode) -> Option<T>
where
    T: AstNode,
{
    children(node).next()
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

pub trait AstNode: Sized {
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! impl_ast_node {
    ($($name:ident),* $(,)?) => {
        $(impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                $name::cast(node)
            }
            fn syntax(&self) -> &SyntaxNode {
                $name::syntax(self)
            }
        })*
    };
}

ast_node!(Root, Root);
ast_node!(GrammarDecl, GrammarDecl);
ast_node!(OptionsSpec, OptionsSpec);
ast_node!(OptionNode, Option);
ast_node!(ImportDecl, ImportDecl);
ast_node!(ImportRef, ImportRef);
ast_node!(TokensSpec, TokensSpec);
ast_node!(ChannelsSpec, ChannelsSpec);
ast_node!(NamedAction, NamedAction);
ast_node!(RuleList, RuleList);
ast_node!(ParserRuleSpec, ParserRuleSpec);
ast_node!(LexerRuleSpec, LexerRuleSpec);
ast_node!(RuleBlock, RuleBlock);
ast_node!(LexerRuleBlock, LexerRuleBlock);
ast_node!(RuleAltList, RuleAltList);
ast_node!(LexerAltList, LexerAltList);
ast_node!(Alternative, Alternative);
ast_node!(LexerAlt, LexerAlt);
ast_node!(LabeledAlt, LabeledAlt);
ast_node!(Element, Element);
ast_node!(LexerElement, LexerElement);
ast_node!(LabeledElement, LabeledElement);
ast_node!(Ebnf, Ebnf);
ast_node!(EbnfSuffix, EbnfSuffix);
ast_node!(Block, Block);
ast_node!(Atom, Atom);
ast_node!(Terminal, Terminal);
ast_node!(RuleRef, RuleRef);
ast_node!(NotSet, NotSet);
ast_node!(SetElement, SetElement);
ast_node!(CharSet, CharSet);
ast_node!(CharRange, CharRange);
ast_node!(Wildcard, Wildcard);
ast_node!(ActionBlock, ActionBlock);
ast_node!(Predicate, Predicate);

impl_ast_node!(
    Root,
    GrammarDecl,
    OptionsSpec,
    OptionNode,
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
);

impl Root {
    pub fn grammar_decl(&self) -> Option<GrammarDecl> {
        child(self.syntax())
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> + '_ {
        children(self.syntax())
    }

    pub fn tokens_spec(&self) -> Option<TokensSpec> {
        child(self.syntax())
    }

    pub fn options_spec(&self) -> Option<OptionsSpec> {
        child(self.syntax())
    }

    pub fn channels_spec(&self) -> Option<ChannelsSpec> {
        child(self.syntax())
    }

    pub fn named_actions(&self) -> impl Iterator<Item = NamedAction> + '_ {
        children(self.syntax())
    }

    pub fn rule_list(&self) -> Option<RuleList> {
        child(self.syntax())
    }
}

impl GrammarDecl {
    pub fn is_lexer(&self) -> bool {
        token(self.syntax(), SyntaxKind::KwLexer).is_some()
    }

    pub fn is_parser(&self) -> bool {
        token(self.syntax(), SyntaxKind::KwParser).is_some()
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::Id)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }
}

impl OptionsSpec {
    pub fn options(&self) -> impl Iterator<Item = OptionNode> + '_ {
        children(self.syntax())
    }
}

impl ImportDecl {
    pub fn refs(&self) -> impl Iterator<Item = ImportRef> + '_ {
        children(self.syntax())
    }
}

impl ImportRef {
    pub fn name(&self) -> Option<String> {
        token(self.syntax(), SyntaxKind::Id).map(|t| t.text().to_string())
    }
}

impl OptionNode {
    /// The option name, e.g. `superClass` in `superClass = MyGenerator;`.
    pub fn name(&self) -> Option<String> {
        token(self.syntax(), SyntaxKind::Id).map(|t| t.text().to_string())
    }

    /// The option's textual value, joining a dotted/`::`-qualified path
    /// back together (e.g. `a.b.C` stays `a.b.C`, not just `a`).
    pub fn value(&self) -> Option<String> {
        let mut parts: Vec<String> = self
            .syntax()
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .skip_while(|t| !matches!(t.kind(), SyntaxKind::Equals))
            .skip(1)
            .filter(|t| !t.kind().is_trivia())
            .take_while(|t| t.kind() != SyntaxKind::Semi)
            .map(|t| t.text().to_string())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.drain(..).collect::<String>())
        }
    }
}

impl TokensSpec {
    /// The identifiers declared inside `tokens { A, B, C }`.
    pub fn names(&self) -> Vec<String> {
        self.syntax()
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Id)
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl NamedAction {
    /// `@header` / `@members` / `@lexer::members` — the identifier path
    /// before the action block, joined with `::`.
    pub fn name(&self) -> String {
        self.syntax()
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Id)
            .map(|t| t.text().to_string())
            .collect::<Vec<_>>()
            .join("::")
    }

    pub fn content(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::ActionContent)
    }
}

impl RuleList {
    pub fn parser_rules(&self) -> impl Iterator<Item = ParserRuleSpec> + '_ {
        children(self.syntax())
    }

    pub fn lexer_rules(&self) -> impl Iterator<Item = LexerRuleSpec> + '_ {
        children(self.syntax())
    }
}

impl ParserRuleSpec {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::Id)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn block(&self) -> Option<RuleBlock> {
        child(self.syntax())
    }
}

impl LexerRuleSpec {
    pub fn is_fragment(&self) -> bool {
        token(self.syntax(), SyntaxKind::KwFragment).is_some()
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::Id)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn block(&self) -> Option<LexerRuleBlock> {
        child(self.syntax())
    }
}

impl RuleBlock {
    pub fn alt_list(&self) -> Option<RuleAltList> {
        child(self.syntax())
    }
}

impl LexerRuleBlock {
    pub fn alt_list(&self) -> Option<LexerAltList> {
        child(self.syntax())
    }
}

/// One arm of a `RuleAltList`: either a bare alternative or one wrapped
/// with a trailing `#Label`. Plain and labeled arms interleave freely in
/// source order, so they're surfaced through one iterator rather than
/// two, to preserve declaration order for alternation weight vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arm {
    Plain(Alternative),
    Labeled(LabeledAlt),
}

impl Arm {
    /// The underlying `Alternative`, whether or not it carries a label.
    pub fn alternative(&self) -> Option<Alternative> {
        match self {
            Arm::Plain(a) => Some(a.clone()),
            Arm::Labeled(l) => l.alternative(),
        }
    }

    pub fn label(&self) -> Option<String> {
        match self {
            Arm::Plain(_) => None,
            Arm::Labeled(l) => l.label(),
        }
    }
}

impl RuleAltList {
    /// All arms (plain and labeled) in source order.
    pub fn arms(&self) -> impl Iterator<Item = Arm> + '_ {
        self.syntax().children().filter_map(|n| {
            if let Some(l) = LabeledAlt::cast(n.clone()) {
                Some(Arm::Labeled(l))
            } else {
                Alternative::cast(n).map(Arm::Plain)
            }
        })
    }
}

impl LexerAltList {
    pub fn alts(&self) -> impl Iterator<Item = LexerAlt> + '_ {
        children(self.syntax())
    }
}

impl LabeledAlt {
    pub fn alternative(&self) -> Option<Alternative> {
        child(self.syntax())
    }

    pub fn label(&self) -> Option<String> {
        token(self.syntax(), SyntaxKind::Id).map(|t| t.text().to_string())
    }
}

impl Alternative {
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        children(self.syntax())
    }
}

impl LexerAlt {
    pub fn elements(&self) -> impl Iterator<Item = LexerElement> + '_ {
        children(self.syntax())
    }
}

impl Element {
    pub fn labeled_element(&self) -> Option<LabeledElement> {
        child(self.syntax())
    }

    pub fn ebnf(&self) -> Option<Ebnf> {
        child(self.syntax())
    }

    pub fn atom(&self) -> Option<Atom> {
        child(self.syntax())
    }

    /// A bare, unsuffixed `(...)` group. Suffixed groups surface through
    /// [`Ebnf::block`] instead.
    pub fn block(&self) -> Option<Block> {
        child(self.syntax())
    }

    pub fn action_block(&self) -> Option<ActionBlock> {
        child(self.syntax())
    }

    pub fn predicate(&self) -> Option<Predicate> {
        child(self.syntax())
    }
}

impl LexerElement {
    pub fn atom(&self) -> Option<Atom> {
        child(self.syntax())
    }

    pub fn ebnf(&self) -> Option<Ebnf> {
        child(self.syntax())
    }

    pub fn action_block(&self) -> Option<ActionBlock> {
        child(self.syntax())
    }

    pub fn predicate(&self) -> Option<Predicate> {
        child(self.syntax())
    }
}

impl LabeledElement {
    pub fn label(&self) -> Option<String> {
        token(self.syntax(), SyntaxKind::Id).map(|t| t.text().to_string())
    }

    pub fn is_list_label(&self) -> bool {
        token(self.syntax(), SyntaxKind::PlusEquals).is_some()
    }

    pub fn atom(&self) -> Option<Atom> {
        child(self.syntax())
    }

    pub fn block(&self) -> Option<Block> {
        child(self.syntax())
    }
}

impl Ebnf {
    pub fn block(&self) -> Option<Block> {
        child(self.syntax())
    }

    pub fn atom(&self) -> Option<Atom> {
        child(self.syntax())
    }

    /// Present when the suffixed element also carries a label, e.g. `x=ID?`.
    pub fn labeled_element(&self) -> Option<LabeledElement> {
        child(self.syntax())
    }

    pub fn suffix(&self) -> Option<EbnfSuffix> {
        child(self.syntax())
    }
}

impl EbnfSuffix {
    pub fn is_star(&self) -> bool {
        token(self.syntax(), SyntaxKind::Star).is_some()
    }

    pub fn is_plus(&self) -> bool {
        token(self.syntax(), SyntaxKind::Plus).is_some()
    }

    pub fn is_question(&self) -> bool {
        token(self.syntax(), SyntaxKind::Question).is_some()
    }

    /// `*?` / `+?`: a trailing `?` after a `*` or `+` marks non-greedy
    /// repetition. Two quantifier tokens appear on the suffix in that case.
    pub fn is_non_greedy(&self) -> bool {
        (self.is_star() || self.is_plus())
            && self
                .syntax()
                .children_with_tokens()
                .filter_map(|it| it.into_token())
                .filter(|t| t.kind() == SyntaxKind::Question)
                .count()
                > 0
    }
}

impl Block {
    pub fn alt_list(&self) -> Option<RuleAltList> {
        child(self.syntax())
    }
}

/// Dispatch target for atoms and standalone constructs the emitter
/// pattern-matches on directly, rather than re-deriving the kind from
/// `syntax().kind()` at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    RuleRef(RuleRef),
    Terminal(Terminal),
    CharSet(CharSet),
    CharRange(CharRange),
    NotSet(NotSet),
    Wildcard(Wildcard),
    Block(Block),
    ActionBlock(ActionBlock),
    Predicate(Predicate),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::RuleRef => RuleRef::cast(node).map(Expr::RuleRef),
            SyntaxKind::Terminal => Terminal::cast(node).map(Expr::Terminal),
            SyntaxKind::CharSet => CharSet::cast(node).map(Expr::CharSet),
            SyntaxKind::CharRange => CharRange::cast(node).map(Expr::CharRange),
            SyntaxKind::NotSet => NotSet::cast(node).map(Expr::NotSet),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Expr::Wildcard),
            SyntaxKind::Block => Block::cast(node).map(Expr::Block),
            SyntaxKind::ActionBlock => ActionBlock::cast(node).map(Expr::ActionBlock),
            SyntaxKind::Predicate => Predicate::cast(node).map(Expr::Predicate),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::RuleRef(n) => n.syntax(),
            Expr::Terminal(n) => n.syntax(),
            Expr::CharSet(n) => n.syntax(),
            Expr::CharRange(n) => n.syntax(),
            Expr::NotSet(n) => n.syntax(),
            Expr::Wildcard(n) => n.syntax(),
            Expr::Block(n) => n.syntax(),
            Expr::ActionBlock(n) => n.syntax(),
            Expr::Predicate(n) => n.syntax(),
        }
    }
}

impl Atom {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax().children().find_map(Expr::cast)
    }
}

impl Terminal {
    pub fn text(&self) -> Option<String> {
        token(self.syntax(), SyntaxKind::StringLiteral).map(|t| t.text().to_string())
    }
}

impl RuleRef {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::Id)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }
}

impl NotSet {
    pub fn set_element(&self) -> Option<SetElement> {
        child(self.syntax())
    }
}

impl SetElement {
    pub fn terminals(&self) -> impl Iterator<Item = Terminal> + '_ {
        children(self.syntax())
    }

    pub fn char_ranges(&self) -> impl Iterator<Item = CharRange> + '_ {
        children(self.syntax())
    }

    /// Every member (`'a'`, `'a'..'z'`, or a bracketed `[...]` run) in
    /// source order, for constructs like `~('a'|[0-9])` that mix forms.
    pub fn members(&self) -> impl Iterator<Item = SetMember> + '_ {
        self.syntax().children().filter_map(|n| {
            Terminal::cast(n.clone())
                .map(SetMember::Terminal)
                .or_else(|| CharRange::cast(n.clone()).map(SetMember::CharRange))
                .or_else(|| CharSet::cast(n).map(SetMember::CharSet))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetMember {
    Terminal(Terminal),
    CharRange(CharRange),
    CharSet(CharSet),
}

impl CharSet {
    /// The raw source text between `[` and `]`, e.g. `a-zA-Z_` for
    /// `[a-zA-Z_]`. The lexer has no special handling for bracket
    /// contents, so this is reconstructed token-by-token rather than
    /// read off a single literal.
    ///
    /// Only the *outer* `[`/`]` are dropped, positionally (first/last
    /// non-trivia token) rather than by kind: an escaped `\]` inside the
    /// set re-lexes as its own `BracketClose` token (the parser swallows
    /// it as the dangling `\`'s escaped character, not as the set's
    /// close), so filtering every `BracketClose` out by kind would also
    /// drop that escaped bracket from the text.
    pub fn text(&self) -> String {
        let tokens: Vec<_> = self
            .syntax()
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia())
            .collect();
        let last = tokens.len().saturating_sub(1);
        tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                !(*i == 0 && t.kind() == SyntaxKind::BracketOpen)
                    && !(*i == last && t.kind() == SyntaxKind::BracketClose)
            })
            .map(|(_, t)| t.text().to_string())
            .collect()
    }
}

impl CharRange {
    pub fn bounds(&self) -> Vec<String> {
        self.syntax()
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::StringLiteral)
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl ActionBlock {
    pub fn content(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::ActionContent)
    }
}

impl Predicate {
    pub fn content(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::ActionContent)
    }
}
