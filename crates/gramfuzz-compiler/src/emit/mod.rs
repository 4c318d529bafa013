//! Analyzer / emitter: walks the merged grammar tree once, building the
//! grammar graph and appending placeholder-laden fuzzer source text to two
//! growing buffers (`header`, `body`).
//!
//! One method per construct in the component design, dispatching on the
//! AST's tagged-union [`crate::parser::ast::Expr`] where a single atom can
//! be several things and on plain `match`/`if let` chains everywhere else.
//! Nothing here performs I/O or runs the depth solver — that's
//! [`crate::finalize`]'s job, once this module's walk is complete.

mod text;


use gramfuzz_core::graph::{GrammarGraph, NodeId};
use gramfuzz_core::utils::generator_class_name;
use gramfuzz_core::PlaceholderTable;
use indexmap::IndexMap;

use crate::loader::{MergedGrammar, NamedActionDef, RuleDef};
use crate::parser::ast::{
    Alternative, Arm, Block, Ebnf, Element, Expr, LabeledElement, LexerAlt, LexerAltList,
    LexerElement, RuleAltList, SetMember,
};
use crate::{Error, Result};

/// An edge referencing a never-allocated vertex means the emitter's own
/// bookkeeping is wrong, not that the input grammar is ill-formed.
fn emit_bug(err: gramfuzz_core::GraphError) -> Error {
    Error::InternalAssertion {
        message: err.to_string(),
    }
}

/// A labeled alternative (`alt #Label`) queued while walking its enclosing
/// rule's arms, drained into its own method once that rule's body is done.
struct PendingLabel {
    rule_vertex: NodeId,
    method_name: String,
    is_lexer: bool,
    elements_parser: Vec<Element>,
    elements_lexer: Vec<LexerElement>,
}

/// Everything the finalizer needs: the populated graph, the placeholder
/// table (already carrying every emit-time value), the four text buffers,
/// and the per-alternation condition texts the weight vectors are built
/// from once depths are known.
pub struct EmitOutput {
    pub graph: GrammarGraph,
    pub placeholders: PlaceholderTable,
    pub header_prefix: String,
    pub header: String,
    pub body_prefix: String,
    pub body: String,
    /// Alternation vertex name -> one condition expression per arm, in
    /// declaration order. Combined with the solved depth vector at
    /// finalize time into the emitted weight-list text.
    pub alt_conditions: IndexMap<String, Vec<String>>,
    pub generator_name: String,
}

pub struct Emitter {
    no_actions: bool,
    graph: GrammarGraph,
    placeholders: PlaceholderTable,
    header: String,
    body: String,
    alt_conditions: IndexMap<String, Vec<String>>,
    labeled_alts: Vec<PendingLabel>,
    current_start_range: Option<Vec<(u32, u32)>>,
    token_start_ranges: IndexMap<String, Vec<(u32, u32)>>,
}

impl Emitter {
    pub fn new(no_actions: bool) -> Self {
        Self {
            no_actions,
            graph: GrammarGraph::new(),
            placeholders: PlaceholderTable::new(),
            header: String::new(),
            body: String::new(),
            alt_conditions: IndexMap::new(),
            labeled_alts: Vec::new(),
            current_start_range: None,
            token_start_ranges: IndexMap::new(),
        }
    }

    pub fn emit_grammar(mut self, grammar: &MergedGrammar) -> Result<EmitOutput> {
        let generator_name = generator_class_name(&grammar.name);
        let (header_prefix, body_prefix) = self.build_prefixes(grammar, &generator_name);

        for name in &grammar.implicit_tokens {
            self.emit_implicit_token(name);
        }

        for action in &grammar.named_actions {
            self.emit_named_action(action);
        }

        self.body.push_str("    def EOF(self):\n        pass\n\n");

        for (name, def) in &grammar.rules {
            self.emit_rule(name, def)?;
        }

        let is_combined_or_parser = !grammar.is_lexer;
        if is_combined_or_parser {
            if let Some(first) = grammar.first_parser_rule() {
                self.body.push_str(&format!("\ndefault_rule = {first}\n"));
            }
        }

        Ok(EmitOutput {
            graph: self.graph,
            placeholders: self.placeholders,
            header_prefix,
            header: self.header,
            body_prefix,
            body: self.body,
            alt_conditions: self.alt_conditions,
            generator_name,
        })
    }

    fn build_prefixes(&self, grammar: &MergedGrammar, generator_name: &str) -> (String, String) {
        let mut header_prefix = String::new();
        header_prefix.push_str("# Generated by gramfuzz-compiler. Do not edit by hand.\n");
        header_prefix.push_str("from itertools import chain\n");
        header_prefix.push_str("from math import inf\n");
        header_prefix.push_str("from grammarinator.runtime import *\n");

        let super_class = grammar
            .options
            .get("superClass")
            .cloned()
            .unwrap_or_else(|| "Generator".to_string());
        if super_class != "Generator" {
            header_prefix.push_str(&format!(
                "# `{super_class}` must be importable from the module that invokes this generator.\n"
            ));
        }

        let mut body_prefix = String::new();
        body_prefix.push_str(&format!("class {generator_name}({super_class}):\n"));
        body_prefix.push_str("    def __init__(self, *args, **kwargs):\n");
        body_prefix.push_str(&format!(
            "        super({generator_name}, self).__init__(*args, **kwargs)\n"
        ));
        if let Some(dot) = grammar.options.get("dot") {
            body_prefix.push_str(&format!("        self.any_char = self.{dot}\n"));
        }
        body_prefix.push('\n');

        (header_prefix, body_prefix)
    }

    fn emit_implicit_token(&mut self, name: &str) {
        self.graph.rule(name);
        self.body.push_str(&format!("    def {name}(self):\n"));
        self.body.push_str(&format!(
            "        current = self.create_node(UnlexerRule(name='{name}'))\n"
        ));
        self.body.push_str("        return current\n\n");
    }

    fn emit_named_action(&mut self, action: &NamedActionDef) {
        let Some(content) = &action.content else { return };
        if self.no_actions {
            return;
        }
        let tag = action.name.rsplit("::").next().unwrap_or(action.name.as_str());
        match tag {
            "header" => {
                let key = self.placeholders.fresh("action");
                self.placeholders.set(&key, content.as_str());
                self.header.push_str(&format!("{{{key}}}\n"));
            }
            "member" | "members" => {
                let key = self.placeholders.fresh("action");
                self.placeholders.set(&key, text::reindent(content, "    "));
                self.body.push_str(&format!("    {{{key}}}\n"));
            }
            _ => {}
        }
    }

    // ---- rules ----------------------------------------------------------

    fn emit_rule(&mut self, name: &str, def: &RuleDef) -> Result<()> {
        let rule_id = self.graph.rule(name);
        let is_lexer_rule = matches!(def, RuleDef::Lexer(_));
        let ctor = if is_lexer_rule { "UnlexerRule" } else { "UnparserRule" };

        self.body.push_str("    @depthcontrol\n");
        self.body.push_str(&format!("    def {name}(self):\n"));

        let body_text = self.with_scratch_body(|this| {
            this.body
                .push_str(&format!("        current = self.create_node({ctor}(name='{name}'))\n"));

            if is_lexer_rule {
                this.current_start_range = Some(Vec::new());
            }

            match def {
                RuleDef::Parser(spec) => {
                    if let Some(block) = spec.block() {
                        if let Some(alts) = block.alt_list() {
                            this.emit_rule_alt_list(name, rule_id, &alts, 2)?;
                        }
                    } else {
                        this.body.push_str("        current += UnlexerRule(src='')\n");
                    }
                }
                RuleDef::Lexer(spec) => {
                    if let Some(block) = spec.block() {
                        if let Some(alts) = block.alt_list() {
                            this.emit_lexer_alt_list(name, rule_id, &alts, 2)?;
                        }
                    } else {
                        this.body.push_str("        current += UnlexerRule(src='')\n");
                    }
                }
            }

            if is_lexer_rule {
                if let Some(ranges) = this.current_start_range.take() {
                    if !ranges.is_empty() {
                        this.token_start_ranges.insert(name.to_string(), ranges);
                    }
                }
            }

            this.body.push_str("        return current\n");
            Ok(())
        })?;

        if body_text.contains("local_ctx[") || body_text.contains("local_ctx.") {
            self.body.push_str("        local_ctx = dict()\n");
        }
        self.body.push_str(&body_text);
        self.body.push_str(&format!("    {name}.min_depth = {{{name}}}\n\n"));

        self.drain_labeled_alts()?;

        Ok(())
    }

    /// Runs `f` against a fresh, empty `self.body`, then restores the prior
    /// buffer and returns what `f` appended. Lets a caller inspect a method
    /// body's own text (e.g. whether it references `local_ctx`) before
    /// deciding what to prepend, without the prepended line itself showing
    /// up in that inspection.
    fn with_scratch_body<F>(&mut self, f: F) -> Result<String>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let saved = std::mem::take(&mut self.body);
        let result = f(self);
        let produced = std::mem::replace(&mut self.body, saved);
        result?;
        Ok(produced)
    }

    fn drain_labeled_alts(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.labeled_alts);
        for label in pending {
            let name = self.graph.name_of(label.rule_vertex).to_string();
            self.body.push_str("    @depthcontrol\n");
            self.body.push_str(&format!("    def {}(self):\n", label.method_name));

            let body_text = self.with_scratch_body(|this| {
                this.body.push_str(&format!(
                    "        current = self.create_node(UnparserRule(name='{}'))\n",
                    label.method_name
                ));
                if label.is_lexer {
                    for el in &label.elements_lexer {
                        this.emit_lexer_element(&label.method_name, label.rule_vertex, el, 2)?;
                    }
                } else {
                    for el in &label.elements_parser {
                        this.emit_element(&label.method_name, label.rule_vertex, el, 2)?;
                    }
                }
                this.body.push_str("        return current\n");
                Ok(())
            })?;

            if body_text.contains("local_ctx[") || body_text.contains("local_ctx.") {
                self.body.push_str("        local_ctx = dict()\n");
            }
            self.body.push_str(&body_text);
            self.body
                .push_str(&format!("    {}.min_depth = {{{name}}}\n\n", label.method_name));
        }
        Ok(())
    }

    // ---- alt lists (parser side) ----------------------------------------

    fn emit_rule_alt_list(
        &mut self,
        rule: &str,
        parent: NodeId,
        alt_list: &RuleAltList,
        indent: usize,
    ) -> Result<()> {
        let arms: Vec<Arm> = alt_list.arms().collect();
        if arms.len() <= 1 {
            if let Some(arm) = arms.into_iter().next() {
                self.emit_arm_body(rule, parent, &arm, indent)?;
            }
            return Ok(());
        }

        let alt_name = self.placeholders.fresh("alt");
        self.graph.alternation(&alt_name);
        self.graph.add_edge(parent, self.graph.rule_id(&alt_name).unwrap())
            .map_err(emit_bug)?;

        let mut conditions = Vec::with_capacity(arms.len());
        let pad = "    ".repeat(indent);
        self.body
            .push_str(&format!("{pad}choice = self.model.choice('{alt_name}', {{{alt_name}}})\n"));

        for (i, arm) in arms.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            self.body.push_str(&format!("{pad}{keyword} choice == {i}:\n"));
            let condition = self.find_arm_condition(arm);
            conditions.push(condition);

            match arm {
                Arm::Labeled(labeled) => {
                    let label = labeled.label().unwrap_or_default();
                    let method_name = format!("{rule}_{label}");
                    let label_vertex = self.graph.rule(&method_name);
                    let arm_name = format!("{alt_name}_{i}");
                    let arm_vertex = self.graph.alternative(&arm_name);
                    self.graph
                        .add_edge(self.graph.rule_id(&alt_name).unwrap(), arm_vertex)
                        .map_err(emit_bug)?;
                    self.graph.add_edge(arm_vertex, label_vertex).map_err(emit_bug)?;
                    self.body
                        .push_str(&format!("{pad}    current = self.{method_name}()\n"));
                    let elements: Vec<Element> = labeled
                        .alternative()
                        .map(|a| a.elements().collect())
                        .unwrap_or_default();
                    self.labeled_alts.push(PendingLabel {
                        rule_vertex: label_vertex,
                        method_name,
                        is_lexer: false,
                        elements_parser: elements,
                        elements_lexer: Vec::new(),
                    });
                }
                Arm::Plain(alt) => {
                    let arm_name = format!("{alt_name}_{i}");
                    let arm_vertex = self.graph.alternative(&arm_name);
                    self.graph.add_edge(self.graph.rule_id(&alt_name).unwrap(), arm_vertex)
                        .map_err(emit_bug)?;
                    self.emit_alternative(rule, arm_vertex, alt, indent + 1)?;
                }
            }
        }

        self.alt_conditions.insert(alt_name, conditions);
        Ok(())
    }

    fn emit_arm_body(&mut self, rule: &str, parent: NodeId, arm: &Arm, indent: usize) -> Result<()> {
        match arm {
            Arm::Plain(alt) => self.emit_alternative(rule, parent, alt, indent),
            Arm::Labeled(labeled) => {
                let label = labeled.label().unwrap_or_default();
                let method_name = format!("{rule}_{label}");
                let label_vertex = self.graph.rule(&method_name);
                self.graph.add_edge(parent, label_vertex).map_err(emit_bug)?;
                let pad = "    ".repeat(indent);
                self.body.push_str(&format!("{pad}current = self.{method_name}()\n"));
                let elements: Vec<Element> = labeled
                    .alternative()
                    .map(|a| a.elements().collect())
                    .unwrap_or_default();
                self.labeled_alts.push(PendingLabel {
                    rule_vertex: label_vertex,
                    method_name,
                    is_lexer: false,
                    elements_parser: elements,
                    elements_lexer: Vec::new(),
                });
                Ok(())
            }
        }
    }

    fn find_arm_condition(&self, arm: &Arm) -> String {
        if self.no_actions {
            return "1".to_string();
        }
        let Some(alt) = arm.alternative() else { return "1".to_string() };
        match alt.elements().next().and_then(|e| e.predicate()) {
            Some(pred) => pred
                .content()
                .map(|t| t.text().to_string())
                .unwrap_or_else(|| "1".to_string()),
            None => "1".to_string(),
        }
    }

    fn emit_alternative(
        &mut self,
        rule: &str,
        parent: NodeId,
        alt: &Alternative,
        indent: usize,
    ) -> Result<()> {
        let pad = "    ".repeat(indent);
        let elements: Vec<Element> = alt.elements().collect();
        if elements.is_empty() {
            self.body.push_str(&format!("{pad}current += UnlexerRule(src='')\n"));
            return Ok(());
        }
        for el in &elements {
            self.emit_element(rule, parent, el, indent)?;
        }
        Ok(())
    }

    fn emit_element(&mut self, rule: &str, parent: NodeId, el: &Element, indent: usize) -> Result<()> {
        if let Some(ebnf) = el.ebnf() {
            return self.emit_ebnf(rule, parent, &ebnf, indent);
        }
        if let Some(labeled) = el.labeled_element() {
            return self.emit_labeled_element(rule, parent, &labeled, indent);
        }
        if let Some(block) = el.block() {
            return self.emit_block(rule, parent, &block, indent);
        }
        if let Some(atom) = el.atom() {
            if let Some(expr) = atom.expr() {
                return self.emit_expr(rule, parent, &expr, indent);
            }
            return Ok(());
        }
        if let Some(action) = el.action_block() {
            self.emit_action_block(&action, indent);
            return Ok(());
        }
        // A bare predicate not in prefix position is dropped entirely.
        Ok(())
    }

    fn emit_ebnf(&mut self, rule: &str, parent: NodeId, ebnf: &Ebnf, indent: usize) -> Result<()> {
        let suffix = ebnf.suffix();
        let is_star = suffix.as_ref().map(|s| s.is_star()).unwrap_or(false);
        let is_plus = suffix.as_ref().map(|s| s.is_plus()).unwrap_or(false);
        let is_question = suffix.as_ref().map(|s| s.is_question()).unwrap_or(false);

        let pad = "    ".repeat(indent);

        let (min_depth_text, quantify_args, quant_vertex) = if is_question {
            let name = self.placeholders.fresh("quant");
            let id = self.graph.quantifier(&name);
            self.graph.add_edge(parent, id).map_err(emit_bug)?;
            (format!("{{{name}}}"), "min=0, max=1", Some(id))
        } else if is_star {
            let name = self.placeholders.fresh("quant");
            let id = self.graph.quantifier(&name);
            self.graph.add_edge(parent, id).map_err(emit_bug)?;
            (format!("{{{name}}}"), "min=0, max=inf", Some(id))
        } else if is_plus {
            ("0".to_string(), "min=1, max=inf", None)
        } else {
            (String::new(), "", None)
        };

        if quantify_args.is_empty() {
            // No suffix actually present (shouldn't happen for a real Ebnf
            // node, but fall through gracefully to unquantified emission).
            return self.emit_ebnf_inner(rule, parent, ebnf, indent);
        }

        self.body
            .push_str(&format!("{pad}if self.max_depth >= {min_depth_text}:\n"));
        self.body
            .push_str(&format!("{pad}    for _ in self.model.quantify({quantify_args}):\n"));
        let inner_parent = quant_vertex.unwrap_or(parent);
        self.emit_ebnf_inner(rule, inner_parent, ebnf, indent + 2)
    }

    fn emit_ebnf_inner(&mut self, rule: &str, parent: NodeId, ebnf: &Ebnf, indent: usize) -> Result<()> {
        if let Some(labeled) = ebnf.labeled_element() {
            return self.emit_labeled_element(rule, parent, &labeled, indent);
        }
        if let Some(block) = ebnf.block() {
            return self.emit_block(rule, parent, &block, indent);
        }
        if let Some(atom) = ebnf.atom() {
            if let Some(expr) = atom.expr() {
                return self.emit_expr(rule, parent, &expr, indent);
            }
        }
        Ok(())
    }

    fn emit_labeled_element(
        &mut self,
        rule: &str,
        parent: NodeId,
        labeled: &LabeledElement,
        indent: usize,
    ) -> Result<()> {
        if let Some(atom) = labeled.atom() {
            if let Some(expr) = atom.expr() {
                self.emit_expr(rule, parent, &expr, indent)?;
            }
        } else if let Some(block) = labeled.block() {
            self.emit_block(rule, parent, &block, indent)?;
        }
        let pad = "    ".repeat(indent);
        if let Some(name) = labeled.label() {
            if labeled.is_list_label() {
                self.body.push_str(&format!(
                    "{pad}local_ctx.setdefault('{name}', []).append(current.last_child)\n"
                ));
            } else {
                self.body
                    .push_str(&format!("{pad}local_ctx['{name}'] = current.last_child\n"));
            }
        }
        Ok(())
    }

    fn emit_block(&mut self, rule: &str, parent: NodeId, block: &Block, indent: usize) -> Result<()> {
        if let Some(alts) = block.alt_list() {
            self.emit_rule_alt_list(rule, parent, &alts, indent)?;
        }
        Ok(())
    }

    fn emit_action_block(&mut self, action: &crate::parser::ast::ActionBlock, indent: usize) {
        if self.no_actions {
            return;
        }
        let pad = "    ".repeat(indent);
        let Some(content) = action.content() else { return };
        let rewritten = text::rewrite_dollar_vars(content.text());
        let key = self.placeholders.fresh("action");
        self.placeholders.set(&key, text::reindent(&rewritten, &pad));
        self.body.push_str(&format!("{pad}{{{key}}}\n"));
    }

    fn emit_expr(&mut self, rule: &str, parent: NodeId, expr: &Expr, indent: usize) -> Result<()> {
        let pad = "    ".repeat(indent);
        match expr {
            Expr::Wildcard(_) => {
                self.body
                    .push_str(&format!("{pad}current += UnlexerRule(src=self.any_char())\n"));
            }
            Expr::RuleRef(r) => {
                let name = r.name().unwrap_or_default();
                let target = self.graph.rule(&name);
                self.graph.add_edge(parent, target).map_err(emit_bug)?;
                self.body.push_str(&format!("{pad}current += self.{name}()\n"));
            }
            Expr::Terminal(t) => {
                let raw = t.text().unwrap_or_default();
                let inner = text::strip_quotes(&raw);
                if self.current_start_range.is_some() {
                    let cp = text::first_raw_char_codepoint(&raw);
                    self.current_start_range.as_mut().unwrap().push((cp, cp + 1));
                }
                let key = self.placeholders.fresh("lit");
                self.placeholders.set(&key, format!("'{inner}'"));
                self.body
                    .push_str(&format!("{pad}current += self.create_node(UnlexerRule(src={{{key}}}))\n"));
            }
            Expr::CharRange(cr) => {
                let bounds = cr.bounds();
                let (lo, hi) = match bounds.as_slice() {
                    [a, b] => (text::char_literal_codepoint(a), text::char_literal_codepoint(b)),
                    _ => (0, 0),
                };
                if self.current_start_range.is_some() {
                    self.current_start_range.as_mut().unwrap().push((lo, hi + 1));
                }
                self.body.push_str(&format!(
                    "{pad}current += self.create_node(UnlexerRule(src=self.char_from_list(range({lo}, {}))))\n",
                    hi + 1
                ));
            }
            Expr::CharSet(cs) => {
                let intervals = text::lexer_charset_intervals(&cs.text());
                if self.current_start_range.is_some() {
                    self.current_start_range.as_mut().unwrap().extend(intervals.iter().copied());
                }
                let ranges_src = intervals
                    .iter()
                    .map(|(lo, hi)| format!("range({lo}, {hi})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let name = self.placeholders.fresh("charset");
                self.header
                    .push_str(&format!("{name} = list(chain({ranges_src}))\n"));
                self.body.push_str(&format!(
                    "{pad}current += self.create_node(UnlexerRule(src=self.char_from_list({name})))\n"
                ));
            }
            Expr::NotSet(ns) => {
                let mut excluded = Vec::new();
                if let Some(set) = ns.set_element() {
                    for member in set.members() {
                        match member {
                            SetMember::Terminal(t) => {
                                let raw = t.text().unwrap_or_default();
                                let cp = text::char_literal_codepoint(&raw);
                                excluded.push((cp, cp + 1));
                            }
                            SetMember::CharRange(cr) => {
                                let bounds = cr.bounds();
                                if let [a, b] = bounds.as_slice() {
                                    let lo = text::char_literal_codepoint(a);
                                    let hi = text::char_literal_codepoint(b);
                                    excluded.push((lo, hi + 1));
                                }
                            }
                            SetMember::CharSet(cset) => {
                                excluded.extend(text::lexer_charset_intervals(&cset.text()));
                            }
                        }
                    }
                }
                let exclusion_src = excluded
                    .iter()
                    .map(|(lo, hi)| format!("({lo}, {hi})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let name = self.placeholders.fresh("charset");
                self.header.push_str(&format!(
                    "{name} = list(chain(*multirange_diff(printable_unicode_ranges, [{exclusion_src}])))\n"
                ));
                self.body.push_str(&format!(
                    "{pad}current += self.create_node(UnlexerRule(src=self.char_from_list({name})))\n"
                ));
            }
            Expr::Block(block) => {
                self.emit_block(rule, parent, block, indent)?;
            }
            Expr::ActionBlock(action) => {
                self.emit_action_block(action, indent);
            }
            Expr::Predicate(_) => {
                // Standalone predicate, not in alternative-prefix position: dropped.
            }
        }
        Ok(())
    }

    // ---- alt lists (lexer side) -------------------------------------------

    fn emit_lexer_alt_list(
        &mut self,
        rule: &str,
        parent: NodeId,
        alt_list: &LexerAltList,
        indent: usize,
    ) -> Result<()> {
        let alts: Vec<LexerAlt> = alt_list.alts().collect();
        if alts.len() <= 1 {
            if let Some(alt) = alts.into_iter().next() {
                self.emit_lexer_alt(rule, parent, &alt, indent)?;
            }
            return Ok(());
        }

        let alt_name = self.placeholders.fresh("alt");
        self.graph.alternation(&alt_name);
        self.graph
            .add_edge(parent, self.graph.rule_id(&alt_name).unwrap())
            .map_err(emit_bug)?;

        let pad = "    ".repeat(indent);
        self.body
            .push_str(&format!("{pad}choice = self.model.choice('{alt_name}', {{{alt_name}}})\n"));

        let mut conditions = Vec::with_capacity(alts.len());
        for (i, alt) in alts.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            self.body.push_str(&format!("{pad}{keyword} choice == {i}:\n"));
            conditions.push(self.find_lexer_alt_condition(alt));

            let arm_name = format!("{alt_name}_{i}");
            let arm_vertex = self.graph.alternative(&arm_name);
            self.graph
                .add_edge(self.graph.rule_id(&alt_name).unwrap(), arm_vertex)
                .map_err(emit_bug)?;
            self.emit_lexer_alt(rule, arm_vertex, alt, indent + 1)?;
        }

        self.alt_conditions.insert(alt_name, conditions);
        Ok(())
    }

    fn find_lexer_alt_condition(&self, alt: &LexerAlt) -> String {
        if self.no_actions {
            return "1".to_string();
        }
        match alt.elements().next().and_then(|e| e.predicate()) {
            Some(pred) => pred
                .content()
                .map(|t| t.text().to_string())
                .unwrap_or_else(|| "1".to_string()),
            None => "1".to_string(),
        }
    }

    fn emit_lexer_alt(&mut self, rule: &str, parent: NodeId, alt: &LexerAlt, indent: usize) -> Result<()> {
        let pad = "    ".repeat(indent);
        let elements: Vec<LexerElement> = alt.elements().collect();
        if elements.is_empty() {
            self.body.push_str(&format!("{pad}current += UnlexerRule(src='')\n"));
            return Ok(());
        }
        for el in &elements {
            self.emit_lexer_element(rule, parent, el, indent)?;
        }
        Ok(())
    }

    fn emit_lexer_element(
        &mut self,
        rule: &str,
        parent: NodeId,
        el: &LexerElement,
        indent: usize,
    ) -> Result<()> {
        if let Some(ebnf) = el.ebnf() {
            return self.emit_ebnf(rule, parent, &ebnf, indent);
        }
        if let Some(atom) = el.atom() {
            if let Some(expr) = atom.expr() {
                return self.emit_expr(rule, parent, &expr, indent);
            }
            return Ok(());
        }
        if let Some(action) = el.action_block() {
            self.emit_action_block(&action, indent);
        }
        Ok(())
    }
}
