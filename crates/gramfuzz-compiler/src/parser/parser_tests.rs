//! Parser conformance tests, grouped by grammar construct.

use indoc::indoc;

use super::parse;
use crate::parser::ast::{AstNode, Arm, Expr, Root, SetMember};

fn root(source: &str) -> Root {
    let output = parse(source);
    assert!(
        output.errors.is_empty(),
        "unexpected parse errors for {source:?}: {:?}",
        output.errors
    );
    Root::cast(output.syntax()).expect("a Root node")
}

#[test]
fn parses_a_combined_grammar_header() {
    let r = root("grammar Calc;\n");
    let decl = r.grammar_decl().unwrap();
    assert!(!decl.is_lexer());
    assert!(!decl.is_parser());
    assert_eq!(decl.name().as_deref(), Some("Calc"));
}

#[test]
fn parses_lexer_and_parser_grammar_headers() {
    let lexer = root("lexer grammar FooLexer;\n");
    assert!(lexer.grammar_decl().unwrap().is_lexer());

    let parser = root("parser grammar FooParser;\n");
    assert!(parser.grammar_decl().unwrap().is_parser());
}

#[test]
fn parses_an_import_declaration_with_multiple_refs() {
    let r = root("grammar A;\nimport B, C;\n");
    let imports: Vec<_> = r.imports().collect();
    assert_eq!(imports.len(), 1);
    let names: Vec<String> = imports[0].refs().filter_map(|i| i.name()).collect();
    assert_eq!(names, vec!["B".to_string(), "C".to_string()]);
}

#[test]
fn parses_a_tokens_block() {
    let r = root("grammar A;\ntokens { FOO, BAR } \n");
    let spec = r.tokens_spec().unwrap();
    assert_eq!(spec.names(), vec!["FOO".to_string(), "BAR".to_string()]);
}

#[test]
fn parses_a_channels_block() {
    let r = root("grammar A;\nchannels { HIDDEN_CHANNEL }\n");
    assert!(r.channels_spec().is_some());
}

#[test]
fn parses_an_options_spec() {
    let r = root("grammar A;\noptions { superClass = MyGenerator; }\n");
    let option = r.options_spec().unwrap().options().next().unwrap();
    assert_eq!(option.name().as_deref(), Some("superClass"));
    assert_eq!(option.value().as_deref(), Some("MyGenerator"));
}

#[test]
fn parses_a_named_action() {
    let r = root("grammar A;\n@header { import sys }\n");
    let action = r.named_actions().next().unwrap();
    assert_eq!(action.name(), "header");
    assert_eq!(action.content().unwrap().text(), " import sys ");
}

#[test]
fn parses_a_qualified_named_action() {
    let r = root("grammar A;\n@lexer::members { x = 1 }\n");
    let action = r.named_actions().next().unwrap();
    assert_eq!(action.name(), "lexer::members");
}

#[test]
fn parses_a_plain_alternation() {
    let r = root("grammar A;\nr : 'a' | 'b' ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    assert_eq!(rule.name().as_deref(), Some("r"));

    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    assert_eq!(arms.len(), 2);
    for arm in &arms {
        assert!(matches!(arm, Arm::Plain(_)));
    }

    let first_elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    assert_eq!(first_elements.len(), 1);
    let Expr::Terminal(t) = first_elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a terminal atom");
    };
    assert_eq!(t.text().as_deref(), Some("'a'"));
}

#[test]
fn parses_labeled_alternatives() {
    let r = root("grammar A;\nr : 'a' #Lit | r 'b' #Rec ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    assert_eq!(arms.len(), 2);

    for arm in &arms {
        assert!(matches!(arm, Arm::Labeled(_)));
    }
    assert_eq!(arms[0].label().as_deref(), Some("Lit"));
    assert_eq!(arms[1].label().as_deref(), Some("Rec"));

    let second_elements: Vec<_> = arms[1].alternative().unwrap().elements().collect();
    assert_eq!(second_elements.len(), 2);
    assert!(matches!(
        second_elements[0].atom().unwrap().expr().unwrap(),
        Expr::RuleRef(_)
    ));
    assert!(matches!(
        second_elements[1].atom().unwrap().expr().unwrap(),
        Expr::Terminal(_)
    ));
}

#[test]
fn parses_every_quantifier_suffix() {
    let r = root("grammar A;\nr : 'a'? 'b'* 'c'+ ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    assert_eq!(elements.len(), 3);

    let question = elements[0].ebnf().unwrap().suffix().unwrap();
    assert!(question.is_question());
    assert!(!question.is_star());
    assert!(!question.is_plus());

    let star = elements[1].ebnf().unwrap().suffix().unwrap();
    assert!(star.is_star());
    assert!(!star.is_non_greedy());

    let plus = elements[2].ebnf().unwrap().suffix().unwrap();
    assert!(plus.is_plus());
}

#[test]
fn parses_a_non_greedy_star() {
    let r = root("grammar A;\nr : 'a'*? ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    let suffix = elements[0].ebnf().unwrap().suffix().unwrap();
    assert!(suffix.is_star());
    assert!(suffix.is_non_greedy());
}

#[test]
fn parses_a_bracketed_char_set_lexer_rule() {
    let r = root("lexer grammar L;\nFOO : [a-zA-Z_] ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    assert_eq!(rule.name().as_deref(), Some("FOO"));
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    let elements: Vec<_> = alts[0].elements().collect();
    let Expr::CharSet(cs) = elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a char set atom");
    };
    assert_eq!(cs.text(), "a-zA-Z_");
}

#[test]
fn parses_a_bracketed_char_set_with_an_escaped_bracket() {
    let r = root("lexer grammar L;\nESC : [\\]] ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    let elements: Vec<_> = alts[0].elements().collect();
    let Expr::CharSet(cs) = elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a char set atom");
    };
    assert_eq!(cs.text(), "\\]");
}

#[test]
fn parses_a_negated_bracketed_set() {
    let r = root("lexer grammar L;\nFOO : ~[ab] ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    let elements: Vec<_> = alts[0].elements().collect();
    let Expr::NotSet(ns) = elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a negated set atom");
    };
    let members: Vec<SetMember> = ns.set_element().unwrap().members().collect();
    assert_eq!(members.len(), 1);
    assert!(matches!(members[0], SetMember::CharSet(_)));
}

#[test]
fn parses_a_top_level_char_range() {
    let r = root("lexer grammar L;\nDIGIT : '0'..'9' ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    let elements: Vec<_> = alts[0].elements().collect();
    let Expr::CharRange(cr) = elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a char range atom");
    };
    assert_eq!(cr.bounds(), vec!["'0'".to_string(), "'9'".to_string()]);
}

#[test]
fn parses_a_negated_char_range() {
    let r = root("lexer grammar L;\nFOO : ~'a'..'z' ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    let elements: Vec<_> = alts[0].elements().collect();
    let Expr::NotSet(ns) = elements[0].atom().unwrap().expr().unwrap() else {
        panic!("expected a negated set atom");
    };
    let members: Vec<SetMember> = ns.set_element().unwrap().members().collect();
    assert_eq!(members.len(), 1);
    let SetMember::CharRange(cr) = &members[0] else {
        panic!("expected a char range member");
    };
    assert_eq!(cr.bounds(), vec!["'a'".to_string(), "'z'".to_string()]);
}

#[test]
fn parses_a_wildcard_atom() {
    let r = root("grammar A;\nr : . ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    assert!(matches!(
        elements[0].atom().unwrap().expr().unwrap(),
        Expr::Wildcard(_)
    ));
}

#[test]
fn parses_a_prefix_predicate_and_a_trailing_action() {
    let r = root("grammar A;\nr : {1==1}? 'a' {foo()} ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    assert_eq!(elements.len(), 3);

    let predicate = elements[0].predicate().unwrap();
    assert_eq!(predicate.content().unwrap().text(), "1==1");

    let Expr::Terminal(t) = elements[1].atom().unwrap().expr().unwrap() else {
        panic!("expected a terminal atom");
    };
    assert_eq!(t.text().as_deref(), Some("'a'"));

    let action = elements[2].action_block().unwrap();
    assert_eq!(action.content().unwrap().text(), "foo()");
}

#[test]
fn parses_an_empty_alternative() {
    let r = root("grammar A;\nr : ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    assert_eq!(arms.len(), 1);
    assert_eq!(arms[0].alternative().unwrap().elements().count(), 0);
}

#[test]
fn parses_a_labeled_element() {
    let r = root("grammar A;\nr : name=ID ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    let labeled = elements[0].labeled_element().unwrap();
    assert_eq!(labeled.label().as_deref(), Some("name"));
    assert!(!labeled.is_list_label());
}

#[test]
fn parses_a_list_labeled_element() {
    let r = root("grammar A;\nr : items+=ID ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    let labeled = elements[0].labeled_element().unwrap();
    assert!(labeled.is_list_label());
}

#[test]
fn parses_a_parenthesized_block() {
    let r = root("grammar A;\nr : ('a' | 'b') 'c' ;\n");
    let rule = r.rule_list().unwrap().parser_rules().next().unwrap();
    let arms: Vec<Arm> = rule.block().unwrap().alt_list().unwrap().arms().collect();
    let elements: Vec<_> = arms[0].alternative().unwrap().elements().collect();
    assert_eq!(elements.len(), 2);
    let block = elements[0].block().unwrap();
    let inner_arms: Vec<Arm> = block.alt_list().unwrap().arms().collect();
    assert_eq!(inner_arms.len(), 2);
}

#[test]
fn parses_a_fragment_lexer_rule() {
    let r = root("lexer grammar L;\nfragment DIGIT : [0-9] ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    assert!(rule.is_fragment());
    assert_eq!(rule.name().as_deref(), Some("DIGIT"));
}

#[test]
fn parses_lexer_commands_without_modeling_them() {
    let r = root("lexer grammar L;\nWS : [ \\t\\r\\n]+ -> skip ;\n");
    let rule = r.rule_list().unwrap().lexer_rules().next().unwrap();
    let alts: Vec<_> = rule.block().unwrap().alt_list().unwrap().alts().collect();
    assert_eq!(alts.len(), 1);
    let elements: Vec<_> = alts[0].elements().collect();
    assert_eq!(elements.len(), 1);
}

#[test]
fn parses_a_full_grammar_with_options_actions_and_several_rules() {
    let source = indoc! {r#"
        grammar Expr;

        options { superClass = BaseGenerator; }

        @header {
            import expr_helpers
        }

        expr : term (('+' | '-') term)* ;
        term : factor (('*' | '/') factor)* ;
        factor : INT | '(' expr ')' ;

        INT : [0-9]+ ;
        WS : [ \t\r\n]+ -> skip ;
    "#};

    let r = root(source);
    assert_eq!(r.grammar_decl().unwrap().name().as_deref(), Some("Expr"));
    assert_eq!(
        r.options_spec().unwrap().options().next().unwrap().value().as_deref(),
        Some("BaseGenerator")
    );
    assert_eq!(r.named_actions().count(), 1);

    let rules = r.rule_list().unwrap();
    let parser_rule_names: Vec<String> = rules
        .parser_rules()
        .filter_map(|rule| rule.name())
        .collect();
    assert_eq!(parser_rule_names, vec!["expr", "term", "factor"]);

    let lexer_rule_names: Vec<String> = rules
        .lexer_rules()
        .filter_map(|rule| rule.name())
        .collect();
    assert_eq!(lexer_rule_names, vec!["INT", "WS"]);
}
