// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Parser for CTL properties.

use crate::syntax::CtlTerm;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use peg::{error::ParseError, str::LineCol};

peg::parser! {

grammar parser() for str {
    rule ident_start() = ['a'..='z' | 'A'..='Z' | '_']
    rule ident_char() = ident_start() / ['0'..='9']
    pub(super) rule ident() -> String
    = s:$(quiet!{ident_start() ident_char()*} / expected!("identifier"))
    { s.to_string() }

    rule whitespace() = quiet!{ [' ' | '\t' | '\n' | '\r'] }
    rule word_boundary() = !ident_char()
    rule _ = whitespace()*
    rule __ = word_boundary() _

    pub(super) rule term() -> CtlTerm = precedence!{
        x:@ _ "->" _ y:(@) { CtlTerm::Implies(Box::new(x), Box::new(y)) }
        x:(@) _ "<->" _ y:@ { CtlTerm::Iff(Box::new(x), Box::new(y)) }
        --
        x:(@) _ "|" _ y:@ { CtlTerm::Or(Box::new(x), Box::new(y)) }
        --
        x:(@) _ "&" _ y:@ { CtlTerm::And(Box::new(x), Box::new(y)) }
        --
        "!" _ x:@ { CtlTerm::Not(Box::new(x)) }
        "EX" __ x:@ { CtlTerm::EX(Box::new(x)) }
        "AX" __ x:@ { CtlTerm::AX(Box::new(x)) }
        "EF" __ x:@ { CtlTerm::EF(Box::new(x)) }
        "AF" __ x:@ { CtlTerm::AF(Box::new(x)) }
        "EG" __ x:@ { CtlTerm::EG(Box::new(x)) }
        "AG" __ x:@ { CtlTerm::AG(Box::new(x)) }
        --
        "E" _ "[" _ phi:term() _ "U" __ psi:term() _ "]"
        { CtlTerm::EU(Box::new(phi), Box::new(psi)) }
        "A" _ "[" _ phi:term() _ "U" __ psi:term() _ "]"
        { CtlTerm::AU(Box::new(phi), Box::new(psi)) }
        s:ident() { match s.as_str() {
            "false" => CtlTerm::Literal(false),
            "true" => CtlTerm::Literal(true),
            _ => CtlTerm::Atom(s),
        } }
        "(" _ t:term() _ ")" { t }
    }

    pub(super) rule formula() -> CtlTerm
    = _ t:term() _ { t }
}

}

/// Parse a single CTL formula.
pub fn parse_term(s: &str) -> Result<CtlTerm, ParseError<LineCol>> {
    parser::formula(s)
}

/// Convert an opaque FileId and error to a readable `Diagnostic`
pub fn parse_error_diagnostic<FileId>(
    file_id: FileId,
    e: &ParseError<LineCol>,
) -> Diagnostic<FileId> {
    Diagnostic::error()
        .with_message("could not parse formula")
        .with_labels(vec![Label::primary(
            file_id,
            e.location.offset..e.location.offset + 1,
        )
        .with_message(format!("expected {}", e.expected))])
}

#[cfg(test)]
mod tests {
    use super::parse_term;
    use crate::syntax::CtlTerm::{self, *};

    fn term(s: &str) -> CtlTerm {
        parse_term(s).expect("term in test should parse")
    }

    #[test]
    fn test_atoms_and_literals() {
        assert_eq!(term("p0"), Atom("p0".to_string()));
        assert_eq!(term("true"), Literal(true));
        assert_eq!(term("  false "), Literal(false));
        // temporal keywords only bind with a word boundary
        assert_eq!(term("EXtra"), Atom("EXtra".to_string()));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            term("a & b | c"),
            Or(
                Box::new(And(
                    Box::new(Atom("a".to_string())),
                    Box::new(Atom("b".to_string()))
                )),
                Box::new(Atom("c".to_string()))
            )
        );
        assert_eq!(
            term("a -> b -> c"),
            Implies(
                Box::new(Atom("a".to_string())),
                Box::new(Implies(
                    Box::new(Atom("b".to_string())),
                    Box::new(Atom("c".to_string()))
                ))
            )
        );
    }

    #[test]
    fn test_temporal_operators() {
        assert_eq!(
            term("AG (req -> EF ack)"),
            CtlTerm::atom("req").implies(CtlTerm::atom("ack").ef()).ag()
        );
        assert_eq!(
            term("!EX !p"),
            CtlTerm::atom("p").not().ex().not()
        );
        assert_eq!(
            term("E[a U b]"),
            CtlTerm::atom("a").eu(CtlTerm::atom("b"))
        );
        assert_eq!(
            term("A[ a U EG b ]"),
            CtlTerm::atom("a").au(CtlTerm::atom("b").eg())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_term("").is_err());
        assert!(parse_term("E[a U ]").is_err());
        assert!(parse_term("a &").is_err());
    }
}
