// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The AST for CTL properties over a Petri net.
//!
//! Atoms name places; a place's atom holds in exactly the markings where the
//! place carries a token.

use std::fmt;

/// A CTL formula. Path quantifiers (E = some path, A = all paths) pair with
/// temporal operators (X = next, F = future, G = globally, U = until).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtlTerm {
    /// A constant true or false
    Literal(bool),
    /// An atomic proposition: the named place is marked
    Atom(String),
    /// Negation
    Not(Box<CtlTerm>),
    /// Conjunction
    And(Box<CtlTerm>, Box<CtlTerm>),
    /// Disjunction
    Or(Box<CtlTerm>, Box<CtlTerm>),
    /// Implication
    Implies(Box<CtlTerm>, Box<CtlTerm>),
    /// Equivalence
    Iff(Box<CtlTerm>, Box<CtlTerm>),
    /// Some successor satisfies the formula
    EX(Box<CtlTerm>),
    /// Every successor satisfies the formula
    AX(Box<CtlTerm>),
    /// Some path eventually satisfies the formula
    EF(Box<CtlTerm>),
    /// Every path eventually satisfies the formula
    AF(Box<CtlTerm>),
    /// Some path satisfies the formula forever
    EG(Box<CtlTerm>),
    /// Every path satisfies the formula forever
    AG(Box<CtlTerm>),
    /// Some path satisfies the first formula until the second holds
    EU(Box<CtlTerm>, Box<CtlTerm>),
    /// Every path satisfies the first formula until the second holds
    AU(Box<CtlTerm>, Box<CtlTerm>),
}

impl CtlTerm {
    /// Smart constructor for an atom that takes &str
    pub fn atom(name: impl Into<String>) -> Self {
        CtlTerm::Atom(name.into())
    }

    /// Negate this formula.
    pub fn not(self) -> Self {
        CtlTerm::Not(Box::new(self))
    }

    /// Conjoin with another formula.
    pub fn and(self, other: Self) -> Self {
        CtlTerm::And(Box::new(self), Box::new(other))
    }

    /// Disjoin with another formula.
    pub fn or(self, other: Self) -> Self {
        CtlTerm::Or(Box::new(self), Box::new(other))
    }

    /// This formula implies another.
    pub fn implies(self, other: Self) -> Self {
        CtlTerm::Implies(Box::new(self), Box::new(other))
    }

    /// EX of this formula.
    pub fn ex(self) -> Self {
        CtlTerm::EX(Box::new(self))
    }

    /// AX of this formula.
    pub fn ax(self) -> Self {
        CtlTerm::AX(Box::new(self))
    }

    /// EF of this formula.
    pub fn ef(self) -> Self {
        CtlTerm::EF(Box::new(self))
    }

    /// AF of this formula.
    pub fn af(self) -> Self {
        CtlTerm::AF(Box::new(self))
    }

    /// EG of this formula.
    pub fn eg(self) -> Self {
        CtlTerm::EG(Box::new(self))
    }

    /// AG of this formula.
    pub fn ag(self) -> Self {
        CtlTerm::AG(Box::new(self))
    }

    /// E[self U other].
    pub fn eu(self, other: Self) -> Self {
        CtlTerm::EU(Box::new(self), Box::new(other))
    }

    /// A[self U other].
    pub fn au(self, other: Self) -> Self {
        CtlTerm::AU(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for CtlTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CtlTerm::*;
        match self {
            Literal(true) => write!(f, "true"),
            Literal(false) => write!(f, "false"),
            Atom(name) => write!(f, "{name}"),
            Not(phi) => write!(f, "!{phi}"),
            And(phi, psi) => write!(f, "({phi} & {psi})"),
            Or(phi, psi) => write!(f, "({phi} | {psi})"),
            Implies(phi, psi) => write!(f, "({phi} -> {psi})"),
            Iff(phi, psi) => write!(f, "({phi} <-> {psi})"),
            EX(phi) => write!(f, "EX {phi}"),
            AX(phi) => write!(f, "AX {phi}"),
            EF(phi) => write!(f, "EF {phi}"),
            AF(phi) => write!(f, "AF {phi}"),
            EG(phi) => write!(f, "EG {phi}"),
            AG(phi) => write!(f, "AG {phi}"),
            EU(phi, psi) => write!(f, "E[{phi} U {psi}]"),
            AU(phi, psi) => write!(f, "A[{phi} U {psi}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrips_through_parser() {
        let term = CtlTerm::atom("req")
            .implies(CtlTerm::atom("ack").ef())
            .ag();
        let printed = term.to_string();
        assert_eq!(printed, "AG (req -> EF ack)");
        assert_eq!(crate::parser::parse_term(&printed).unwrap(), term);
    }
}
