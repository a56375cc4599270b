// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! CTL evaluation over the symbolic state space.
//!
//! Only the existential operators and boolean algebra are implemented
//! directly; the universal operators are derived from them algebraically, so
//! the two families cannot drift apart. Every fixpoint loop stops on exact
//! canonical equality of successive iterates.

use crate::encoding::{Context, EncodingError, TransitionRelation};
use biodivine_lib_bdd::Bdd;
use petri::net::{PetriNet, PlaceId};
use petri::syntax::CtlTerm;
use thiserror::Error;

/// Ways that evaluating a formula can fail. Both are caller errors raised at
/// atom construction time, never from inside a fixpoint loop.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckError {
    /// A formula referenced a place name the net does not have
    #[error("unknown place '{0}' in formula")]
    UnknownPlace(String),
    /// A formula referenced a place id outside the encoding
    #[error("{0}")]
    Encoding(#[from] EncodingError),
}

/// The transition relations of a loaded net, plus any fairness constraints.
/// Built once at load time and passed by reference into the evaluator.
pub struct Model {
    transitions: Vec<TransitionRelation>,
    fairness: Vec<Bdd>,
}

impl Model {
    /// Build a model from already-encoded transition relations.
    pub fn new(transitions: Vec<TransitionRelation>) -> Model {
        Model {
            transitions,
            fairness: vec![],
        }
    }

    /// Encode every transition of a net.
    pub fn from_net(context: &Context, net: &PetriNet) -> Result<Model, EncodingError> {
        let transitions = net
            .transitions()
            .iter()
            .map(|t| context.encode_transition(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Model::new(transitions))
    }

    /// Register a fairness constraint: a state set that a path must visit
    /// infinitely often to count as a witness for `EG` (and, through the
    /// dualities, `AF` and `AU`).
    pub fn add_fairness(&mut self, constraint: Bdd) {
        self.fairness.push(constraint);
    }

    /// The encoded transitions.
    pub fn transitions(&self) -> &[TransitionRelation] {
        &self.transitions
    }

    /// The registered fairness constraints.
    pub fn fairness(&self) -> &[Bdd] {
        &self.fairness
    }
}

/// Evaluates CTL formulas against a model. All operators take and return
/// state sets; the evaluator itself holds no mutable state.
pub struct CtlEvaluator<'a> {
    context: &'a Context,
    net: &'a PetriNet,
    model: &'a Model,
}

impl<'a> CtlEvaluator<'a> {
    /// Create an evaluator for a net and its encoded model.
    pub fn new(context: &'a Context, net: &'a PetriNet, model: &'a Model) -> CtlEvaluator<'a> {
        CtlEvaluator {
            context,
            net,
            model,
        }
    }

    /// Compute the set of states satisfying a formula.
    pub fn eval(&self, term: &CtlTerm) -> Result<Bdd, CheckError> {
        match term {
            CtlTerm::Literal(true) => Ok(self.context.mk_top()),
            CtlTerm::Literal(false) => Ok(self.context.mk_bot()),
            CtlTerm::Atom(name) => {
                let place = self
                    .net
                    .place_id(name)
                    .ok_or_else(|| CheckError::UnknownPlace(name.clone()))?;
                Ok(self.atom(place)?)
            }
            CtlTerm::Not(phi) => Ok(self.eval(phi)?.not()),
            CtlTerm::And(phi, psi) => Ok(self.eval(phi)?.and(&self.eval(psi)?)),
            CtlTerm::Or(phi, psi) => Ok(self.eval(phi)?.or(&self.eval(psi)?)),
            CtlTerm::Implies(phi, psi) => Ok(self.eval(phi)?.imp(&self.eval(psi)?)),
            CtlTerm::Iff(phi, psi) => Ok(self.eval(phi)?.iff(&self.eval(psi)?)),
            CtlTerm::EX(phi) => Ok(self.ex(&self.eval(phi)?)),
            CtlTerm::AX(phi) => Ok(self.ax(&self.eval(phi)?)),
            CtlTerm::EF(phi) => Ok(self.ef(&self.eval(phi)?)),
            CtlTerm::AF(phi) => Ok(self.af(&self.eval(phi)?)),
            CtlTerm::EG(phi) => Ok(self.eg(&self.eval(phi)?)),
            CtlTerm::AG(phi) => Ok(self.ag(&self.eval(phi)?)),
            CtlTerm::EU(phi, psi) => Ok(self.eu(&self.eval(phi)?, &self.eval(psi)?)),
            CtlTerm::AU(phi, psi) => Ok(self.au(&self.eval(phi)?, &self.eval(psi)?)),
        }
    }

    /// The set of states in which `place` is marked.
    pub fn atom(&self, place: PlaceId) -> Result<Bdd, EncodingError> {
        self.context.atom(place)
    }

    /// States with at least one successor in `phi`: the preimage of `phi`
    /// under the union of all transitions.
    pub fn ex(&self, phi: &Bdd) -> Bdd {
        let mut prev = self.context.mk_bot();
        for t in self.model.transitions() {
            prev = prev.or(&self.context.preimage(phi, t));
        }
        prev
    }

    /// States with a path along which `phi` holds until `psi` holds: the
    /// least fixpoint of `Z = psi ∪ (phi ∩ EX Z)`.
    pub fn eu(&self, phi: &Bdd, psi: &Bdd) -> Bdd {
        let mut z = psi.clone();
        loop {
            let next = psi.or(&phi.and(&self.ex(&z)));
            if next == z {
                return z;
            }
            z = next;
        }
    }

    /// States with a path that eventually reaches `phi`.
    pub fn ef(&self, phi: &Bdd) -> Bdd {
        self.eu(&self.context.mk_top(), phi)
    }

    /// States with a path along which `phi` holds forever. With fairness
    /// constraints registered, the path must additionally visit every
    /// constraint set infinitely often.
    pub fn eg(&self, phi: &Bdd) -> Bdd {
        if self.model.fairness().is_empty() {
            self.eg_plain(phi)
        } else {
            self.eg_fair(phi)
        }
    }

    /// The greatest fixpoint of `Z = phi ∩ EX Z`.
    fn eg_plain(&self, phi: &Bdd) -> Bdd {
        let mut z = phi.clone();
        loop {
            let next = phi.and(&self.ex(&z));
            if next == z {
                return z;
            }
            z = next;
        }
    }

    /// Fair EG, the Emerson-Lei construction: the greatest fixpoint of
    /// `Z = phi ∩ ⋀_j EX E[phi U (Z ∩ f_j)]`, nesting the `EU` least
    /// fixpoint inside the outer greatest fixpoint once per constraint.
    fn eg_fair(&self, phi: &Bdd) -> Bdd {
        let mut z = self.context.mk_top();
        loop {
            let mut next = phi.clone();
            for fair in self.model.fairness() {
                let target = z.and(fair);
                next = next.and(&self.ex(&self.eu(phi, &target)));
            }
            if next == z {
                return z;
            }
            z = next;
        }
    }

    /// All successors satisfy `phi`: `AX phi = ¬EX ¬phi`.
    pub fn ax(&self, phi: &Bdd) -> Bdd {
        self.ex(&phi.not()).not()
    }

    /// Every path eventually reaches `phi`: `AF phi = ¬EG ¬phi`.
    pub fn af(&self, phi: &Bdd) -> Bdd {
        self.eg(&phi.not()).not()
    }

    /// `phi` holds on every path forever: `AG phi = ¬EF ¬phi`.
    pub fn ag(&self, phi: &Bdd) -> Bdd {
        self.ef(&phi.not()).not()
    }

    /// Every path satisfies `phi` until `psi`:
    /// `A[phi U psi] = ¬(E[¬psi U ¬(phi ∨ psi)] ∨ EG ¬psi)`.
    pub fn au(&self, phi: &Bdd, psi: &Bdd) -> Bdd {
        let not_psi = psi.not();
        let stuck = phi.or(psi).not();
        self.eu(&not_psi, &stuck).or(&self.eg(&not_psi)).not()
    }
}
