// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Encoding of markings and transitions as BDDs.
//!
//! Each place `p` owns a pair of adjacent variables in the diagram order: the
//! current-state variable `2p` and the next-state variable `2p + 1`. State
//! sets range over current-state variables only; transition relations range
//! over both and carry the variable cube of the places they touch, which is
//! what restricts image and preimage computation to the relevant variables.

use biodivine_lib_bdd::*;
use num_bigint::BigInt;
use petri::net::{PlaceId, Transition};
use thiserror::Error;

/// An encoding-contract violation. These are caller errors and fail eagerly,
/// before any fixpoint loop is entered.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    /// A place id at or beyond the net's place count
    #[error("place {place} is out of range for a net with {places} places")]
    PlaceOutOfRange {
        /// The offending id
        place: PlaceId,
        /// The net's place count
        places: usize,
    },
}

/// A transition relation over current- and next-state variables, together
/// with the variables of the places the transition touches. The cube contains
/// exactly the variables that occur in `relation`; image and preimage rely on
/// this to leave untouched places unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRelation {
    pub(crate) relation: Bdd,
    pub(crate) current: Vec<BddVariable>,
    pub(crate) next: Vec<BddVariable>,
}

impl TransitionRelation {
    /// The relation itself, over both variable halves.
    pub fn relation(&self) -> &Bdd {
        &self.relation
    }
}

/// Holds the variable order for a net of a fixed place count and builds all
/// state-set and relation values. Established once at startup, before any
/// encoding happens.
pub struct Context {
    places: usize,
    bdds: BddVariableSet,
    vars: Vec<BddVariable>,
}

impl Context {
    /// Create the encoding for a net with `places` places. Allocates two
    /// diagram variables per place, interleaved.
    pub fn new(places: usize) -> Context {
        let bdds = BddVariableSet::new_anonymous((places * 2).try_into().unwrap());
        let vars = bdds.variables();
        Context { places, bdds, vars }
    }

    /// The place count this encoding was created with.
    pub fn num_places(&self) -> usize {
        self.places
    }

    fn current_var(&self, place: PlaceId) -> BddVariable {
        self.vars[2 * place]
    }

    fn next_var(&self, place: PlaceId) -> BddVariable {
        self.vars[2 * place + 1]
    }

    fn check_place(&self, place: PlaceId) -> Result<(), EncodingError> {
        if place < self.places {
            Ok(())
        } else {
            Err(EncodingError::PlaceOutOfRange {
                place,
                places: self.places,
            })
        }
    }

    /// The empty state set.
    pub fn mk_bot(&self) -> Bdd {
        self.bdds.mk_false()
    }

    /// The universe of all markings.
    pub fn mk_top(&self) -> Bdd {
        self.bdds.mk_true()
    }

    /// The set of states in which `place` is marked.
    pub fn atom(&self, place: PlaceId) -> Result<Bdd, EncodingError> {
        self.check_place(place)?;
        Ok(self.bdds.mk_var(self.current_var(place)))
    }

    /// Encode a single marking as a point function over the current-state
    /// variables. `marking` must be sorted ascending.
    ///
    /// Built bottom-up from the last variable, so each conjunction touches
    /// the diagram root only; O(N) substrate operations for an N-place net.
    pub fn encode_marking(&self, marking: &[PlaceId]) -> Result<Bdd, EncodingError> {
        if let Some(&last) = marking.last() {
            self.check_place(last)?;
        }
        let mut marked = marking.iter().rev().peekable();
        let mut states = self.mk_top();
        for p in (0..self.places).rev() {
            let is_marked = marked.peek() == Some(&&p);
            while marked.peek() == Some(&&p) {
                marked.next();
            }
            states = states.and(&self.bdds.mk_literal(self.current_var(p), is_marked));
        }
        Ok(states)
    }

    /// Encode a transition as a relation between current and next states.
    ///
    /// Walks `pre` and `post` simultaneously from the highest place downward.
    /// For each place either set touches: the current-state literal is
    /// positive if the place is in `pre` and unconstrained otherwise; the
    /// next-state literal is positive if the place is in `post` and negative
    /// otherwise (1-safe replace semantics). Places touched by neither set do
    /// not occur in the relation and therefore keep their value across the
    /// step.
    pub fn encode_transition(
        &self,
        transition: &Transition,
    ) -> Result<TransitionRelation, EncodingError> {
        let mut pre = transition.pre.iter().rev().peekable();
        let mut post = transition.post.iter().rev().peekable();
        if let Some(&&p) = pre.peek() {
            self.check_place(p)?;
        }
        if let Some(&&p) = post.peek() {
            self.check_place(p)?;
        }

        let mut relation = self.mk_top();
        let mut touched: Vec<PlaceId> = vec![];
        while pre.peek().is_some() || post.peek().is_some() {
            let pre_place = pre.peek().map(|p| **p);
            let post_place = post.peek().map(|p| **p);
            let place = pre_place.max(post_place).unwrap();

            if pre_place == Some(place) {
                relation = relation.and(&self.bdds.mk_var(self.current_var(place)));
                pre.next();
            }
            let post_marked = post_place == Some(place);
            relation = relation.and(&self.bdds.mk_literal(self.next_var(place), post_marked));
            if post_marked {
                post.next();
            }
            touched.push(place);
        }
        touched.reverse();

        Ok(TransitionRelation {
            current: touched.iter().map(|&p| self.current_var(p)).collect(),
            next: touched.iter().map(|&p| self.next_var(p)).collect(),
            relation,
        })
    }

    /// The set of states reachable from `states` in one firing of
    /// `transition`: conjoin with the relation while quantifying out the
    /// touched current-state variables, then move the touched next-state
    /// variables onto their current positions.
    pub fn image(&self, states: &Bdd, transition: &TransitionRelation) -> Bdd {
        let mut next = Bdd::binary_op_with_exists(
            states,
            &transition.relation,
            op_function::and,
            &transition.current,
        );
        for (&v, &v_next) in transition.current.iter().zip(&transition.next) {
            // v was just quantified out, and v_next is adjacent to it, so the
            // rename preserves the variable order
            unsafe {
                next.rename_variable(v_next, v);
            }
        }
        next
    }

    /// The set of states that can reach `states` in one firing of
    /// `transition`; the dual of [`Context::image`], with the variable roles
    /// swapped.
    pub fn preimage(&self, states: &Bdd, transition: &TransitionRelation) -> Bdd {
        let mut primed = states.clone();
        for (&v, &v_next) in transition.current.iter().zip(&transition.next).rev() {
            unsafe {
                primed.rename_variable(v, v_next);
            }
        }
        Bdd::binary_op_with_exists(
            &primed,
            &transition.relation,
            op_function::and,
            &transition.next,
        )
    }

    /// Exact number of markings in a state set. State sets range over the
    /// current-state half of the variables, so every marking accounts for
    /// `2^places` satisfying assignments of the full variable set.
    pub fn satcount(&self, states: &Bdd) -> BigInt {
        states.exact_cardinality() >> self.places
    }

    /// Set difference.
    pub fn diff(&self, f: &Bdd, g: &Bdd) -> Bdd {
        f.and_not(g)
    }

    /// Whether every state in `f` is also in `g`. Used to test "holds in all
    /// initial states".
    pub fn subset(&self, f: &Bdd, g: &Bdd) -> bool {
        f.and_not(g).is_false()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use petri::net::Transition;

    fn transition(pre: Vec<PlaceId>, post: Vec<PlaceId>) -> Transition {
        Transition {
            name: "t".to_string(),
            pre,
            post,
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let context = Context::new(4);
        let a = context.encode_marking(&[0, 2]).unwrap();
        let b = context.encode_marking(&[0, 2]).unwrap();
        assert!(a == b);
    }

    #[test]
    fn test_marking_is_a_point_function() {
        let context = Context::new(4);
        let states = context.encode_marking(&[1, 3]).unwrap();
        assert_eq!(context.satcount(&states), BigInt::from(1));

        // the one satisfying marking is the one we encoded
        let atom1 = context.atom(1).unwrap();
        let atom0 = context.atom(0).unwrap();
        assert!(context.subset(&states, &atom1));
        assert!(context.subset(&states, &atom0.not()));
    }

    #[test]
    fn test_empty_marking() {
        let context = Context::new(2);
        let states = context.encode_marking(&[]).unwrap();
        assert_eq!(context.satcount(&states), BigInt::from(1));
        assert!(context.subset(&states, &context.atom(0).unwrap().not()));
    }

    #[test]
    fn test_out_of_range_ids_are_rejected() {
        let context = Context::new(2);
        assert!(matches!(
            context.atom(2),
            Err(EncodingError::PlaceOutOfRange {
                place: 2,
                places: 2
            })
        ));
        assert!(context.encode_marking(&[0, 5]).is_err());
        assert!(context
            .encode_transition(&transition(vec![0], vec![3]))
            .is_err());
    }

    #[test]
    fn test_image_fires_a_transition() {
        let context = Context::new(2);
        let t = context
            .encode_transition(&transition(vec![0], vec![1]))
            .unwrap();
        let init = context.encode_marking(&[0]).unwrap();
        let expected = context.encode_marking(&[1]).unwrap();
        assert!(context.image(&init, &t) == expected);
    }

    #[test]
    fn test_image_leaves_untouched_places_alone() {
        // three places, the transition only touches 0 and 1; place 2 must
        // carry its token across the step
        let context = Context::new(3);
        let t = context
            .encode_transition(&transition(vec![0], vec![1]))
            .unwrap();
        let init = context.encode_marking(&[0, 2]).unwrap();
        let expected = context.encode_marking(&[1, 2]).unwrap();
        assert!(context.image(&init, &t) == expected);
    }

    #[test]
    fn test_image_of_disabled_transition_is_empty() {
        let context = Context::new(2);
        let t = context
            .encode_transition(&transition(vec![0], vec![1]))
            .unwrap();
        let init = context.encode_marking(&[1]).unwrap();
        assert!(context.image(&init, &t).is_false());
    }

    #[test]
    fn test_preimage_is_dual_to_image() {
        let context = Context::new(2);
        let t = context
            .encode_transition(&transition(vec![0], vec![1]))
            .unwrap();
        let source = context.encode_marking(&[0]).unwrap();
        let target = context.encode_marking(&[1]).unwrap();
        assert!(context.subset(&source, &context.preimage(&target, &t)));
        assert!(context.preimage(&source, &t).is_false());
    }

    #[test]
    fn test_place_in_both_pre_and_post() {
        let context = Context::new(1);
        let t = context
            .encode_transition(&transition(vec![0], vec![0]))
            .unwrap();
        let init = context.encode_marking(&[0]).unwrap();
        assert!(context.image(&init, &t) == init);
        assert!(context.preimage(&init, &t) == init);
    }

    #[test]
    fn test_satcount_over_current_variables_only() {
        let context = Context::new(3);
        // "place 0 marked" leaves two free places: 4 markings
        let states = context.atom(0).unwrap();
        assert_eq!(context.satcount(&states), BigInt::from(4));
        assert_eq!(context.satcount(&context.mk_top()), BigInt::from(8));
        assert_eq!(context.satcount(&context.mk_bot()), BigInt::from(0));
    }
}
