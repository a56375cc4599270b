// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Reachability closure: the least fixpoint of "apply every transition".

use crate::encoding::{Context, TransitionRelation};
use biodivine_lib_bdd::Bdd;

/// Compute the set of all states reachable from `init_states`.
///
/// Each round unions the per-transition images of the current approximation
/// into it; the loop stops when a round adds nothing. Canonicity of the
/// substrate makes the stopping test an exact equality check, and since the
/// universe of markings is finite, each round either grows the approximation
/// strictly or terminates the loop.
pub fn closure(
    context: &Context,
    init_states: &Bdd,
    transitions: &[TransitionRelation],
) -> Bdd {
    let mut reachable = init_states.clone();
    let mut iterations = 0;
    loop {
        let mut next = reachable.clone();
        for t in transitions {
            next = next.or(&context.image(&reachable, t));
        }
        if next == reachable {
            log::debug!("reachability converged after {iterations} iterations");
            return reachable;
        }
        iterations += 1;
        log::debug!(
            "reachability iteration {iterations}: {} diagram nodes",
            next.size()
        );
        reachable = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use petri::net::Transition;

    fn transition(pre: Vec<usize>, post: Vec<usize>) -> Transition {
        Transition {
            name: "t".to_string(),
            pre,
            post,
        }
    }

    #[test]
    fn test_two_place_chain() {
        // one transition moving the token from place 0 to place 1
        let context = Context::new(2);
        let t = context
            .encode_transition(&transition(vec![0], vec![1]))
            .unwrap();
        let init = context.encode_marking(&[0]).unwrap();

        let reachable = closure(&context, &init, &[t.clone()]);
        assert_eq!(context.satcount(&reachable), BigInt::from(2));

        let expected = context
            .encode_marking(&[0])
            .unwrap()
            .or(&context.encode_marking(&[1]).unwrap());
        assert!(reachable == expected);

        // no transition escapes the computed set
        assert!(context.subset(&context.image(&reachable, &t), &reachable));
    }

    #[test]
    fn test_self_loop() {
        let context = Context::new(1);
        let t = context
            .encode_transition(&transition(vec![0], vec![0]))
            .unwrap();
        let init = context.encode_marking(&[0]).unwrap();

        let reachable = closure(&context, &init, &[t]);
        assert_eq!(context.satcount(&reachable), BigInt::from(1));
        assert!(reachable == init);
    }

    #[test]
    fn test_no_transitions_converges_immediately() {
        let context = Context::new(3);
        let init = context.encode_marking(&[]).unwrap();
        let reachable = closure(&context, &init, &[]);
        assert!(reachable == init);
    }

    #[test]
    fn test_closure_is_idempotent() {
        let context = Context::new(3);
        let transitions = [
            context
                .encode_transition(&transition(vec![0], vec![1]))
                .unwrap(),
            context
                .encode_transition(&transition(vec![1], vec![2]))
                .unwrap(),
            context
                .encode_transition(&transition(vec![2], vec![0]))
                .unwrap(),
        ];
        let init = context.encode_marking(&[0]).unwrap();

        let reachable = closure(&context, &init, &transitions);
        assert_eq!(context.satcount(&reachable), BigInt::from(3));
        assert!(closure(&context, &reachable, &transitions) == reachable);
    }
}
