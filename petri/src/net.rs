// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The Petri-net structure produced by the importer.

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A place, identified by its position in the net's place list.
pub type PlaceId = usize;

/// A transition, identified by its position in the net's transition list.
pub type TransitionId = usize;

/// A transition between markings. `pre` lists the places that must be marked
/// for the transition to fire, `post` the places that are marked after it
/// fires. Both lists are sorted ascending and duplicate-free; a place may
/// appear in both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The name this transition had in the input file
    pub name: String,
    /// Places that must be marked before firing
    pub pre: Vec<PlaceId>,
    /// Places that are marked after firing
    pub post: Vec<PlaceId>,
}

/// Ways that building a net from imported structure can fail. These are
/// reported before any symbolic work begins.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetError {
    /// An arc referenced a name that is neither a place nor a transition
    #[error("unknown place or transition '{0}'")]
    UnknownNode(String),
    /// An arc connected two nodes of the same kind
    #[error("arc connects '{0}' to '{1}' of the same kind")]
    ArcSameKind(String, String),
    /// Two nodes were declared with the same name
    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeId {
    Place(PlaceId),
    Transition(TransitionId),
}

/// A Petri net: a fixed list of named places, an initial marking, and a fixed
/// list of transitions. Built once by the importer and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetriNet {
    places: Vec<String>,
    initial: Vec<PlaceId>,
    transitions: Vec<Transition>,
    ids: HashMap<String, NodeId>,
}

impl PetriNet {
    /// Create an empty net.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a place, optionally marked in the initial marking.
    pub fn add_place(&mut self, name: &str, initially_marked: bool) -> Result<PlaceId, NetError> {
        if self.ids.contains_key(name) {
            return Err(NetError::DuplicateNode(name.to_string()));
        }
        let place = self.places.len();
        self.places.push(name.to_string());
        self.ids.insert(name.to_string(), NodeId::Place(place));
        if initially_marked {
            // places are declared in id order, so `initial` stays sorted
            self.initial.push(place);
        }
        Ok(place)
    }

    /// Declare a transition with empty pre- and post-sets.
    pub fn add_transition(&mut self, name: &str) -> Result<TransitionId, NetError> {
        if self.ids.contains_key(name) {
            return Err(NetError::DuplicateNode(name.to_string()));
        }
        let transition = self.transitions.len();
        self.transitions.push(Transition {
            name: name.to_string(),
            pre: vec![],
            post: vec![],
        });
        self.ids
            .insert(name.to_string(), NodeId::Transition(transition));
        Ok(transition)
    }

    /// Record an arc between a place and a transition. A place-to-transition
    /// arc extends the transition's pre-set, a transition-to-place arc its
    /// post-set.
    pub fn add_arc(&mut self, source: &str, target: &str) -> Result<(), NetError> {
        let source_id = self.lookup(source)?;
        let target_id = self.lookup(target)?;
        match (source_id, target_id) {
            (NodeId::Place(p), NodeId::Transition(t)) => {
                insert_sorted(&mut self.transitions[t].pre, p);
            }
            (NodeId::Transition(t), NodeId::Place(p)) => {
                insert_sorted(&mut self.transitions[t].post, p);
            }
            _ => {
                return Err(NetError::ArcSameKind(
                    source.to_string(),
                    target.to_string(),
                ));
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<NodeId, NetError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| NetError::UnknownNode(name.to_string()))
    }

    /// Number of places in the net.
    pub fn num_places(&self) -> usize {
        self.places.len()
    }

    /// Number of transitions in the net.
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// The name a place had in the input file.
    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place]
    }

    /// Resolve a place name to its id.
    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        match self.ids.get(name) {
            Some(NodeId::Place(p)) => Some(*p),
            _ => None,
        }
    }

    /// The initial marking, sorted ascending.
    pub fn initial_marking(&self) -> &[PlaceId] {
        &self.initial
    }

    /// All transitions, in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

fn insert_sorted(v: &mut Vec<PlaceId>, p: PlaceId) {
    if let Err(i) = v.binary_search(&p) {
        v.insert(i, p);
    }
}

impl fmt::Display for PetriNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "places:")?;
        match self.num_places() {
            0 => writeln!(f, "  Ø")?,
            n if n <= 3 => writeln!(f, "  {}", (0..n).map(|p| p.to_string()).join(", "))?,
            n => writeln!(f, "  0, 1, ..., {}", n - 1)?,
        }
        writeln!(f)?;
        writeln!(f, "initial marking:")?;
        writeln!(
            f,
            "  {{ {}}}",
            self.initial.iter().map(|p| format!("{p} ")).join("")
        )?;
        writeln!(f)?;
        writeln!(f, "transitions:")?;
        for t in &self.transitions {
            writeln!(
                f,
                "  {{ {}}} -> {{ {}}}",
                t.pre.iter().map(|p| format!("{p} ")).join(""),
                t.post.iter().map(|p| format!("{p} ")).join(""),
            )?;
        }
        Ok(())
    }
}
