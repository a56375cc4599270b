// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A thin structural importer for PNML files.
//!
//! Only the subset of PNML that determines the net structure is interpreted:
//! `<place>` (with an optional `<initialMarking>` child), `<transition>`, and
//! `<arc>` nodes under `<pnml><net><page>`. Everything else (names, graphics,
//! tool-specific annotations) is skipped.

use crate::net::{NetError, PetriNet};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use peg::{error::ParseError, str::LineCol};
use thiserror::Error;

/// An XML element: a name, its attributes, and its child elements. Text
/// content is discarded during parsing; the importer only reads structure.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

peg::parser! {

grammar xml() for str {
    rule whitespace() = quiet!{ [' ' | '\t' | '\n' | '\r'] }
    rule _ = whitespace()*

    rule name() -> String
    = s:$(quiet!{['a'..='z' | 'A'..='Z' | '_' | ':']
                 ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | ':' | '-' | '.']*}
          / expected!("name"))
    { s.to_string() }

    rule quoted() -> String
    = "\"" s:$([^'"']*) "\"" { s.to_string() }
    / "'" s:$([^'\'']*) "'" { s.to_string() }

    rule attribute() -> (String, String)
    = n:name() _ "=" _ v:quoted() { (n, v) }

    rule attributes() -> Vec<(String, String)>
    = (_ a:attribute() { a })*

    rule comment() = "<!--" (!"-->" [_])* "-->"
    rule prolog() = "<?" (!"?>" [_])* "?>"
    rule doctype() = "<!DOCTYPE" (!">" [_])* ">"
    rule text() = [^'<']+

    rule element() -> Element
    = "<" n:name() a:attributes() _ "/>"
      { Element { name: n, attributes: a, children: vec![] } }
    / "<" n:name() a:attributes() _ ">" c:content() "</" close:name() _ ">"
      {?
          if close == n {
              Ok(Element { name: n, attributes: a, children: c })
          } else {
              Err("matching close tag")
          }
      }

    rule content() -> Vec<Element>
    = cs:(e:element() { Some(e) } / text() { None } / comment() { None })*
    { cs.into_iter().flatten().collect() }

    pub(super) rule document() -> Element
    = _ (prolog() _)? (doctype() _)? (comment() _)* e:element() _ (comment() _)* { e }
}

}

/// Ways that importing a PNML file can fail.
#[derive(Error, Debug, PartialEq)]
pub enum PnmlError {
    /// The file is not well-formed XML (for the subset we read)
    #[error("PNML file could not be parsed: {0}")]
    Xml(ParseError<LineCol>),
    /// The expected `<pnml><net><page>` structure was not found
    #[error("missing <{0}> node")]
    MissingNode(&'static str),
    /// A node lacked a required attribute
    #[error("<{node}> node is missing attribute '{attribute}'")]
    MissingAttribute {
        /// The node kind
        node: &'static str,
        /// The absent attribute
        attribute: &'static str,
    },
    /// The net structure was inconsistent
    #[error("{0}")]
    Net(#[from] NetError),
}

impl PnmlError {
    /// Convert this error to a `Diagnostic` that can be printed against the
    /// source file.
    pub fn diagnostic<FileId>(&self, file_id: FileId) -> Diagnostic<FileId> {
        match self {
            PnmlError::Xml(e) => Diagnostic::error()
                .with_message("could not parse PNML file")
                .with_labels(vec![Label::primary(
                    file_id,
                    e.location.offset..e.location.offset + 1,
                )
                .with_message(format!("expected {}", e.expected))]),
            other => Diagnostic::error().with_message(format!("{other}")),
        }
    }
}

/// Parse a PNML document into a `PetriNet`.
pub fn parse(s: &str) -> Result<PetriNet, PnmlError> {
    let root = xml::document(s).map_err(PnmlError::Xml)?;
    if root.name != "pnml" {
        return Err(PnmlError::MissingNode("pnml"));
    }
    let page = root
        .child("net")
        .ok_or(PnmlError::MissingNode("net"))?
        .child("page")
        .ok_or(PnmlError::MissingNode("page"))?;

    let mut net = PetriNet::new();

    // Two passes over the page: first declare all places and transitions so
    // that arcs can reference nodes in any order, then record the arcs.
    for n in &page.children {
        match n.name.as_str() {
            "place" => {
                let id = n.attribute("id").ok_or(PnmlError::MissingAttribute {
                    node: "place",
                    attribute: "id",
                })?;
                net.add_place(id, n.child("initialMarking").is_some())?;
            }
            "transition" => {
                let id = n.attribute("id").ok_or(PnmlError::MissingAttribute {
                    node: "transition",
                    attribute: "id",
                })?;
                net.add_transition(id)?;
            }
            _ => {
                // ignore node and continue
            }
        }
    }
    for n in &page.children {
        if n.name == "arc" {
            let source = n.attribute("source").ok_or(PnmlError::MissingAttribute {
                node: "arc",
                attribute: "source",
            })?;
            let target = n.attribute("target").ok_or(PnmlError::MissingAttribute {
                node: "arc",
                attribute: "target",
            })?;
            net.add_arc(source, target)?;
        }
    }
    Ok(net)
}
