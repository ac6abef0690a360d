//! The `begin_outline` / `end_outline` marker protocol.
//!
//! A benchmark marks a region that should become its entry function with
//!
//! ```c
//! #pragma clava begin_outline kernel
//! ...
//! #pragma clava end_outline kernel
//! ```
//!
//! Matching is an exact comparison after trimming surrounding whitespace, so
//! `#pragma  clava begin_outline kernel` (two spaces) is not a marker. When a
//! name has several begin or end markers the first of each wins.

use crate::services::program::{Directive, StatementRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Begin,
    End,
}

impl MarkerKind {
    fn keyword(self) -> &'static str {
        match self {
            MarkerKind::Begin => "begin_outline",
            MarkerKind::End => "end_outline",
        }
    }
}

/// Exact directive text of a marker for `name`.
pub fn marker_text(kind: MarkerKind, name: &str) -> String {
    format!("#pragma clava {} {}", kind.keyword(), name)
}

pub fn is_marker(directive_text: &str, kind: MarkerKind, name: &str) -> bool {
    directive_text.trim() == marker_text(kind, name)
}

/// First begin and end markers found for one name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerPair {
    pub begin: Option<StatementRef>,
    pub end: Option<StatementRef>,
}

impl MarkerPair {
    /// Both ends, if the pair is actionable.
    pub fn complete(&self) -> Option<(StatementRef, StatementRef)> {
        Some((self.begin?, self.end?))
    }
}

/// Scan directives in order for the markers of `name`.
pub fn find_marker_pair(directives: &[Directive], name: &str) -> MarkerPair {
    let mut pair = MarkerPair::default();
    for directive in directives {
        if pair.begin.is_none() && is_marker(&directive.text, MarkerKind::Begin, name) {
            pair.begin = Some(directive.statement);
        } else if pair.end.is_none() && is_marker(&directive.text, MarkerKind::End, name) {
            pair.end = Some(directive.statement);
        }
        if pair.begin.is_some() && pair.end.is_some() {
            break;
        }
    }
    pair
}
