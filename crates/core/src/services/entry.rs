use std::fmt;

use crate::services::outline::find_marker_pair;
use crate::services::program::{ProgramHandle, ProgramStore, StoreError};

/// What `ensure_function` found or did.
#[derive(Debug)]
pub enum EntryStatus {
    /// A function with the name already existed; nothing changed.
    Present,
    /// The marked region was outlined into a new function.
    Outlined,
    /// No function and no complete marker pair; the program is unchanged.
    Unresolvable { has_begin: bool, has_end: bool },
    /// The store failed while inspecting or editing the program.
    Failed(StoreError),
}

impl EntryStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, EntryStatus::Present | EntryStatus::Outlined)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Present => write!(f, "present"),
            EntryStatus::Outlined => write!(f, "outlined"),
            EntryStatus::Unresolvable { has_begin, has_end } => {
                write!(f, "unresolvable (begin marker: {has_begin}, end marker: {has_end})")
            }
            EntryStatus::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Make sure `program` defines a function called `name`.
///
/// If it does not, the region bracketed by the `begin_outline` /
/// `end_outline` markers for `name` is outlined into that function and the
/// two marker statements are removed. Calling this again with the same name
/// is a no-op. Failures are logged and reported through `EntryStatus`; the
/// entry simply stays missing.
pub fn ensure_function(
    store: &mut dyn ProgramStore,
    program: &ProgramHandle,
    name: &str,
) -> EntryStatus {
    if store.has_function(program, name) {
        tracing::debug!(function = name, "Entry function already present");
        return EntryStatus::Present;
    }

    let directives = match store.directives(program) {
        Ok(directives) => directives,
        Err(err) => {
            tracing::warn!(function = name, "Could not list directives: {err}");
            return EntryStatus::Failed(err);
        }
    };

    let pair = find_marker_pair(&directives, name);
    let Some((begin, end)) = pair.complete() else {
        tracing::warn!(
            function = name,
            has_begin = pair.begin.is_some(),
            has_end = pair.end.is_some(),
            "Function not found and no complete outline markers; entry stays missing"
        );
        return EntryStatus::Unresolvable {
            has_begin: pair.begin.is_some(),
            has_end: pair.end.is_some(),
        };
    };

    if let Err(err) = store.outline(program, begin, end, name) {
        tracing::warn!(function = name, "Outlining failed: {err}");
        return EntryStatus::Failed(err);
    }
    for marker in [begin, end] {
        if let Err(err) = store.remove_statement(program, marker) {
            tracing::warn!(function = name, "Could not remove outline marker: {err}");
            return EntryStatus::Failed(err);
        }
    }

    tracing::info!(function = name, "Outlined marked region into entry function");
    EntryStatus::Outlined
}
