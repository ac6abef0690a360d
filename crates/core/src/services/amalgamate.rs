use thiserror::Error;

use crate::services::program::{ProgramHandle, ProgramStore, SourceUnit, StoreError};

/// A whole program merged into one translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amalgamation {
    /// File name of the merged unit, e.g. `pca.c`.
    pub file_name: String,
    /// Merged body with every include directive removed.
    pub body: String,
    /// Include directives the merged unit still needs, de-duplicated.
    pub includes: Vec<String>,
}

impl Amalgamation {
    /// Final unit text: includes first, then the merged body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for include in &self.includes {
            out.push_str(include);
            out.push('\n');
        }
        if !self.includes.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum AmalgamationError {
    #[error("Program for '{0}' has no units to amalgamate")]
    Empty(String),
    #[error("Amalgamation of '{app}' failed: {reason}")]
    Merge { app: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Merges a multi-file program into a single unit.
pub trait Amalgamator {
    fn name(&self) -> &'static str;

    /// Merge every unit of `program`, naming the result after `app`.
    fn amalgamate(
        &self,
        store: &dyn ProgramStore,
        program: &ProgramHandle,
        app: &str,
    ) -> Result<Amalgamation, AmalgamationError>;

    /// Replace the units of `program` with the single amalgamated unit and
    /// rebuild it.
    fn install(
        &self,
        store: &mut dyn ProgramStore,
        program: &ProgramHandle,
        amalgamation: &Amalgamation,
    ) -> Result<(), AmalgamationError> {
        store.reset(program)?;
        store.add_source(program, &amalgamation.file_name, &amalgamation.render())?;
        store.rebuild(program)?;
        Ok(())
    }
}

/// Amalgamate `program` in place. Returns `false` (degraded) on failure.
///
/// A failed install is rolled back: the units held before amalgamation are
/// re-added and the program is rebuilt from them.
pub fn amalgamate_in_place(
    amalgamator: &dyn Amalgamator,
    store: &mut dyn ProgramStore,
    program: &ProgramHandle,
    app: &str,
) -> bool {
    let merged = match amalgamator.amalgamate(store, program, app) {
        Ok(merged) => merged,
        Err(err) => {
            tracing::warn!(app, amalgamator = amalgamator.name(), "Amalgamation failed: {err}");
            return false;
        }
    };
    let original = match store.units(program) {
        Ok(units) => units,
        Err(err) => {
            tracing::warn!(app, "Cannot snapshot units before amalgamation: {err}");
            return false;
        }
    };
    if let Err(err) = amalgamator.install(store, program, &merged) {
        tracing::warn!(app, amalgamator = amalgamator.name(), "Installing amalgamation failed: {err}");
        match restore_units(store, program, &original) {
            Ok(()) => {
                tracing::debug!(app, units = original.len(), "Restored pre-amalgamation units")
            }
            Err(err) => tracing::warn!(app, "Restoring pre-amalgamation units failed: {err}"),
        }
        return false;
    }
    tracing::info!(
        app,
        file = %merged.file_name,
        includes = merged.includes.len(),
        "Amalgamated program into a single unit"
    );
    true
}

fn restore_units(
    store: &mut dyn ProgramStore,
    program: &ProgramHandle,
    units: &[SourceUnit],
) -> Result<(), StoreError> {
    store.reset(program)?;
    for unit in units {
        store.add_source(program, &unit.name, &unit.text)?;
    }
    store.rebuild(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_puts_includes_before_body() {
        let merged = Amalgamation {
            file_name: "pca.c".into(),
            body: "int main(void) { return 0; }".into(),
            includes: vec!["#include <stdio.h>".into(), "#include <math.h>".into()],
        };
        assert_eq!(
            merged.render(),
            "#include <stdio.h>\n#include <math.h>\n\nint main(void) { return 0; }\n"
        );
    }
}
