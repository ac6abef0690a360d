use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Owned token for one program representation held by a `ProgramStore`.
///
/// Handles are deliberately not `Clone`: `ProgramStore::destroy` consumes the
/// handle, so a discarded representation cannot be touched again.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u64);

impl ProgramHandle {
    /// Wrap a store-specific id. Only stores should mint handles.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// Stable reference to one statement inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementRef {
    /// Index of the translation unit within the program.
    pub unit: usize,
    /// Store-assigned id, stable across edits to the program.
    pub id: u64,
}

/// A directive-carrying statement (e.g. a `#pragma` line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub statement: StatementRef,
    /// Full directive text as written in the source.
    pub text: String,
}

/// One translation unit of a program, by name and current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// File name used when the unit is written out.
    pub name: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown program {0}")]
    UnknownProgram(u64),
    #[error("Failed to read source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {unit}: {message}")]
    Parse { unit: String, message: String },
    #[error("Compiler rejected {unit}: {message}")]
    Compiler { unit: String, message: String },
    #[error("Unknown statement {0:?}")]
    UnknownStatement(StatementRef),
    #[error("Cannot outline '{name}': {reason}")]
    Outline { name: String, reason: String },
    #[error("Failed to write program to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sink for compiler frontend settings; shared by every program a store builds.
pub trait FrontendConfig {
    /// Select the language standard (e.g. `c11`, `c++17`).
    fn set_standard(&mut self, standard: &str);
    /// Replace the flag string passed to the frontend.
    fn set_flags(&mut self, flags: &str);
}

/// Holder of mutable program representations.
///
/// Implemented by compiler frontends; the ingestion pipeline only drives it
/// through this interface. A caller owns each `ProgramHandle` it creates and
/// must `destroy` it before loading the next program.
pub trait ProgramStore: FrontendConfig {
    /// Human-readable name of the frontend.
    fn name(&self) -> &'static str;

    /// Push a fresh, empty representation.
    fn create(&mut self) -> ProgramHandle;

    /// Discard a representation and everything it holds.
    fn destroy(&mut self, program: ProgramHandle);

    /// Register an on-disk source file with the program.
    fn add_file(&mut self, program: &ProgramHandle, path: &Path) -> Result<(), StoreError>;

    /// Register an in-memory source unit with the program.
    fn add_source(
        &mut self,
        program: &ProgramHandle,
        name: &str,
        text: &str,
    ) -> Result<(), StoreError>;

    /// Drop every unit while keeping the handle alive.
    fn reset(&mut self, program: &ProgramHandle) -> Result<(), StoreError>;

    /// Parse/build the program from its registered units.
    fn rebuild(&mut self, program: &ProgramHandle) -> Result<(), StoreError>;

    /// Names of the functions defined in the program.
    fn functions(&self, program: &ProgramHandle) -> Result<Vec<String>, StoreError>;

    fn has_function(&self, program: &ProgramHandle, name: &str) -> bool {
        self.functions(program).map(|fns| fns.iter().any(|f| f == name)).unwrap_or(false)
    }

    /// Every directive-carrying statement, in unit then source order.
    fn directives(&self, program: &ProgramHandle) -> Result<Vec<Directive>, StoreError>;

    /// Promote the statements strictly between `begin` and `end` into a new
    /// function called `name`.
    fn outline(
        &mut self,
        program: &ProgramHandle,
        begin: StatementRef,
        end: StatementRef,
        name: &str,
    ) -> Result<(), StoreError>;

    fn remove_statement(
        &mut self,
        program: &ProgramHandle,
        statement: StatementRef,
    ) -> Result<(), StoreError>;

    /// Current text of every unit.
    fn units(&self, program: &ProgramHandle) -> Result<Vec<SourceUnit>, StoreError>;

    /// Write every unit into `dest`, returning the written paths.
    fn write(&self, program: &ProgramHandle, dest: &Path) -> Result<Vec<PathBuf>, StoreError>;
}
