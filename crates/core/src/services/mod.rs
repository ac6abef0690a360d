pub mod amalgamate;
pub mod emit;
pub mod entry;
pub mod frontends;
pub mod loader;
pub mod outline;
pub mod program;
pub mod scanner;
pub mod suite;

pub use amalgamate::{Amalgamation, AmalgamationError, Amalgamator};
pub use entry::{ensure_function, EntryStatus};
pub use loader::{BenchmarkLoader, LoadedApp};
pub use program::{
    Directive, FrontendConfig, ProgramHandle, ProgramStore, SourceUnit, StatementRef, StoreError,
};
pub use scanner::scan_sources;
pub use suite::{AppOutcome, AppScript, AppStatus, SuiteReport, SuiteRunner};
