pub mod catalog;
pub mod context;
pub mod emit;
pub mod load;
pub mod logging;
pub mod scan;
pub mod suite;

pub use catalog::*;
pub use context::*;
pub use emit::*;
pub use load::*;
pub use logging::*;
pub use scan::*;
pub use suite::*;
