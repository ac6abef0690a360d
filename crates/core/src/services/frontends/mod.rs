//! Built-in frontends implementing the program store and amalgamator seams.

#[cfg(feature = "text-frontend")]
pub mod amalgamator;
#[cfg(feature = "text-frontend")]
pub mod parse;
#[cfg(feature = "text-frontend")]
pub mod text;

#[cfg(feature = "text-frontend")]
pub use amalgamator::TextAmalgamator;
#[cfg(feature = "text-frontend")]
pub use text::TextStore;
