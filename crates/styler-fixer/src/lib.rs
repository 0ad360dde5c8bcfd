//! Token-level PHP fixers
//!
//! Each fixer inspects a [`styler_core::Tokens`] collection, decides whether
//! the file is a candidate, then mutates the collection in place. The
//! [`analyzer`] module supplies the shared structural queries (line extents,
//! argument lists, switch layout, constructor discovery) that the fixers
//! build on.

pub mod analyzer;
pub mod config;
pub mod fixers;

pub use config::{FixerConfig, IndentStyle, LineEnding, WhitespaceConfig};
pub use fixers::registry::{FixerInfo, FixerRegistry};
pub use fixers::{Fixer, FixerError};
