//! Text command layer over the catalog.
//!
//! - [`Command`]: one parsed input line
//! - [`CommandProcessor`]: executes commands and keeps the running total

pub mod parser;
pub mod processor;

pub use parser::{Command, ParseError};
pub use processor::CommandProcessor;
