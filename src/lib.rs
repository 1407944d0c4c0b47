pub mod cli;
pub mod composer;
pub mod config;
pub mod enricher;
pub mod error;
pub mod forge;
pub mod interpreter;
pub mod orchestrator;
pub mod publish;
pub mod release;

pub use error::{NotesError, Result};

#[cfg(test)]
pub mod test_helpers;
