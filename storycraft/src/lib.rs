//! Story domain: source units, prompt assembly, output validation, the
//! generation pipeline and story persistence.
//!
//! The [`Pipeline`] turns ranked [`StoryUnit`]s into a narrative through an
//! [`llm::Completer`]; [`StoryStore`] implementations keep the results.

pub mod error;
pub mod file_store;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod story;
pub mod unit;

pub use crate::error::{Result, StoryError};
pub use crate::file_store::FileStore;
pub use crate::pipeline::{Pipeline, PipelineSettings};
pub use crate::store::{MemoryStore, StoryStore};
pub use crate::story::*;
pub use crate::unit::*;
