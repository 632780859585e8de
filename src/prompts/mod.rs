//! Prompt templates for the summary pass.

pub mod summary;

pub use summary::*;
