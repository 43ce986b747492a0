//! Assistant integration.
//!
//! This module talks to the question-answering model and parses its free-form
//! answers into structured content blocks for rendering.

pub mod client;
pub mod extractor;

pub use client::{AssistantClient, AssistantConfig};
pub use extractor::extract_blocks;
