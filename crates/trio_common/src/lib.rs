//! Trio Common - Planner -> Reviewer -> Finalizer over a local generation endpoint
//!
//! Turns free-form model output into a Draft: exactly 3 topical tags and a
//! summary of at most 25 words. Every stage after the first network call is
//! total; the only fatal condition is an unreachable generation service.

pub mod config;
pub mod draft;
pub mod extract;
pub mod generation;
pub mod pipeline;
pub mod prompts;

pub use config::{ConfigError, TrioConfig};
pub use draft::{Candidate, Draft};
pub use extract::{extract_json_object, ExtractError};
pub use generation::{GenerateOptions, GenerationError, OllamaGenerator, TextGenerator};
pub use pipeline::{Pipeline, PipelineReport, PipelineSettings, ReviewOutcome, Stage};
