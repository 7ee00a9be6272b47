//! Role pipeline - Planner -> Reviewer -> Finalizer
//!
//! Strictly sequential. Planner and Finalizer always produce a Draft once the
//! generation call succeeds. Reviewer runs a bounded attempt loop and falls back
//! to the Planner's Draft when no attempt is usable.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, info_span, warn};

use crate::config::TrioConfig;
use crate::draft::{normalize, Candidate, Draft};
use crate::extract::extract_json_object;
use crate::generation::{GenerateOptions, GenerationError, TextGenerator};
use crate::prompts;

/// Knobs the pipeline needs, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub planner_temperature: f32,
    pub reviewer_temperature: f32,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&TrioConfig::default())
    }
}

impl From<&TrioConfig> for PipelineSettings {
    fn from(config: &TrioConfig) -> Self {
        Self {
            planner_temperature: config.pipeline.planner_temperature,
            reviewer_temperature: config.pipeline.reviewer_temperature,
            timeout: config.timeout(),
            max_attempts: config.pipeline.max_attempts,
            retry_delay: Duration::from_millis(config.pipeline.retry_delay_ms),
        }
    }
}

/// Reviewer result
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    /// Raw text of the accepted attempt, or of the last attempt on fallback
    pub raw: String,
    pub draft: Draft,
    /// Whether the reviewed Draft differs from the Planner's
    pub changed: bool,
    pub attempts: u32,
    pub fell_back: bool,
}

/// A finished stage, handed to the observer of `run_with`
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Planned { raw: &'a str, draft: &'a Draft },
    Reviewed(&'a ReviewOutcome),
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub planner_raw: String,
    pub planner_draft: Draft,
    pub review: ReviewOutcome,
    pub final_draft: Draft,
}

pub struct Pipeline<G: TextGenerator> {
    generator: G,
    settings: PipelineSettings,
}

impl<G: TextGenerator> Pipeline<G> {
    pub fn new(generator: G, settings: PipelineSettings) -> Self {
        Self { generator, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn options(&self, temperature: f32) -> GenerateOptions {
        GenerateOptions {
            temperature,
            timeout: self.settings.timeout,
        }
    }

    /// Run all three stages
    pub fn run(&self, title: &str, content: &str) -> Result<PipelineReport, GenerationError> {
        self.run_with(title, content, |_| {})
    }

    /// Run all three stages, reporting Planner and Reviewer as each finishes
    ///
    /// A stage already reported stays reported when a later one fails.
    pub fn run_with<F>(
        &self,
        title: &str,
        content: &str,
        mut on_stage: F,
    ) -> Result<PipelineReport, GenerationError>
    where
        F: FnMut(Stage<'_>),
    {
        let run_id = uuid::Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);
        let _guard = span.enter();

        let (planner_raw, planner_draft) = self.plan(title, content)?;
        on_stage(Stage::Planned {
            raw: &planner_raw,
            draft: &planner_draft,
        });

        let review = self.review(title, content, &planner_draft)?;
        on_stage(Stage::Reviewed(&review));

        let final_draft = finalize(&review.draft);

        info!(
            "Pipeline complete: changed={}, reviewer attempts={}, fell_back={}",
            review.changed, review.attempts, review.fell_back
        );

        Ok(PipelineReport {
            planner_raw,
            planner_draft,
            review,
            final_draft,
        })
    }

    /// Planner: first draft from title + content
    ///
    /// Only a generation failure is an error; unusable output degrades to a
    /// placeholder-padded Draft.
    pub fn plan(&self, title: &str, content: &str) -> Result<(String, Draft), GenerationError> {
        let prompt = prompts::build_planner_prompt(title, content);
        info!("Planner: generating first draft");
        debug!("Planner prompt ({} bytes)", prompt.len());

        let raw = self
            .generator
            .generate(&prompt, &self.options(self.settings.planner_temperature))?;

        let candidate = extract_json_object(&raw).unwrap_or_else(|e| {
            debug!("Planner: {}, using empty candidate", e);
            Candidate::new()
        });

        Ok((raw, normalize(&candidate)))
    }

    /// Reviewer: improve the Planner's Draft with bounded retries
    pub fn review(
        &self,
        title: &str,
        content: &str,
        planner_draft: &Draft,
    ) -> Result<ReviewOutcome, GenerationError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let options = self.options(self.settings.reviewer_temperature);
        let mut prompt = prompts::build_reviewer_prompt(title, content, planner_draft);
        let mut last_raw = String::new();

        for attempt in 1..=max_attempts {
            info!("Reviewer: attempt {}/{}", attempt, max_attempts);

            match self.generator.generate(&prompt, &options) {
                Ok(raw) => {
                    let candidate = extract_json_object(&raw).unwrap_or_else(|e| {
                        debug!("Reviewer: {}, using empty candidate", e);
                        Candidate::new()
                    });

                    if is_acceptable(&candidate) {
                        let draft = normalize(&candidate);
                        let changed = draft != *planner_draft;
                        return Ok(ReviewOutcome {
                            raw,
                            draft,
                            changed,
                            attempts: attempt,
                            fell_back: false,
                        });
                    }

                    warn!("Reviewer: attempt {} returned an unusable shape", attempt);
                    last_raw = raw;
                    prompt = prompts::build_repair_prompt(title, content, planner_draft);
                }
                // Nothing came back, so the current prompt is resent as is
                Err(e) if e.is_timeout() => {
                    warn!("Reviewer: attempt {} timed out, counting it as spent", attempt);
                }
                Err(e) => return Err(e),
            }

            if attempt < max_attempts && !self.settings.retry_delay.is_zero() {
                std::thread::sleep(self.settings.retry_delay);
            }
        }

        warn!(
            "Reviewer: no usable answer after {} attempts, keeping Planner draft",
            max_attempts
        );
        let draft = planner_draft.normalized();
        let changed = draft != *planner_draft;
        Ok(ReviewOutcome {
            raw: last_raw,
            draft,
            changed,
            attempts: max_attempts,
            fell_back: true,
        })
    }
}

/// Finalizer: defensive re-validation of the reviewed Draft
pub fn finalize(draft: &Draft) -> Draft {
    draft.normalized()
}

/// Looser pre-normalization check: at least one real tag and a non-empty summary
pub fn is_acceptable(candidate: &Candidate) -> bool {
    let tags_ok = match candidate.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|t| !t.trim().is_empty()),
        _ => false,
    };
    let summary_ok = matches!(candidate.get("summary"), Some(Value::String(s)) if !s.trim().is_empty());
    tags_ok && summary_ok
}
