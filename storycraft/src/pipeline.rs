//! Multi-stage generation over a [`Completer`].
//!
//! A [`Pipeline`] owns the completer and the per-stage request parameters.
//! Story generation runs in two stages: low ranked units that would crowd
//! the word budget are condensed first, then the ranked prompt is sent.

use llm::{Completer, CompletionRequest};
use tracing::{debug, info, warn};

use crate::error::{Result, StoryError};
use crate::parse::{clean_completion, parse_qa_pairs};
use crate::prompt::{
    CondensePrompt, EditPrompt, GenerationPrompt, PromptFragment, SplitPrompt, SummaryPrompt,
};
use crate::story::{EditedStory, GenerationOptions, Story, StoryType};
use crate::unit::{QaPair, StoryUnit, UnitKind, sort_by_priority, validate_units, word_count};

/// Units longer than this are summarized by [`Pipeline::process_unit`].
pub const SUMMARY_THRESHOLD_WORDS: usize = 300;

/// Target length of a [`Pipeline::summarize`] result.
pub const SUMMARY_WORD_LIMIT: usize = 100;

/// Lower bound on the word budget handed to the condense stage.
pub const MIN_CONDENSE_WORDS: usize = 10;

/// Request parameters of one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageParams {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

pub const GENERATE_PARAMS: StageParams = StageParams {
    max_tokens: 800,
    temperature: None,
};
pub const CONDENSE_PARAMS: StageParams = StageParams {
    max_tokens: 800,
    temperature: None,
};
pub const EDIT_PARAMS: StageParams = StageParams {
    max_tokens: 2000,
    temperature: Some(0.7),
};
pub const SPLIT_PARAMS: StageParams = StageParams {
    max_tokens: 4000,
    temperature: Some(0.1),
};
pub const SUMMARY_PARAMS: StageParams = StageParams {
    max_tokens: 4000,
    temperature: Some(0.1),
};

/// Models used by the pipeline stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Model for story generation and condensing.
    pub story_model: String,
    /// Model for editing, splitting and summarizing.
    pub utility_model: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            story_model: "gpt-4o".into(),
            utility_model: "gpt-4o-mini".into(),
        }
    }
}

pub struct Pipeline<C> {
    completer: C,
    settings: PipelineSettings,
}

impl<C: Completer> Pipeline<C> {
    pub fn new(completer: C, settings: PipelineSettings) -> Self {
        Self {
            completer,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }

    async fn run<P: PromptFragment>(
        &self,
        model: &str,
        params: StageParams,
        fragment: &P,
    ) -> Result<String> {
        let prompt = fragment.build_prompt();
        debug!(model, prompt_len = prompt.len(), "running completion");
        let mut request = CompletionRequest::new(model);
        if let Some(system) = fragment.system_prompt() {
            request = request.system(system);
        }
        request = request.user(prompt).max_tokens(params.max_tokens);
        if let Some(t) = params.temperature {
            request = request.temperature(t);
        }
        Ok(self.completer.complete(request).await?)
    }

    /// Generate a story of `story_type` from `units`.
    pub async fn generate_story(
        &self,
        units: Vec<StoryUnit>,
        story_type: StoryType,
        options: &GenerationOptions,
    ) -> Result<Story> {
        if units.is_empty() {
            return Err(StoryError::Validation("at least one story unit is required".into()));
        }
        validate_units(&units)?;
        options.validate()?;
        info!(units = units.len(), %story_type, "generating story");

        let units = match options.max_length {
            Some(max) => self.condense_units(units, max as usize).await?,
            None => sort_by_priority(&units),
        };

        let prompt = GenerationPrompt::new(&units, story_type, options);
        let raw = self
            .run(&self.settings.story_model, GENERATE_PARAMS, &prompt)
            .await?;
        Ok(Story {
            story: clean_completion(&raw)?,
            story_type,
            units,
        })
    }

    /// Condense stage: shrink long units in the lower half of the ranking so
    /// that the story fits `max_words`.
    ///
    /// Returned units are in priority order.
    pub async fn condense_units(&self, units: Vec<StoryUnit>, max_words: usize) -> Result<Vec<StoryUnit>> {
        let n = units.len();
        if n == 0 {
            return Ok(units);
        }
        let share = max_words / n;
        let mut out = Vec::with_capacity(n);
        for (i, mut unit) in sort_by_priority(&units).into_iter().enumerate() {
            let lower_half = i + 1 > n / 2;
            if lower_half && unit.qa_pairs.is_none() && unit.word_count() > share {
                let limit = condense_limit(share, i);
                debug!(index = i, words = unit.word_count(), limit, "condensing unit");
                let summary = self
                    .run(
                        &self.settings.story_model,
                        CONDENSE_PARAMS,
                        &CondensePrompt {
                            text: &unit.content,
                            word_limit: limit,
                        },
                    )
                    .await?;
                let summary = clean_completion(&summary)?;
                let original = std::mem::replace(&mut unit.content, summary);
                unit.original_content.get_or_insert(original);
            }
            out.push(unit);
        }
        Ok(out)
    }

    /// Revise `original_story` following `edit_instructions`.
    pub async fn edit_story(
        &self,
        original_story: &str,
        edit_instructions: &str,
        units: &[StoryUnit],
    ) -> Result<EditedStory> {
        if original_story.trim().is_empty() {
            return Err(StoryError::Validation("originalStory is required".into()));
        }
        if edit_instructions.trim().is_empty() {
            return Err(StoryError::Validation("editInstructions is required".into()));
        }
        validate_units(units)?;
        info!(units = units.len(), "editing story");
        let prompt = EditPrompt {
            original_story,
            edit_instructions,
            units,
        };
        let raw = self
            .run(&self.settings.utility_model, EDIT_PARAMS, &prompt)
            .await?;
        Ok(EditedStory {
            original_story: original_story.to_string(),
            edited_story: clean_completion(&raw)?,
            edit_instructions: edit_instructions.to_string(),
        })
    }

    /// Split an interview transcript into question/answer pairs.
    pub async fn split_interview(&self, transcript: &str) -> Result<Vec<QaPair>> {
        if transcript.trim().is_empty() {
            return Err(StoryError::Validation("interview text is empty".into()));
        }
        info!(words = word_count(transcript), "splitting interview");
        let raw = self
            .run(
                &self.settings.utility_model,
                SPLIT_PARAMS,
                &SplitPrompt { transcript },
            )
            .await?;
        parse_qa_pairs(&raw).inspect_err(|e| {
            if let StoryError::Parse { raw, .. } = e {
                warn!(error = %e, %raw, "could not parse interview split");
            }
        })
    }

    /// Summarize `text` to roughly [`SUMMARY_WORD_LIMIT`] words.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(StoryError::Validation("content is empty".into()));
        }
        info!(words = word_count(text), "summarizing text");
        let raw = self
            .run(
                &self.settings.utility_model,
                SUMMARY_PARAMS,
                &SummaryPrompt {
                    text,
                    word_limit: SUMMARY_WORD_LIMIT,
                },
            )
            .await?;
        clean_completion(&raw)
    }

    /// Prepare a unit for generation: interviews are split into Q&A pairs,
    /// long material is summarized, everything else passes through.
    pub async fn process_unit(&self, mut unit: StoryUnit) -> Result<StoryUnit> {
        unit.validate()?;
        if unit.kind == UnitKind::Interview {
            unit.qa_pairs = Some(self.split_interview(&unit.content).await?);
        } else if unit.word_count() > SUMMARY_THRESHOLD_WORDS {
            let summary = self.summarize(&unit.content).await?;
            let original = std::mem::replace(&mut unit.content, summary);
            unit.original_content.get_or_insert(original);
        }
        Ok(unit)
    }
}

/// Word budget for the unit at 0-based position `index` of the ranking.
pub fn condense_limit(share: usize, index: usize) -> usize {
    (share + 10)
        .saturating_sub(index * 10)
        .max(MIN_CONDENSE_WORDS)
}
