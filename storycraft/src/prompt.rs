//! Prompt building for each pipeline stage.
//!
//! Every stage constructs its LLM prompt via a dedicated struct implementing
//! [`PromptFragment`]. Keeping the wording here lets it be tweaked in one
//! place.

use std::fmt::Write as _;

use crate::story::{GenerationOptions, StoryType};
use crate::unit::{Emphasis, StoryUnit, UnitKind, sort_by_priority};

/// Common interface for constructing prompts.
pub trait PromptFragment {
    /// The user prompt.
    fn build_prompt(&self) -> String;

    /// System instructions sent ahead of the prompt, if the stage uses any.
    fn system_prompt(&self) -> Option<&'static str> {
        None
    }
}

pub const EDITOR_SYSTEM_PROMPT: &str = "You are a professional editor who helps improve stories while maintaining their original intent and style.";

pub const SPLIT_SYSTEM_PROMPT: &str = "You are a JSON formatting assistant. You only respond with valid JSON arrays containing question-answer pairs. Never include any other text or explanation.";

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a text summarizer. You only respond with a summary of the text. Never include any other text or explanation.";

const RANK_PREAMBLE: &str = "The following details each have a rank. The higher the ranking (closer to 1), the more important the detail.";

/// Prompt for the main story generation call.
#[derive(Clone, Debug)]
pub struct GenerationPrompt<'a> {
    pub units: &'a [StoryUnit],
    pub story_type: StoryType,
    pub options: &'a GenerationOptions,
}

impl<'a> GenerationPrompt<'a> {
    pub fn new(units: &'a [StoryUnit], story_type: StoryType, options: &'a GenerationOptions) -> Self {
        Self {
            units,
            story_type,
            options,
        }
    }

    fn type_instruction(&self) -> &'static str {
        match self.story_type {
            StoryType::Article => {
                "Write a professional news article based on the details, prioritizing higher rankings.\n\
                 The article should be objective, well-structured, and informative. Include an engaging lead paragraph, followed by a well-organized body with clear transitions, and a concluding paragraph that summarizes the impact of the event."
            }
            StoryType::Blog => {
                "Write a blog post based on the details, prioritizing higher rankings.\n\
                 The blog should be opinionated, well-structured, and informative. Include an engaging lead paragraph, with clear arguments for the point the author wants to bring across."
            }
            StoryType::Social => {
                "Write an Instagram caption based on the details, prioritizing higher rankings.\n\
                 The post should be concise and easy to read with relevant hashtags."
            }
        }
    }

    fn length_instruction(&self) -> Option<String> {
        let label = self.story_type.label();
        match (self.options.min_length, self.options.max_length) {
            (Some(min), Some(max)) => Some(format!(
                "Keep the {label} between {min} and {max} words."
            )),
            (None, Some(max)) => Some(format!("Keep the {label} under {max} words.")),
            (Some(min), None) => Some(format!("Make the {label} at least {min} words long.")),
            (None, None) => None,
        }
    }

    fn kind_guidance(&self) -> Vec<&'static str> {
        let mut seen: Vec<&UnitKind> = Vec::new();
        let mut lines = Vec::new();
        for unit in self.units {
            if seen.contains(&&unit.kind) {
                continue;
            }
            seen.push(&unit.kind);
            if let Some(line) = unit.kind.guidance() {
                if !lines.contains(&line) {
                    lines.push(line);
                }
            }
        }
        lines
    }
}

/// Render one ranked detail line (plus Q&A lines for split interviews).
fn render_detail(out: &mut String, index: usize, unit: &StoryUnit) {
    let priority = unit.effective_priority();
    let rank = if unit.is_ranked() {
        priority.to_string()
    } else {
        "unranked".to_string()
    };
    let label = match unit.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{}: {title}", unit.kind),
        None => unit.kind.to_string(),
    };
    let emphasis = Emphasis::for_priority(priority).instruction();
    let _ = write!(out, "Detail {index} (Rank {rank}, {label}) [{emphasis}]:");
    match unit.qa_pairs.as_deref() {
        Some(pairs) if !pairs.is_empty() => {
            for pair in pairs {
                let _ = write!(out, "\n  Q: {}\n  A: {}", pair.question, pair.answer);
            }
        }
        _ => {
            out.push(' ');
            out.push_str(unit.content.trim());
        }
    }
    out.push('\n');
}

impl PromptFragment for GenerationPrompt<'_> {
    fn build_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str(RANK_PREAMBLE);
        out.push_str("\n\n");
        out.push_str(self.type_instruction());
        out.push('\n');
        if let Some(length) = self.length_instruction() {
            out.push_str(&length);
            out.push('\n');
        }

        out.push('\n');
        for (i, unit) in sort_by_priority(self.units).iter().enumerate() {
            render_detail(&mut out, i + 1, unit);
        }

        let guidance = self.kind_guidance();
        if !guidance.is_empty() {
            out.push_str("\nWhen incorporating different types of inputs:\n");
            for line in guidance {
                let _ = writeln!(out, "- {line}");
            }
        }

        if let Some(extra) = self.options.instructions() {
            out.push_str("\nAdditional instructions:\n");
            out.push_str(extra);
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

/// Prompt asking for a revision of an existing story.
#[derive(Clone, Debug)]
pub struct EditPrompt<'a> {
    pub original_story: &'a str,
    pub edit_instructions: &'a str,
    pub units: &'a [StoryUnit],
}

impl PromptFragment for EditPrompt<'_> {
    fn build_prompt(&self) -> String {
        let mut out = format!(
            "You are a professional editor. I have a story that needs to be edited according to specific instructions.\n\n\
             Original Story:\n\"\"\"\n{}\n\"\"\"\n\n\
             Edit Instructions:\n\"\"\"\n{}\n\"\"\"\n\n\
             Please provide an edited version of the story that follows these instructions. Maintain the professional tone and quality of the original while implementing the requested changes.",
            self.original_story, self.edit_instructions
        );
        if !self.units.is_empty() {
            out.push_str(
                "\n\nFor reference, here are the original source materials used to create this story:",
            );
            for (i, unit) in sort_by_priority(self.units).iter().enumerate() {
                let title = unit
                    .title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("Unit {}", i + 1));
                let priority = if unit.is_ranked() {
                    format!(" (Priority: {})", unit.effective_priority())
                } else {
                    String::new()
                };
                let _ = write!(
                    out,
                    "\n\n{title}{priority} ({}): {}",
                    unit.kind, unit.content
                );
            }
        }
        out
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some(EDITOR_SYSTEM_PROMPT)
    }
}

/// Prompt splitting an interview transcript into question/answer pairs.
#[derive(Clone, Debug)]
pub struct SplitPrompt<'a> {
    pub transcript: &'a str,
}

impl PromptFragment for SplitPrompt<'_> {
    fn build_prompt(&self) -> String {
        format!(
            "Split the following interview into question and answer pairs. Format your response EXACTLY as a JSON array of objects, with each object having a \"question\" and \"answer\" property. Do not include any other text or explanation in your response.\n\n\
             Example format:\n\
             [\n  {{\n    \"question\": \"What is your name?\",\n    \"answer\": \"John Doe\"\n  }}\n]\n\n\
             Interview to split:\n{}",
            self.transcript
        )
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some(SPLIT_SYSTEM_PROMPT)
    }
}

/// Prompt summarizing a free-standing text.
#[derive(Clone, Debug)]
pub struct SummaryPrompt<'a> {
    pub text: &'a str,
    pub word_limit: usize,
}

impl PromptFragment for SummaryPrompt<'_> {
    fn build_prompt(&self) -> String {
        format!(
            "Summarize the following text. Try to reduce the length of the text to {} words or less.\n\n\nText to summarize:\n{}",
            self.word_limit, self.text
        )
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some(SUMMARY_SYSTEM_PROMPT)
    }
}

/// Prompt shrinking a low ranked unit before generation.
#[derive(Clone, Debug)]
pub struct CondensePrompt<'a> {
    pub text: &'a str,
    pub word_limit: usize,
}

impl PromptFragment for CondensePrompt<'_> {
    fn build_prompt(&self) -> String {
        format!(
            "Summarize this text in under {} words. Make sure to emphasize important details and notable quotes if applicable:\n{}",
            self.word_limit, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::QaPair;

    fn units() -> Vec<StoryUnit> {
        vec![
            StoryUnit::new(UnitKind::Note, "Town hall reopened."),
            StoryUnit::new(UnitKind::Quote, "\"We rebuilt it together.\"")
                .with_title("Mayor")
                .with_priority(1),
            StoryUnit::new(UnitKind::Data, "7 inches of rain").with_priority(2),
        ]
    }

    #[test]
    fn details_follow_priority_order() {
        let units = units();
        let opts = GenerationOptions::default();
        let prompt = GenerationPrompt::new(&units, StoryType::Article, &opts).build_prompt();
        let quote = prompt.find("Detail 1 (Rank 1, quote: Mayor)").unwrap();
        let data = prompt.find("Detail 2 (Rank 2, data)").unwrap();
        let note = prompt.find("Detail 3 (Rank unranked, note)").unwrap();
        assert!(quote < data && data < note);
        assert!(prompt.contains(Emphasis::Critical.instruction()));
        assert!(prompt.contains(Emphasis::Background.instruction()));
    }

    #[test]
    fn length_and_extra_instructions() {
        let units = units();
        let opts = GenerationOptions {
            min_length: Some(300),
            max_length: Some(800),
            additional_instructions: Some("Use a formal tone".into()),
        };
        let prompt = GenerationPrompt::new(&units, StoryType::Blog, &opts).build_prompt();
        assert!(prompt.contains("Keep the blog post between 300 and 800 words."));
        assert!(prompt.ends_with("Additional instructions:\nUse a formal tone"));
        assert!(prompt.contains("Write a blog post"));
    }

    #[test]
    fn single_length_bounds() {
        let units = units();
        let max_only = GenerationOptions {
            max_length: Some(250),
            ..Default::default()
        };
        let prompt = GenerationPrompt::new(&units, StoryType::Article, &max_only).build_prompt();
        assert!(prompt.contains("Keep the article under 250 words."));
        assert!(!prompt.contains("Make the article"));

        let min_only = GenerationOptions {
            min_length: Some(400),
            ..Default::default()
        };
        let prompt = GenerationPrompt::new(&units, StoryType::Social, &min_only).build_prompt();
        assert!(prompt.contains("Make the Instagram caption at least 400 words long."));
        assert!(!prompt.contains("Keep the Instagram caption"));

        let prompt =
            GenerationPrompt::new(&units, StoryType::Article, &GenerationOptions::default())
                .build_prompt();
        assert!(!prompt.contains("Keep the article"));
    }

    #[test]
    fn importance_orders_details() {
        let units = vec![
            StoryUnit::new(UnitKind::Note, "minor").with_importance(1),
            StoryUnit::new(UnitKind::Quote, "major").with_importance(5),
        ];
        let opts = GenerationOptions::default();
        let prompt = GenerationPrompt::new(&units, StoryType::Article, &opts).build_prompt();
        assert!(prompt.contains("Detail 1 (Rank 1, quote)"));
        assert!(prompt.contains("Detail 2 (Rank 5, note)"));
    }

    #[test]
    fn explicit_priority_999_is_shown() {
        let units = vec![StoryUnit::new(UnitKind::Quote, "q")
            .with_title("Mayor")
            .with_priority(999)];
        let opts = GenerationOptions::default();
        let prompt = GenerationPrompt::new(&units, StoryType::Article, &opts).build_prompt();
        assert!(prompt.contains("Detail 1 (Rank 999, quote: Mayor)"));
        let edit = EditPrompt {
            original_story: "Old",
            edit_instructions: "New",
            units: &units,
        }
        .build_prompt();
        assert!(edit.contains("Mayor (Priority: 999) (quote): q"));
    }

    #[test]
    fn only_present_kinds_get_guidance() {
        let units = units();
        let opts = GenerationOptions::default();
        let prompt = GenerationPrompt::new(&units, StoryType::Social, &opts).build_prompt();
        assert!(prompt.contains("Quotes should be attributed properly"));
        assert!(!prompt.contains("Interview transcripts"));
        assert!(prompt.contains("relevant hashtags"));
    }

    #[test]
    fn split_interviews_render_as_pairs() {
        let mut unit = StoryUnit::new(UnitKind::Interview, "raw transcript");
        unit.qa_pairs = Some(vec![QaPair {
            question: "What happened?".into(),
            answer: "The river rose.".into(),
        }]);
        let units = vec![unit];
        let opts = GenerationOptions::default();
        let prompt = GenerationPrompt::new(&units, StoryType::Article, &opts).build_prompt();
        assert!(prompt.contains("  Q: What happened?\n  A: The river rose."));
        assert!(!prompt.contains("raw transcript"));
    }

    #[test]
    fn edit_prompt_lists_sources() {
        let units = units();
        let prompt = EditPrompt {
            original_story: "Old text",
            edit_instructions: "Shorter",
            units: &units,
        }
        .build_prompt();
        assert!(prompt.contains("Original Story:\n\"\"\"\nOld text\n\"\"\""));
        assert!(prompt.contains("Mayor (Priority: 1) (quote):"));
        assert!(prompt.contains("Unit 2 (Priority: 2) (data): 7 inches of rain"));
        assert!(prompt.contains("Unit 3 (note): Town hall reopened."));
    }

    #[test]
    fn edit_prompt_without_units_has_no_reference_section() {
        let prompt = EditPrompt {
            original_story: "Old text",
            edit_instructions: "Shorter",
            units: &[],
        }
        .build_prompt();
        assert!(!prompt.contains("For reference"));
    }
}
