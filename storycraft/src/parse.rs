//! Validation of raw completion text.

use serde_json::Value;

use crate::error::{Result, StoryError};
use crate::unit::QaPair;

/// Remove markdown code fences a model may wrap JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a JSON array of question/answer objects.
///
/// Every element must carry non-empty `question` and `answer` strings.
pub fn parse_qa_pairs(raw: &str) -> Result<Vec<QaPair>> {
    let cleaned = strip_code_fences(raw);
    let fail = |message: String| StoryError::Parse {
        message,
        raw: cleaned.clone(),
    };

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| fail(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| fail("Response is not an array".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let field = |name: &str| {
                item.get(name)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            match (field("question"), field("answer")) {
                (Some(question), Some(answer)) => Ok(QaPair { question, answer }),
                _ => Err(fail(format!("Invalid object structure at index {index}"))),
            }
        })
        .collect()
}

/// Trim narrative output, rejecting completions with no text.
pub fn clean_completion(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(StoryError::Parse {
            message: "completion contained no text".into(),
            raw: raw.to_string(),
        });
    }
    Ok(text.to_string())
}
