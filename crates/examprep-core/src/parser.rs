//! Model response parser.
//!
//! Turns the JSON the LLM returned into validated `Question`s. Items that do
//! not have the declared shape are dropped with a warning instead of flowing
//! into the test as half-filled questions.

use serde::Deserialize;

use crate::error::ProviderError;
use crate::model::Question;

/// Intermediate structure for one generated question.
///
/// Every field is optional so a single bad item does not sink the batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default, alias = "correct_answer_index", alias = "correctAnswer")]
    correct_answer_index: Option<i64>,
    #[serde(default)]
    explanation: Option<String>,
}

/// The response is either a bare array or wrapped in `{"questions": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    List(Vec<serde_json::Value>),
    Wrapped { questions: Vec<serde_json::Value> },
}

/// A warning produced while validating a generated batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Zero-based position in the model's array (if applicable).
    pub item: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Questions that survived validation.
#[derive(Debug, Clone)]
pub struct ParsedQuestions {
    pub questions: Vec<Question>,
    pub warnings: Vec<ValidationWarning>,
}

/// Parse and validate a generated batch.
///
/// `id_prefix` is combined with the item position to form question ids
/// (`{id_prefix}-{n}`). At most `requested` questions are kept.
pub fn parse_generated_questions(
    content: &str,
    requested: usize,
    id_prefix: &str,
) -> Result<ParsedQuestions, ProviderError> {
    if content.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(
            "no response from model".into(),
        ));
    }

    let payload: RawPayload = serde_json::from_str(content)
        .map_err(|e| ProviderError::MalformedResponse(format!("response is not a question list: {e}")))?;
    let items = match payload {
        RawPayload::List(items) => items,
        RawPayload::Wrapped { questions } => questions,
    };

    let mut warnings = Vec::new();
    let mut questions = Vec::new();

    for (index, value) in items.into_iter().enumerate() {
        let raw: RawQuestion = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warnings.push(ValidationWarning {
                    item: Some(index),
                    message: format!("not a question object: {e}"),
                });
                continue;
            }
        };

        match validate_item(raw, format!("{id_prefix}-{index}")) {
            Ok(question) => questions.push(question),
            Err(message) => warnings.push(ValidationWarning {
                item: Some(index),
                message,
            }),
        }
    }

    if questions.len() > requested {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "model returned {} valid questions, keeping the first {requested}",
                questions.len()
            ),
        });
        questions.truncate(requested);
    } else if questions.len() < requested && !questions.is_empty() {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "requested {requested} questions but only {} were usable",
                questions.len()
            ),
        });
    }

    if questions.is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "none of the generated questions were usable ({} problems)",
            warnings.len()
        )));
    }

    Ok(ParsedQuestions {
        questions,
        warnings,
    })
}

fn validate_item(raw: RawQuestion, id: String) -> Result<Question, String> {
    let options = raw.options.ok_or("options are missing")?;
    let index = raw
        .correct_answer_index
        .ok_or("correct answer index is missing")?;
    let correct_answer_index = usize::try_from(index)
        .map_err(|_| format!("correct answer index {index} is out of range"))?;

    let question = Question {
        id,
        text: raw.text.unwrap_or_default().trim().to_string(),
        options,
        correct_answer_index,
        explanation: raw.explanation.unwrap_or_default().trim().to_string(),
    };
    question.validate()?;
    Ok(question)
}
