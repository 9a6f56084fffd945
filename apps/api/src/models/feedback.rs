use std::fmt;

use serde::{Deserialize, Serialize};

/// Text shown to the user in place of a model result it could not interpret.
pub const UNEXPECTED_FORMAT_WARNING: &str =
    "⚠️ Unexpected response format. Check the input or model settings.";

/// Free-form text for the user: either what the model generated, or a warning
/// produced instead of calling it. Both travel the success path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum FeedbackText {
    Generated(String),
    Warning(String),
}

impl FeedbackText {
    pub fn as_str(&self) -> &str {
        match self {
            FeedbackText::Generated(text) | FeedbackText::Warning(text) => text,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, FeedbackText::Warning(_))
    }
}

impl fmt::Display for FeedbackText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of matching a resume against a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// The JD reduced to what matters for screening, or the warning that
    /// stopped the run.
    pub cleaned_jd: FeedbackText,
    /// Cosine similarity of resume and cleaned JD. `None` when extraction
    /// did not produce a JD to compare against.
    pub similarity_score: Option<f32>,
    pub feedback: FeedbackText,
}

impl MatchReport {
    /// Similarity as a percentage rounded to two decimals, for display.
    pub fn match_percentage(&self) -> Option<f32> {
        self.similarity_score
            .map(|score| (score * 10_000.0).round() / 100.0)
    }
}
