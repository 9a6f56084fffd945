//! Feedback pipeline — JD extraction, similarity, and feedback generation.
//!
//! Flow for `match_against_job`:
//!   extract relevant JD (LLM) → similarity(resume, cleaned JD) → feedback (LLM)
//!
//! Each step consumes the previous step's output; nothing runs in parallel and
//! nothing is retried or cached. The only branch is the word-budget guard.

use std::sync::Arc;

use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::feedback::prompts::{
    ats_feedback_prompt, combined_too_long, jd_extraction_prompt, jd_too_long,
    match_feedback_prompt, resume_too_long,
};
use crate::llm_client::guard::{check_budget, Budget};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::feedback::{FeedbackText, MatchReport, UNEXPECTED_FORMAT_WARNING};
use crate::session::{MISSING_BOTH_WARNING, MISSING_RESUME_WARNING};

/// Per-call limits. Input is counted in whitespace words, output in model
/// tokens.
#[derive(Debug, Clone, Copy)]
pub struct GenerationLimits {
    pub max_input_words: usize,
    pub extraction_max_new_tokens: u32,
    pub feedback_max_new_tokens: u32,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_input_words: crate::config::DEFAULT_MAX_INPUT_WORDS,
            extraction_max_new_tokens: 1024,
            feedback_max_new_tokens: 2048,
        }
    }
}

#[derive(Clone)]
pub struct FeedbackPipeline {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    limits: GenerationLimits,
}

impl FeedbackPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        limits: GenerationLimits,
    ) -> Self {
        Self {
            generator,
            embedder,
            limits,
        }
    }

    /// Matches a resume against a job description.
    ///
    /// If the extraction step yields a warning instead of a JD, the remaining
    /// steps are skipped and the warning is reported as both the cleaned JD and
    /// the feedback.
    pub async fn match_against_job(
        &self,
        resume_text: &str,
        jd_text: &str,
    ) -> Result<MatchReport, AppError> {
        if resume_text.trim().is_empty() || jd_text.trim().is_empty() {
            return Ok(MatchReport {
                cleaned_jd: FeedbackText::Warning(MISSING_BOTH_WARNING.to_string()),
                similarity_score: None,
                feedback: FeedbackText::Warning(MISSING_BOTH_WARNING.to_string()),
            });
        }

        // Step 1: keep only the screening-relevant parts of the JD
        info!("Extracting relevant JD content");
        let cleaned_jd = self.extract_relevant_jd(jd_text).await?;
        if cleaned_jd.is_warning() {
            return Ok(MatchReport {
                feedback: cleaned_jd.clone(),
                cleaned_jd,
                similarity_score: None,
            });
        }
        let jd = cleaned_jd.as_str();

        // Step 2: semantic similarity against the cleaned JD
        info!("Computing semantic similarity");
        let similarity = self.similarity(resume_text, jd).await?;
        info!("Similarity score: {similarity:.4}");

        // Step 3: feedback conditioned on the score
        info!("Generating JD matching feedback");
        let feedback = self.resume_feedback(resume_text, jd, similarity).await?;

        Ok(MatchReport {
            cleaned_jd,
            similarity_score: Some(similarity),
            feedback,
        })
    }

    /// ATS-friendliness review of a resume with no JD involved.
    pub async fn standalone_feedback(&self, resume_text: &str) -> Result<FeedbackText, AppError> {
        if resume_text.trim().is_empty() {
            return Ok(FeedbackText::Warning(MISSING_RESUME_WARNING.to_string()));
        }

        info!("Generating ATS resume feedback");
        let prompt = ats_feedback_prompt(resume_text);
        self.generate_within_budget(
            &prompt,
            self.limits.feedback_max_new_tokens,
            resume_too_long,
        )
        .await
    }

    pub async fn extract_relevant_jd(&self, jd_text: &str) -> Result<FeedbackText, AppError> {
        let prompt = jd_extraction_prompt(jd_text);
        self.generate_within_budget(
            &prompt,
            self.limits.extraction_max_new_tokens,
            jd_too_long,
        )
        .await
    }

    pub async fn similarity(&self, resume_text: &str, jd_text: &str) -> Result<f32, AppError> {
        let resume_vec = self.embedder.embed(resume_text).await?;
        let jd_vec = self.embedder.embed(jd_text).await?;
        Ok(self.embedder.similarity(&resume_vec, &jd_vec)?)
    }

    pub async fn resume_feedback(
        &self,
        resume_text: &str,
        extracted_jd: &str,
        similarity: f32,
    ) -> Result<FeedbackText, AppError> {
        let prompt = match_feedback_prompt(resume_text, extracted_jd, similarity);
        self.generate_within_budget(
            &prompt,
            self.limits.feedback_max_new_tokens,
            combined_too_long,
        )
        .await
    }

    /// Dispatches `prompt` unless it is over the word budget. Over-budget
    /// prompts and unreadable response bodies come back as warnings; every
    /// other generator failure propagates.
    async fn generate_within_budget(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        too_long: fn(usize) -> String,
    ) -> Result<FeedbackText, AppError> {
        match check_budget(prompt, self.limits.max_input_words) {
            Budget::Exceeded { words } => {
                warn!(
                    "Prompt over budget ({words} > {} words), not dispatched",
                    self.limits.max_input_words
                );
                Ok(FeedbackText::Warning(too_long(words)))
            }
            Budget::Within { .. } => match self.generator.generate(prompt, max_new_tokens).await {
                Ok(text) => Ok(FeedbackText::Generated(text)),
                Err(LlmError::UnexpectedFormat(body)) => {
                    warn!("Unexpected generation response: {body}");
                    Ok(FeedbackText::Warning(UNEXPECTED_FORMAT_WARNING.to_string()))
                }
                Err(e) => Err(AppError::Llm(e)),
            },
        }
    }
}
