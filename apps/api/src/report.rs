//! Markdown rendering of a session's results.
//!
//! Model output is inserted verbatim. Nothing here produces HTML, so clients
//! that render the markdown as rich content must sanitize it themselves.

use std::fmt::Write;

use crate::session::{Session, RUN_JD_MATCHING_HINT, RUN_RESUME_FEEDBACK_HINT};

pub fn render_session_report(session: &Session) -> String {
    let mut out = String::new();
    render_jd_matching(&mut out, session);
    out.push('\n');
    render_resume_feedback(&mut out, session);
    out
}

fn render_jd_matching(out: &mut String, session: &Session) {
    out.push_str("## 📊 JD Matching Score\n\n");

    match (&session.similarity_score, &session.jd_matching_feedback) {
        (Some(score), Some(feedback)) => {
            let _ = writeln!(out, "### 🔗 **Matching Score:** {:.2}%\n", score * 100.0);
            let _ = writeln!(out, "Progress: {}/100\n", progress_value(*score));
            out.push_str("### 📋 Detailed JD Matching Feedback\n\n");
            out.push_str(feedback.as_str());
            out.push('\n');
        }
        (None, Some(feedback)) => {
            // Run stopped before scoring; show why
            out.push_str(feedback.as_str());
            out.push('\n');
        }
        _ => {
            out.push_str(RUN_JD_MATCHING_HINT);
            out.push('\n');
        }
    }
}

fn render_resume_feedback(out: &mut String, session: &Session) {
    out.push_str("## 🧾 Resume Feedback\n\n");
    match &session.ats_feedback {
        Some(feedback) => {
            out.push_str("### 🧠 ATS Feedback\n\n");
            out.push_str(feedback.as_str());
            out.push('\n');
        }
        None => {
            out.push_str(RUN_RESUME_FEEDBACK_HINT);
            out.push('\n');
        }
    }
}

/// Progress bar value: whole percent, clamped to 0..=100 since cosine
/// similarity can go negative.
pub fn progress_value(score: f32) -> u8 {
    (score * 100.0).clamp(0.0, 100.0) as u8
}
