// Prompt templates for the feedback pipeline and the warnings returned when a
// filled template is over the word budget.

/// JD extraction template. Placeholder: `{jd_text}`.
pub const JD_EXTRACTION_TEMPLATE: &str = r#"You are an expert HR assistant trained to analyze job descriptions.

Your task is to extract ONLY the parts of a given Job Description that are relevant for evaluating a candidate's resume. These include:

- Required skills
- Responsibilities
- Work experience
- Required qualifications
- Educational background
- Tools, technologies, or certifications

**Ignore** sections like:
- About the company
- Culture and values
- Perks and benefits
- Application process
- Equal opportunity statements

Format the extracted content as:

**Extracted JD Content:**
[Relevant content only]

Here is the Job Description:

{jd_text}"#;

/// Resume-vs-JD evaluation template.
/// Placeholders: `{similarity_score}`, `{resume_text}`, `{extracted_jd}`.
pub const MATCH_FEEDBACK_TEMPLATE: &str = r#"You are an expert Resume Evaluator, ATS System, and Career Coach.

Task: Analyze a candidate's resume against the extracted job description and provide:
1. ✅ A Matching Score (0–100%) based on the similarity score and content alignment.
2. 📋 A detailed evaluation report outlining:
    - Matching elements (skills, experience, etc.).
    - Missing elements the resume should include.
3. ✨ Suggestions for improving the resume to better align with the job description.

**Similarity Score**: {similarity_score}

📄 Resume:
{resume_text}

📝 Extracted JD:
{extracted_jd}"#;

/// ATS review of a resume on its own. Placeholder: `{resume_text}`.
pub const ATS_FEEDBACK_TEMPLATE: &str = r#"You are an ATS (Applicant Tracking System) evaluator.

Assume that every section of the resume is separated by '### Section Name ###' markers.
These markers indicate a clear visual break in the original resume layout.

Evaluate the resume on the following:
- Content quality (skills, education, work experience)
- Logical order of sections
- Presence or absence of important sections
- Clarity and conciseness
- Overall structure, assuming each '###' represents a proper section gap
- Potential formatting issues inferred from the structure

Give a final ATS friendliness score out of 100.
Also, suggest improvements.

Here is the resume text:
{resume_text}"#;

pub fn jd_too_long(words: usize) -> String {
    format!("⚠️ JD too long ({words} tokens). Please reduce the input size.")
}

pub fn combined_too_long(words: usize) -> String {
    format!("⚠️ Combined input too long ({words} tokens). Please reduce the input size.")
}

pub fn resume_too_long(words: usize) -> String {
    format!("⚠️ Resume too long ({words} tokens). Please reduce the input size.")
}

pub fn jd_extraction_prompt(jd_text: &str) -> String {
    fill(JD_EXTRACTION_TEMPLATE, &[("jd_text", jd_text)])
}

pub fn match_feedback_prompt(resume_text: &str, extracted_jd: &str, similarity: f32) -> String {
    let score = format!("{similarity:.2}");
    fill(
        MATCH_FEEDBACK_TEMPLATE,
        &[
            ("similarity_score", score.as_str()),
            ("resume_text", resume_text),
            ("extracted_jd", extracted_jd),
        ],
    )
}

pub fn ats_feedback_prompt(resume_text: &str) -> String {
    fill(ATS_FEEDBACK_TEMPLATE, &[("resume_text", resume_text)])
}

/// Substitutes `{name}` placeholders in one pass over the template, so braces
/// inside user text are never treated as placeholders.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_jd() {
        let prompt = jd_extraction_prompt("Looking for a backend engineer.");
        assert!(prompt.ends_with("Looking for a backend engineer."));
        assert!(prompt.contains("Equal opportunity statements"));
        assert!(!prompt.contains("{jd_text}"));
    }

    #[test]
    fn test_feedback_prompt_formats_score_to_two_decimals() {
        let prompt = match_feedback_prompt("resume", "jd", 0.73456);
        assert!(prompt.contains("**Similarity Score**: 0.73"));
        assert!(prompt.contains("📄 Resume:\nresume"));
        assert!(prompt.contains("📝 Extracted JD:\njd"));
    }

    #[test]
    fn test_user_text_braces_are_not_placeholders() {
        let prompt = match_feedback_prompt("uses {extracted_jd} literally", "JD", 0.5);
        assert!(prompt.contains("uses {extracted_jd} literally"));
    }

    #[test]
    fn test_ats_prompt_mentions_section_markers() {
        let prompt = ats_feedback_prompt("### Skills ###\nRust");
        assert!(prompt.contains("'### Section Name ###'"));
        assert!(prompt.ends_with("### Skills ###\nRust"));
    }

    #[test]
    fn test_fill_leaves_unknown_and_unbalanced_braces() {
        assert_eq!(fill("{a} {b} {", &[("a", "1")]), "1 {b} {");
    }

    #[test]
    fn test_warnings_carry_word_count() {
        assert_eq!(
            jd_too_long(2048),
            "⚠️ JD too long (2048 tokens). Please reduce the input size."
        );
        assert!(combined_too_long(1500).contains("(1500 tokens)"));
        assert!(resume_too_long(1100).starts_with("⚠️ Resume too long"));
    }
}
