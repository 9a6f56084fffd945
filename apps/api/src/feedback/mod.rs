// Resume feedback: JD extraction, similarity scoring, and feedback generation.
// All generation goes through llm_client::TextGenerator.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
