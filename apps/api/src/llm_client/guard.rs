//! Input-size guard applied to every prompt before dispatch.
//!
//! The count is a whitespace word count, not a model tokenizer count. It
//! undercounts dense text and overcounts text made of many short words; it only
//! keeps obviously oversized prompts off the wire.

/// Result of checking a prompt against the word budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Within { words: usize },
    Exceeded { words: usize },
}

/// Whitespace-delimited word count used as a token proxy.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn check_budget(prompt: &str, max_words: usize) -> Budget {
    let words = word_count(prompt);
    if words > max_words {
        Budget::Exceeded { words }
    } else {
        Budget::Within { words }
    }
}
