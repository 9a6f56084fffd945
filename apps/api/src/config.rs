use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::session::DEFAULT_SESSION_TTL_SECS;

pub const DEFAULT_HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_HF_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
/// Word budget applied to every prompt before it is sent.
pub const DEFAULT_MAX_INPUT_WORDS: usize = 1024;

/// Which embedding backend computes resume/JD vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// In-process fastembed model.
    Local,
    /// Hugging Face feature-extraction endpoint.
    Remote,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => bail!("EMBEDDING_BACKEND must be 'local' or 'remote', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if the inference credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub hf_api_key: String,
    pub hf_model: String,
    pub hf_api_base: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_model: String,
    pub max_input_words: usize,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Idle time after which a session is dropped.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_ttl_secs = parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            hf_api_key: require_env("HUGGINGFACE_API_KEY")?,
            hf_model: env_or("HF_MODEL", DEFAULT_HF_MODEL),
            hf_api_base: env_or("HF_API_BASE", DEFAULT_HF_API_BASE),
            embedding_backend: env_or("EMBEDDING_BACKEND", "local").parse()?,
            embedding_model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            max_input_words: parse_env("MAX_INPUT_WORDS", DEFAULT_MAX_INPUT_WORDS)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_ttl_secs,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_backend_parses_case_insensitively() {
        assert_eq!(
            "Local".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Local
        );
        assert_eq!(
            " remote ".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Remote
        );
    }

    #[test]
    fn test_embedding_backend_rejects_unknown() {
        let err = "gpu".parse::<EmbeddingBackend>().unwrap_err();
        assert!(err.to_string().contains("gpu"));
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: usize = parse_env("RESUME_MATCHER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }
}
