//! Model provider resolution
//!
//! A fixed, ordered table maps credential environment variables to
//! backend defaults. The first entry whose variable is present in the
//! snapshot wins; `MODEL` overrides the model for any backend and
//! `BASE_URL` overrides the endpoint for backends that have one.
//! Table order is part of the adapter's contract — do not reorder.

use tracing::info;

use crate::config::Env;
use crate::error::{Error, Result};

/// Model backend family, which decides the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Ollama native chat API (`/api/chat`).
    Ollama,
    /// Any OpenAI-compatible chat-completions endpoint.
    OpenAiCompat,
    /// Google Gemini `generateContent` API.
    Gemini,
}

/// One entry of the provider table.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    /// Credential environment variable probed for this backend.
    pub env_key: &'static str,
    pub kind: ProviderKind,
    pub default_model: &'static str,
    /// Default endpoint; `None` for backends with a fixed endpoint
    /// that do not accept a `BASE_URL` override.
    pub default_base_url: Option<&'static str>,
}

/// Recognized backends, in selection priority order.
pub const PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        env_key: "OLLAMA_API_KEY",
        kind: ProviderKind::Ollama,
        default_model: "qwen2.5:32b-instruct-q4_K_M",
        default_base_url: Some("http://localhost:11434"),
    },
    ProviderSpec {
        env_key: "GLHF_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "deepseek-ai/DeepSeek-V3",
        default_base_url: Some("https://glhf.chat/api/openai/v1"),
    },
    ProviderSpec {
        env_key: "GROQ_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "deepseek-r1-distill-llama-70b",
        default_base_url: Some("https://api.groq.com/openai/v1"),
    },
    ProviderSpec {
        env_key: "OPENAI_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "gpt-4o-mini",
        default_base_url: Some("https://api.openai.com/v1"),
    },
    ProviderSpec {
        env_key: "OPENROUTER_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "deepseek/deepseek-chat",
        default_base_url: Some("https://openrouter.ai/api/v1"),
    },
    ProviderSpec {
        env_key: "GITHUB_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "gpt-4o-mini",
        default_base_url: Some("https://models.inference.ai.azure.com"),
    },
    ProviderSpec {
        env_key: "DEEPSEEK_API_KEY",
        kind: ProviderKind::OpenAiCompat,
        default_model: "deepseek-chat",
        default_base_url: Some("https://api.deepseek.com/v1"),
    },
    ProviderSpec {
        env_key: "GEMINI_API_KEY",
        kind: ProviderKind::Gemini,
        default_model: "gemini-2.0-flash-exp",
        default_base_url: None,
    },
];

/// Context window passed to Ollama (its default is far too small for
/// page content).
pub const OLLAMA_NUM_CTX: u32 = 32_000;

/// A fully-resolved backend: credential plus effective parameters.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    /// Environment variable the credential came from.
    pub env_key: &'static str,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    /// Ollama only: context window size.
    pub num_ctx: Option<u32>,
}

impl ResolvedProvider {
    /// Select the first provider whose credential variable is present.
    pub fn resolve(env: &Env) -> Result<Self> {
        for spec in PROVIDERS {
            let Some(api_key) = env.get(spec.env_key) else {
                continue;
            };

            let model = match env.get("MODEL") {
                Some(custom) => {
                    info!("Using custom model: {}", custom);
                    custom.to_string()
                }
                None => spec.default_model.to_string(),
            };

            let base_url = match (env.get("BASE_URL"), spec.default_base_url) {
                // Only backends that carry an endpoint accept the override.
                (Some(custom), Some(_)) => {
                    info!("Using custom base URL: {}", custom);
                    Some(custom.to_string())
                }
                (_, default) => default.map(String::from),
            };

            info!("Using {} (model: {})", spec.env_key, model);

            return Ok(Self {
                kind: spec.kind,
                env_key: spec.env_key,
                api_key: api_key.to_string(),
                model,
                base_url,
                num_ctx: (spec.kind == ProviderKind::Ollama).then_some(OLLAMA_NUM_CTX),
            });
        }

        let names: Vec<&str> = PROVIDERS.iter().map(|s| s.env_key).collect();
        Err(Error::Config(format!(
            "No API key found. Please set one of the following environment variables: {}",
            names.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_and_defaults() {
        let keys: Vec<&str> = PROVIDERS.iter().map(|s| s.env_key).collect();
        assert_eq!(
            keys,
            vec![
                "OLLAMA_API_KEY",
                "GLHF_API_KEY",
                "GROQ_API_KEY",
                "OPENAI_API_KEY",
                "OPENROUTER_API_KEY",
                "GITHUB_API_KEY",
                "DEEPSEEK_API_KEY",
                "GEMINI_API_KEY",
            ]
        );

        let openai = &PROVIDERS[3];
        assert_eq!(openai.kind, ProviderKind::OpenAiCompat);
        assert_eq!(openai.default_model, "gpt-4o-mini");
        assert_eq!(openai.default_base_url, Some("https://api.openai.com/v1"));

        let gemini = PROVIDERS.last().unwrap();
        assert_eq!(gemini.kind, ProviderKind::Gemini);
        assert!(gemini.default_base_url.is_none());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let env = Env::from_pairs([("GROQ_API_KEY", "k1"), ("DEEPSEEK_API_KEY", "k2")]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.env_key, "GROQ_API_KEY");
        assert_eq!(provider.api_key, "k1");
        assert_eq!(provider.model, "deepseek-r1-distill-llama-70b");
        assert_eq!(
            provider.base_url.as_deref(),
            Some("https://api.groq.com/openai/v1")
        );
    }

    #[test]
    fn test_resolve_defaults_unchanged_without_overrides() {
        let env = Env::from_pairs([("OPENAI_API_KEY", "sk-test")]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.base_url.as_deref(), Some("https://api.openai.com/v1"));
        assert!(provider.num_ctx.is_none());
    }

    #[test]
    fn test_resolve_model_override() {
        let env = Env::from_pairs([("OPENAI_API_KEY", "sk-test"), ("MODEL", "gpt-4o")]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.model, "gpt-4o");
    }

    #[test]
    fn test_resolve_base_url_override() {
        let env = Env::from_pairs([
            ("OPENAI_API_KEY", "sk-test"),
            ("BASE_URL", "http://localhost:8080/v1"),
        ]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_resolve_base_url_ignored_for_gemini() {
        let env = Env::from_pairs([
            ("GEMINI_API_KEY", "g-test"),
            ("BASE_URL", "http://localhost:8080"),
        ]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.kind, ProviderKind::Gemini);
        assert!(provider.base_url.is_none());
    }

    #[test]
    fn test_resolve_ollama_carries_num_ctx() {
        let env = Env::from_pairs([("OLLAMA_API_KEY", "ollama")]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.kind, ProviderKind::Ollama);
        assert_eq!(provider.num_ctx, Some(32_000));
    }

    #[test]
    fn test_resolve_no_credential_lists_all_keys() {
        let env = Env::from_pairs([("UNRELATED", "x")]);
        let err = ResolvedProvider::resolve(&env).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("No API key found"));
        for spec in PROVIDERS {
            assert!(msg.contains(spec.env_key), "missing {}", spec.env_key);
        }
    }

    #[test]
    fn test_resolve_empty_value_is_unset() {
        let env = Env::from_pairs([("OLLAMA_API_KEY", ""), ("OPENAI_API_KEY", "sk")]);
        let provider = ResolvedProvider::resolve(&env).unwrap();
        assert_eq!(provider.env_key, "OPENAI_API_KEY");
    }
}
