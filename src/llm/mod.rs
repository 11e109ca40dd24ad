pub mod report;

use crate::error::{Error, Result};

const DEFAULT_PROVIDER: &str = "bedrock";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Which text-generation backend to talk to. Resolved once per invocation
/// from CLI flags, then environment, then defaults.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
}

impl LlmSettings {
    pub fn resolve(provider: Option<&str>, model: Option<&str>) -> Self {
        let provider = provider
            .map(str::to_string)
            .or_else(|| std::env::var("RETROSCOPE_LLM_PROVIDER").ok())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var("RETROSCOPE_LLM_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        LlmSettings { provider, model }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Create a mixtape Agent for the configured provider and model.
pub async fn build_agent(settings: &LlmSettings) -> Result<mixtape_core::Agent> {
    // Each combination needs its own builder call since the model types are different.
    match (settings.provider.as_str(), settings.model.as_str()) {
        ("bedrock", "claude-haiku-4-5" | "haiku") => mixtape_core::Agent::builder()
            .bedrock(mixtape_core::ClaudeHaiku4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        ("bedrock", _) => {
            // Default bedrock model
            mixtape_core::Agent::builder()
                .bedrock(mixtape_core::ClaudeSonnet4_5)
                .build()
                .await
                .map_err(|e| Error::Llm(e.to_string()))
        }
        ("anthropic", "claude-haiku-4-5" | "haiku") => mixtape_core::Agent::builder()
            .anthropic_from_env(mixtape_core::ClaudeHaiku4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        ("anthropic", _) => mixtape_core::Agent::builder()
            .anthropic_from_env(mixtape_core::ClaudeSonnet4_5)
            .build()
            .await
            .map_err(|e| Error::Llm(e.to_string())),
        (other, _) => Err(Error::Config(format!("unknown llm provider: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_explicit_values() {
        let settings = LlmSettings::resolve(Some("anthropic"), Some("haiku"));
        assert_eq!(settings.provider, "anthropic");
        assert_eq!(settings.model, "haiku");
    }

    #[test]
    fn test_default_settings() {
        let settings = LlmSettings::default();
        assert_eq!(settings.provider, "bedrock");
        assert_eq!(settings.model, "claude-sonnet-4-5");
    }
}
