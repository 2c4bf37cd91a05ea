use crate::error::YtcefrError;

/// Chat-completions backends. Both speak the same wire protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Deepseek,
    Openai,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    /// Parse the `LLM_PROVIDER` value. Anything other than `deepseek` selects OpenAI.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Provider::Deepseek,
            _ => Provider::Openai,
        }
    }

    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Deepseek => ProviderConfig {
                api_url: "https://api.deepseek.com/v1/chat/completions",
                model: "deepseek-chat",
                env_var: "DEEPSEEK_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o",
                env_var: "OPENAI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Deepseek => "DeepSeek",
            Provider::Openai => "OpenAI",
        }
    }

    /// Missing credential for this provider
    pub fn missing_key(&self) -> YtcefrError {
        YtcefrError::MissingCredential {
            env_var: self.config().env_var.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_setting_falls_back_to_openai() {
        assert_eq!(Provider::from_setting("DeepSeek"), Provider::Deepseek);
        assert_eq!(Provider::from_setting("openai"), Provider::Openai);
        assert_eq!(Provider::from_setting("claude"), Provider::Openai);
    }

    #[test]
    fn each_provider_has_its_own_key() {
        assert_eq!(Provider::Deepseek.config().env_var, "DEEPSEEK_API_KEY");
        assert_eq!(Provider::Openai.config().env_var, "OPENAI_API_KEY");
    }
}
