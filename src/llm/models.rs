//! Model identifiers known to work with the default endpoint.
//!
//! The list is informational: any string is accepted as a model identifier and
//! forwarded unchanged.

use std::fmt;
use std::str::FromStr;

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-70B-Instruct";

/// A model hosted behind the default endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KnownModel {
    #[default]
    Llama3_70bInstruct,
    Llama3_8bInstruct,
    Mixtral8x22bInstruct,
    Mixtral8x22b,
    WizardLm2_8x22b,
    WizardLm2_7b,
    ZephyrOrpo141b,
    Gemma1_1_7bIt,
    DbrxInstruct,
    Mixtral8x7bInstruct,
    Mistral7bInstruct,
    Llama2_70bChat,
    Dolphin2_6Mixtral8x7b,
}

impl KnownModel {
    pub const ALL: [KnownModel; 13] = [
        Self::Llama3_70bInstruct,
        Self::Llama3_8bInstruct,
        Self::Mixtral8x22bInstruct,
        Self::Mixtral8x22b,
        Self::WizardLm2_8x22b,
        Self::WizardLm2_7b,
        Self::ZephyrOrpo141b,
        Self::Gemma1_1_7bIt,
        Self::DbrxInstruct,
        Self::Mixtral8x7bInstruct,
        Self::Mistral7bInstruct,
        Self::Llama2_70bChat,
        Self::Dolphin2_6Mixtral8x7b,
    ];

    /// The identifier sent in the request's `model` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Llama3_70bInstruct => DEFAULT_MODEL,
            Self::Llama3_8bInstruct => "meta-llama/Meta-Llama-3-8B-Instruct",
            Self::Mixtral8x22bInstruct => "mistralai/Mixtral-8x22B-Instruct-v0.1",
            Self::Mixtral8x22b => "mistralai/Mixtral-8x22B-v0.1",
            Self::WizardLm2_8x22b => "microsoft/WizardLM-2-8x22B",
            Self::WizardLm2_7b => "microsoft/WizardLM-2-7B",
            Self::ZephyrOrpo141b => "HuggingFaceH4/zephyr-orpo-141b-A35b-v0.1",
            Self::Gemma1_1_7bIt => "google/gemma-1.1-7b-it",
            Self::DbrxInstruct => "databricks/dbrx-instruct",
            Self::Mixtral8x7bInstruct => "mistralai/Mixtral-8x7B-Instruct-v0.1",
            Self::Mistral7bInstruct => "mistralai/Mistral-7B-Instruct-v0.2",
            Self::Llama2_70bChat => "meta-llama/Llama-2-70b-chat-hf",
            Self::Dolphin2_6Mixtral8x7b => "cognitivecomputations/dolphin-2.6-mixtral-8x7b",
        }
    }

    /// Returns `true` if `model` names one of the known models.
    pub fn is_known(model: &str) -> bool {
        model.parse::<KnownModel>().is_ok()
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known model identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for KnownModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_owned()))
    }
}

impl AsRef<str> for KnownModel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_parses_back() {
        for model in KnownModel::ALL {
            assert_eq!(model.as_str().parse::<KnownModel>(), Ok(model));
        }
    }

    #[test]
    fn default_is_llama3_70b() {
        assert_eq!(KnownModel::default().as_str(), DEFAULT_MODEL);
    }

    #[test]
    fn unknown_model() {
        assert!(!KnownModel::is_known("my-org/custom-model"));
        assert_eq!(
            "gpt-x".parse::<KnownModel>(),
            Err(UnknownModel("gpt-x".into()))
        );
    }
}
