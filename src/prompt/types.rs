use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named template inputs. Values are reference objects, usually `{"id": ...}`.
pub type InputMap = BTreeMap<String, Value>;

pub const DEFAULT_APPLICATION_NAME: &str = "PromptTemplateGenerationsInvocable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_num_generations")]
    pub num_generations: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_generations: default_num_generations(),
            temperature: default_temperature(),
            frequency_penalty: None,
            presence_penalty: None,
            application_name: default_application_name(),
        }
    }
}

fn default_num_generations() -> u32 {
    1
}

fn default_temperature() -> f64 {
    0.7
}

fn default_application_name() -> String {
    DEFAULT_APPLICATION_NAME.to_string()
}

/// A validated template invocation. Only constructed through
/// [`TemplateRequestBuilder`], so every instance satisfies its invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRequest {
    pub(crate) template_id: String,
    pub(crate) inputs: InputMap,
    pub(crate) config: GenerationConfig,
    pub(crate) preview: bool,
}

impl TemplateRequest {
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn inputs(&self) -> &InputMap {
        &self.inputs
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn num_generations(&self) -> u32 {
        self.config.num_generations
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// JSON body for `POST .../prompt-templates/{id}/generations`.
    pub fn to_wire(&self) -> GenerationsRequestBody<'_> {
        GenerationsRequestBody {
            is_preview: self.preview,
            input_params: InputParams {
                value_map: self
                    .inputs
                    .iter()
                    .map(|(name, value)| (name.as_str(), InputEntry { value }))
                    .collect(),
            },
            additional_config: AdditionalConfig {
                num_generations: self.config.num_generations,
                temperature: self.config.temperature,
                frequency_penalty: self.config.frequency_penalty,
                presence_penalty: self.config.presence_penalty,
                application_name: &self.config.application_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationsRequestBody<'a> {
    pub is_preview: bool,
    pub input_params: InputParams<'a>,
    pub additional_config: AdditionalConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParams<'a> {
    pub value_map: BTreeMap<&'a str, InputEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InputEntry<'a> {
    pub value: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalConfig<'a> {
    pub num_generations: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    pub application_name: &'a str,
}
