use super::types::{GenerationConfig, InputMap, TemplateRequest};
use crate::{Error, Result};
use serde_json::Value;

const PENALTY_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

/// Builds a request for a template that declares no required inputs.
pub fn build(
    template_id: &str,
    inputs: InputMap,
    config: GenerationConfig,
    preview: bool,
) -> Result<TemplateRequest> {
    TemplateRequestBuilder::new(template_id)
        .inputs(inputs)
        .config(config)
        .preview(preview)
        .build()
}

#[derive(Debug, Clone, Default)]
pub struct TemplateRequestBuilder {
    template_id: String,
    inputs: InputMap,
    config: GenerationConfig,
    preview: bool,
    required_inputs: Vec<String>,
}

impl TemplateRequestBuilder {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            ..Self::default()
        }
    }

    pub fn input(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inputs.insert(name.into(), value);
        self
    }

    /// Shorthand for an input that references a record by id.
    pub fn record_input(self, name: impl Into<String>, record_id: &str) -> Self {
        self.input(name, serde_json::json!({ "id": record_id }))
    }

    pub fn inputs(mut self, inputs: InputMap) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Input names the template declares as required.
    pub fn required_inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_inputs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<TemplateRequest> {
        let template_id = self.template_id.trim();
        if template_id.is_empty() {
            return Err(Error::invalid_argument("template id must not be empty"));
        }

        if !self.required_inputs.is_empty() {
            if self.inputs.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "template '{}' requires inputs but none were given",
                    template_id
                )));
            }
            if let Some(missing) = self
                .required_inputs
                .iter()
                .find(|name| !self.inputs.contains_key(name.as_str()))
            {
                return Err(Error::invalid_argument(format!(
                    "template '{}' requires input '{}'",
                    template_id, missing
                )));
            }
        }

        validate_config(&self.config)?;

        Ok(TemplateRequest {
            template_id: template_id.to_string(),
            inputs: self.inputs,
            config: self.config,
            preview: self.preview,
        })
    }
}

fn validate_config(config: &GenerationConfig) -> Result<()> {
    if config.num_generations < 1 {
        return Err(Error::invalid_argument(
            "num_generations must be at least 1",
        ));
    }

    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&config.temperature) {
        return Err(Error::invalid_argument(format!(
            "temperature {} is outside [0, 1]",
            config.temperature
        )));
    }

    for (name, penalty) in [
        ("frequency_penalty", config.frequency_penalty),
        ("presence_penalty", config.presence_penalty),
    ] {
        if let Some(value) = penalty {
            if !PENALTY_RANGE.contains(&value) {
                return Err(Error::invalid_argument(format!(
                    "{} {} is outside [-2, 2]",
                    name, value
                )));
            }
        }
    }

    if config.application_name.trim().is_empty() {
        return Err(Error::invalid_argument(
            "application_name must not be empty",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn case_inputs() -> InputMap {
        let mut inputs = InputMap::new();
        inputs.insert("Input:Case".to_string(), json!({ "id": "500xx000001" }));
        inputs
    }

    #[test]
    fn test_build_preserves_generation_count() {
        let config = GenerationConfig {
            num_generations: 3,
            ..GenerationConfig::default()
        };

        let request = build("Case_Classification", case_inputs(), config, false).unwrap();

        assert_eq!(request.template_id(), "Case_Classification");
        assert_eq!(request.num_generations(), 3);
        assert!(!request.is_preview());
        assert_eq!(request.inputs().len(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_build_rejects_blank_template_id(#[case] template_id: &str) {
        let err = build(template_id, case_inputs(), GenerationConfig::default(), false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.01)]
    #[case(42.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_build_rejects_temperature_out_of_range(#[case] temperature: f64) {
        let config = GenerationConfig {
            temperature,
            ..GenerationConfig::default()
        };
        let err = build("T", case_inputs(), config, false).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.5)]
    #[case(1.0)]
    fn test_build_accepts_temperature_bounds(#[case] temperature: f64) {
        let config = GenerationConfig {
            temperature,
            ..GenerationConfig::default()
        };
        assert!(build("T", case_inputs(), config, false).is_ok());
    }

    #[test]
    fn test_build_rejects_zero_generations() {
        let config = GenerationConfig {
            num_generations: 0,
            ..GenerationConfig::default()
        };
        let err = build("T", case_inputs(), config, false).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_build_rejects_penalty_out_of_range() {
        let config = GenerationConfig {
            presence_penalty: Some(2.5),
            ..GenerationConfig::default()
        };
        let err = build("T", case_inputs(), config, false).unwrap_err();
        assert!(err.to_string().contains("presence_penalty"));
    }

    #[test]
    fn test_empty_inputs_allowed_without_requirements() {
        let request = build("T", InputMap::new(), GenerationConfig::default(), true).unwrap();
        assert!(request.is_preview());
        assert!(request.inputs().is_empty());
    }

    #[test]
    fn test_required_inputs_enforced() {
        let err = TemplateRequestBuilder::new("T")
            .required_inputs(["Input:Case"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = TemplateRequestBuilder::new("T")
            .record_input("Input:Account", "001xx")
            .required_inputs(["Input:Case"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Input:Case"));

        let request = TemplateRequestBuilder::new("T")
            .record_input("Input:Case", "500xx")
            .required_inputs(["Input:Case"])
            .build()
            .unwrap();
        assert_eq!(request.inputs()["Input:Case"], json!({ "id": "500xx" }));
    }

    #[test]
    fn test_wire_body_shape() {
        let config = GenerationConfig {
            num_generations: 2,
            temperature: 0.3,
            frequency_penalty: Some(0.5),
            presence_penalty: None,
            application_name: "PromptBuilderPreview".to_string(),
        };
        let request = build("Case_Classification", case_inputs(), config, false).unwrap();

        let body = serde_json::to_value(request.to_wire()).unwrap();
        assert_eq!(
            body,
            json!({
                "isPreview": false,
                "inputParams": {
                    "valueMap": {
                        "Input:Case": { "value": { "id": "500xx000001" } }
                    }
                },
                "additionalConfig": {
                    "numGenerations": 2,
                    "temperature": 0.3,
                    "frequencyPenalty": 0.5,
                    "applicationName": "PromptBuilderPreview"
                }
            })
        );
    }
}
