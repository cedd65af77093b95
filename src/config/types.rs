use crate::{Error, Result, mapping::FieldMap, prompt::GenerationConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateDefinition>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_error_body_chars")]
    pub max_error_body_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// A server-hosted template and how its output lands on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Template API name on the remote endpoint.
    pub id: String,
    /// Input slot that receives the record reference.
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default)]
    pub required_inputs: Vec<String>,
    pub expected_keys: Vec<String>,
    pub field_map: FieldMap,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_error_body_chars", &self.max_error_body_chars)
            .finish()
    }
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout_secs: default_timeout_secs(),
            max_error_body_chars: default_max_error_body_chars(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(Error::config("endpoint.base_url must not be empty"));
        }
        reqwest::Url::parse(&self.endpoint.base_url).map_err(|e| {
            Error::config(format!(
                "endpoint.base_url '{}' is not a valid URL: {}",
                self.endpoint.base_url, e
            ))
        })?;

        if self.endpoint.timeout_secs == 0 {
            return Err(Error::config("endpoint.timeout_secs must be at least 1"));
        }

        for (name, template) in &self.templates {
            template
                .validate()
                .map_err(|e| Error::config(format!("template '{}': {}", name, e)))?;
        }

        Ok(())
    }
}

impl TemplateDefinition {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".to_string());
        }
        if self.input_name.trim().is_empty() {
            return Err("input_name must not be empty".to_string());
        }
        // The record reference is the only input an invocation supplies
        if let Some(name) = self
            .required_inputs
            .iter()
            .find(|name| **name != self.input_name)
        {
            return Err(format!(
                "required input '{}' is never supplied; only '{}' is bound to the record",
                name, self.input_name
            ));
        }
        if self.expected_keys.is_empty() {
            return Err("expected_keys must list at least one key".to_string());
        }
        if let Some(key) = self
            .expected_keys
            .iter()
            .find(|key| self.field_map.target_for(key).is_none())
        {
            return Err(format!("expected key '{}' has no field mapping", key));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            database_path: default_database_path(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_error_body_chars() -> usize {
    512
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    "records.db".to_string()
}

fn default_input_name() -> String {
    "Input:Record".to_string()
}
