use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response body of the generations endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub generations: Vec<Generation>,
    /// Resolved prompt text, returned in preview mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(
        default,
        rename = "safetyScore",
        alias = "safetyScoreRepresentation",
        skip_serializing_if = "Option::is_none"
    )]
    pub safety_score: Option<Value>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            safety_score: None,
        }
    }
}

impl GenerationResult {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            generations: texts.into_iter().map(Generation::new).collect(),
            prompt: None,
        }
    }

    pub fn first(&self) -> Option<&Generation> {
        self.generations.first()
    }

    /// The resolved prompt of a preview call. Falls back to the first
    /// generation for endpoints that return the prompt as a generation.
    pub fn resolved_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .or_else(|| self.first().map(|g| g.text.as_str()))
    }
}

/// Declared output keys and their values, decoded from the first generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedOutput(BTreeMap<String, String>);

impl ParsedOutput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedOutput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
