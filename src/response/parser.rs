use super::types::{GenerationResult, ParsedOutput};
use crate::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Decodes the first generation as a JSON object and keeps the expected keys.
///
/// Later generations are ignored. Values are taken as given; nothing checks
/// them against a vocabulary.
pub fn parse<S: AsRef<str>>(result: &GenerationResult, expected_keys: &[S]) -> Result<ParsedOutput> {
    let first = result.first().ok_or(Error::EmptyResponse)?;

    if result.generations.len() > 1 {
        debug!(
            "Discarding {} generations after the first",
            result.generations.len() - 1
        );
    }

    let text = strip_code_fence(&first.text);
    let decoded: Value = serde_json::from_str(text)
        .map_err(|e| Error::malformed(format!("generation is not valid JSON: {}", e)))?;

    let Value::Object(object) = decoded else {
        return Err(Error::malformed("generation is not a JSON object"));
    };

    let parsed = expected_keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            field_value(&object, key)
                .map(|value| (key.to_string(), value))
                .ok_or_else(|| Error::malformed(format!("missing expected key '{}'", key)))
        })
        .collect::<Result<ParsedOutput>>()?;

    debug!("Parsed {} output keys", parsed.len());
    Ok(parsed)
}

fn field_value(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Removes one surrounding Markdown code fence, including its info string.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
