use super::record::TargetRecord;
use crate::{Error, Result, response::ParsedOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Output key -> record field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, output_key: impl Into<String>, field: impl Into<String>) {
        self.0.insert(output_key.into(), field.into());
    }

    pub fn target_for(&self, output_key: &str) -> Option<&str> {
        self.0.get(output_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Writes every parsed value onto its mapped record field.
///
/// All keys are resolved before the first write, so an unmapped key leaves
/// the record untouched. Fields outside the map are never modified.
pub fn apply<'r>(
    parsed: &ParsedOutput,
    record: &'r mut TargetRecord,
    field_map: &FieldMap,
) -> Result<&'r TargetRecord> {
    let writes = parsed
        .iter()
        .map(|(key, value)| {
            field_map
                .target_for(key)
                .map(|field| (field, value))
                .ok_or_else(|| Error::UnmappedKey {
                    key: key.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for (field, value) in writes {
        record.set(field, Value::String(value.to_string()));
    }

    debug!("Applied {} fields to record {}", parsed.len(), record.id);
    Ok(record)
}
