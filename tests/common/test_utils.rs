use prompt_relay::{
    config::{EndpointConfig, TemplateDefinition},
    invocation::Invoker,
    mapping::{FieldMap, TargetRecord},
    prompt::GenerationConfig,
    records::MemoryRecordStore,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::MockTransport;

pub const CASE_TEMPLATE: &str = "case_classification";
pub const CASE_ID: &str = "500xx000001AbC";

/// Template that classifies a support case and writes three fields back.
pub fn case_template() -> TemplateDefinition {
    TemplateDefinition {
        id: "Case_Classification".to_string(),
        input_name: "Input:Case".to_string(),
        required_inputs: vec!["Input:Case".to_string()],
        expected_keys: vec![
            "caseType".to_string(),
            "reason".to_string(),
            "summary".to_string(),
        ],
        field_map: case_field_map(),
        generation: GenerationConfig {
            temperature: 0.2,
            ..GenerationConfig::default()
        },
    }
}

pub fn case_field_map() -> FieldMap {
    [
        ("caseType", "Type"),
        ("reason", "Reason"),
        ("summary", "Quick_Summary"),
    ]
    .into_iter()
    .collect()
}

pub fn case_record(id: &str) -> TargetRecord {
    TargetRecord::new(id)
        .with_field("Subject", "Generator will not start after install")
        .with_field("Description", "Installed yesterday, no power output today.")
        .with_field("Status", "New")
}

pub fn classification_json() -> String {
    serde_json::json!({
        "caseType": "Mechanical",
        "reason": "Installation",
        "summary": "Generator fails to start after a recent installation."
    })
    .to_string()
}

pub fn test_templates() -> BTreeMap<String, TemplateDefinition> {
    let mut templates = BTreeMap::new();
    templates.insert(CASE_TEMPLATE.to_string(), case_template());
    templates
}

pub fn test_endpoint(base_url: &str) -> EndpointConfig {
    EndpointConfig::new(base_url, "test-token")
}

/// Invoker over a mock transport and an in-memory store seeded with one case.
pub fn create_test_invoker(transport: MockTransport) -> (Invoker, MemoryRecordStore) {
    let store = MemoryRecordStore::with_records([case_record(CASE_ID)]);
    let invoker = Invoker::new(
        Arc::new(transport),
        Arc::new(store.clone()),
        test_templates(),
    );
    (invoker, store)
}
