//! Configuration document loading.
//!
//! The loader decodes into permissive raw structs first so that a missing
//! identifier can be reported with its position in the document instead of a
//! bare serde message. Unknown fields are ignored, which also lets an
//! extracted document be fed straight back in as a target.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{ConfigError, DocumentError};
use crate::tool::{Parameters, Pattern, PatternDefinition, Tool};

/// Desired state of a standard: its languages and the tools to drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetConfig {
    pub languages: BTreeSet<String>,
    pub tools: Vec<Tool>,
}

impl TargetConfig {
    /// Parses and validates a configuration document.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        raw.validate()
    }

    /// Validates an already decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_value(value)?;
        raw.validate()
    }

    pub fn tool(&self, uuid: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.uuid == uuid)
    }

    pub fn pattern_count(&self) -> usize {
        self.tools.iter().map(|t| t.patterns.len()).sum()
    }
}

/// Reads and validates a configuration document from disk.
pub fn load_config(path: &Path) -> Result<TargetConfig, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = TargetConfig::parse(&text).map_err(|source| DocumentError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        tools = config.tools.len(),
        patterns = config.pattern_count(),
        "Loaded configuration document"
    );
    Ok(config)
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    languages: BTreeSet<String>,
    #[serde(default)]
    tools: Vec<RawTool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTool {
    uuid: Option<String>,
    is_enabled: Option<bool>,
    #[serde(default)]
    patterns: Vec<RawPattern>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPattern {
    pattern_definition: Option<RawDefinition>,
    enabled: Option<bool>,
    #[serde(default)]
    parameters: Parameters,
}

#[derive(Deserialize)]
struct RawDefinition {
    id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn required(
    value: Option<String>,
    field: &'static str,
    location: &str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField {
            field,
            location: location.to_string(),
        }),
    }
}

impl RawDocument {
    fn validate(self) -> Result<TargetConfig, ConfigError> {
        let mut seen_tools = HashSet::new();
        let mut tools = Vec::with_capacity(self.tools.len());

        for (index, raw) in self.tools.into_iter().enumerate() {
            let location = format!("tools[{index}]");
            let uuid = required(raw.uuid, "uuid", &location)?;
            if !seen_tools.insert(uuid.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "tool",
                    id: uuid,
                    location,
                });
            }

            let mut seen_patterns = HashSet::new();
            let mut patterns = Vec::with_capacity(raw.patterns.len());
            for (p_index, raw_pattern) in raw.patterns.into_iter().enumerate() {
                let p_location = format!("{location}.patterns[{p_index}]");
                let (id, extra) = match raw_pattern.pattern_definition {
                    Some(def) => (def.id, def.extra),
                    None => (None, Map::new()),
                };
                let id = required(id, "patternDefinition.id", &p_location)?;
                if !seen_patterns.insert(id.clone()) {
                    return Err(ConfigError::Duplicate {
                        kind: "pattern",
                        id,
                        location: p_location,
                    });
                }
                patterns.push(Pattern {
                    pattern_definition: PatternDefinition { id, extra },
                    enabled: raw_pattern.enabled.unwrap_or(true),
                    parameters: raw_pattern.parameters,
                    extra: Map::new(),
                });
            }

            tools.push(Tool {
                uuid,
                is_enabled: raw.is_enabled.unwrap_or(true),
                coding_standard_id: None,
                patterns,
            });
        }

        Ok(TargetConfig {
            languages: self.languages,
            tools,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_document() {
        let config = TargetConfig::from_value(json!({
            "languages": ["python"],
            "tools": [{
                "uuid": "t1",
                "isEnabled": true,
                "patterns": [{"patternDefinition": {"id": "p1"}, "enabled": true, "parameters": {}}]
            }]
        }))
        .unwrap();

        assert_eq!(config.languages.iter().collect::<Vec<_>>(), vec!["python"]);
        let tool = config.tool("t1").unwrap();
        assert!(tool.is_enabled);
        assert!(tool.pattern("p1").unwrap().enabled);
        assert_eq!(config.pattern_count(), 1);
    }

    #[test]
    fn missing_tool_uuid_names_its_position() {
        let err = TargetConfig::from_value(json!({
            "tools": [{"uuid": "t1"}, {"isEnabled": true}]
        }))
        .unwrap_err();

        match err {
            ConfigError::MissingField { field, location } => {
                assert_eq!(field, "uuid");
                assert_eq!(location, "tools[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_uuid_counts_as_missing() {
        let err = TargetConfig::from_value(json!({"tools": [{"uuid": "  "}]})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "uuid", .. }));
    }

    #[test]
    fn missing_pattern_id_names_tool_and_pattern_position() {
        let err = TargetConfig::from_value(json!({
            "tools": [{
                "uuid": "t1",
                "patterns": [{"patternDefinition": {"id": "p1"}}, {"patternDefinition": {}}]
            }]
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing required field `patternDefinition.id` at tools[0].patterns[1]"
        );
    }

    #[test]
    fn pattern_without_definition_is_rejected() {
        let err = TargetConfig::from_value(json!({
            "tools": [{"uuid": "t1", "patterns": [{"enabled": true}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let err = TargetConfig::from_value(json!({
            "tools": [{"uuid": "t1"}, {"uuid": "t1"}]
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Duplicate { kind: "tool", .. }));

        let err = TargetConfig::from_value(json!({
            "tools": [{"uuid": "t1", "patterns": [
                {"patternDefinition": {"id": "p"}},
                {"patternDefinition": {"id": "p"}}
            ]}]
        }))
        .unwrap_err();
        match err {
            ConfigError::Duplicate { kind, location, .. } => {
                assert_eq!(kind, "pattern");
                assert_eq!(location, "tools[0].patterns[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn flags_and_parameters_default() {
        let config = TargetConfig::from_value(json!({
            "tools": [{"uuid": "t1", "patterns": [{"patternDefinition": {"id": "p1"}}]}]
        }))
        .unwrap();
        let tool = &config.tools[0];
        assert!(tool.is_enabled);
        assert!(tool.patterns[0].enabled);
        assert!(tool.patterns[0].parameters.is_empty());
        assert!(config.languages.is_empty());
    }

    #[test]
    fn extracted_documents_are_accepted() {
        let config = TargetConfig::from_value(json!({
            "id": 9,
            "name": "baseline",
            "isDraft": false,
            "languages": ["Go"],
            "tools": [{
                "codingStandardId": 9,
                "uuid": "t1",
                "isEnabled": false,
                "patterns": [{
                    "patternDefinition": {"id": "p1", "title": "t"},
                    "enabled": false,
                    "parameters": [{"name": "max", "value": "3"}]
                }]
            }]
        }))
        .unwrap();

        let pattern = &config.tools[0].patterns[0];
        assert!(!config.tools[0].is_enabled);
        assert!(!pattern.enabled);
        assert_eq!(pattern.parameters.get("max"), Some(&json!("3")));
        assert_eq!(pattern.pattern_definition.extra["title"], "t");
    }

    #[test]
    fn syntax_errors_surface_as_parse_errors() {
        let err = TargetConfig::parse("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = TargetConfig::parse(r#"{"tools": [{"uuid": 5}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[test]
    fn load_config_wraps_validation_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tools": [{}]}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
        assert!(err.to_string().contains("tools[0]"));
    }
}
