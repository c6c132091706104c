//! The denormalized document produced by extraction.

use serde::{Deserialize, Serialize};

use crate::config::TargetConfig;
use crate::standard::Standard;
use crate::tool::Tool;

/// A standard's metadata with every tool and the patterns fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(flatten)]
    pub standard: Standard,
    pub tools: Vec<Tool>,
}

impl ExtractedDocument {
    /// Projects the document onto the shape the reconciler consumes.
    pub fn to_target(&self) -> TargetConfig {
        TargetConfig {
            languages: self.standard.languages.clone(),
            tools: self.tools.clone(),
        }
    }

    pub fn tool(&self, uuid: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.uuid == uuid)
    }

    pub fn enabled_tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter().filter(|t| t.is_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Pattern;
    use serde_json::json;

    fn document() -> ExtractedDocument {
        let mut standard = Standard::draft(3, "baseline");
        standard.languages.insert("python".into());
        ExtractedDocument {
            standard,
            tools: vec![
                Tool::new("t1", true).with_patterns(vec![Pattern::new("p1", true)]),
                Tool::new("t2", false),
            ],
        }
    }

    #[test]
    fn serializes_metadata_flat_beside_tools() {
        let value = serde_json::to_value(document()).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "baseline");
        assert_eq!(value["languages"], json!(["python"]));
        assert_eq!(value["tools"][0]["uuid"], "t1");
        assert_eq!(value["tools"][0]["isEnabled"], true);
        assert_eq!(value["tools"][1]["isEnabled"], false);
        assert_eq!(
            value["tools"][0]["patterns"][0]["patternDefinition"]["id"],
            "p1"
        );
    }

    #[test]
    fn converts_to_target_config() {
        let doc = document();
        let target = doc.to_target();
        assert_eq!(target.languages, doc.standard.languages);
        assert_eq!(target.tools.len(), 2);
        assert_eq!(doc.enabled_tools().count(), 1);
        assert!(doc.tool("t2").is_some());
    }

    #[test]
    fn written_document_reloads_as_target() {
        let text = serde_json::to_string(&document()).unwrap();
        let target = TargetConfig::parse(&text).unwrap();
        assert_eq!(target, document().to_target());
    }
}
