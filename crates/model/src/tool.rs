//! Tools, patterns and pattern parameters.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::standard::StandardId;

fn default_true() -> bool {
    true
}

/// An analyzer attached to a standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub uuid: String,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding_standard_id: Option<StandardId>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

impl Tool {
    pub fn new(uuid: impl Into<String>, is_enabled: bool) -> Self {
        Self {
            uuid: uuid.into(),
            is_enabled,
            coding_standard_id: None,
            patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id() == id)
    }
}

/// Static description of a rule. Only the id is interpreted; everything else
/// the remote sends (title, category, severity...) is carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single rule inside a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub pattern_definition: PatternDefinition,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            pattern_definition: PatternDefinition {
                id: id.into(),
                extra: Map::new(),
            },
            enabled,
            parameters: Parameters::default(),
            extra: Map::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.pattern_definition.id
    }
}

/// Parameter as the remote API lists and accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParameter {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

/// Pattern parameters keyed by name.
///
/// Documents may spell them as a JSON object or as the remote's
/// `[{"name": .., "value": ..}]` list; both decode to the same mapping and
/// serialize back as an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Value>);

impl Parameters {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any parameter set here has a different value in `current`.
    ///
    /// Parameters absent here are left alone remotely, so they never count.
    pub fn differs_from(&self, current: &Parameters) -> bool {
        self.0.iter().any(|(name, wanted)| match current.get(name) {
            Some(actual) => parameter_text(wanted) != parameter_text(actual),
            None => true,
        })
    }

    /// Wire form: the remote stores every value as a string.
    pub fn to_named(&self) -> Vec<NamedParameter> {
        self.0
            .iter()
            .map(|(name, value)| NamedParameter {
                name: name.clone(),
                value: Value::String(parameter_text(value)),
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Map(BTreeMap<String, Value>),
            List(Vec<NamedParameter>),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Map(map)) => Parameters(map),
            Some(Repr::List(list)) => list.into_iter().map(|p| (p.name, p.value)).collect(),
            None => Parameters::default(),
        })
    }
}

fn parameter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
