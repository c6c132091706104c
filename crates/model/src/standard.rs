//! Coding standard metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Remote identifier of a coding standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardId(pub i64);

impl fmt::Display for StandardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StandardId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(StandardId)
    }
}

impl From<i64> for StandardId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A named, organization-scoped bundle of tool and pattern configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub id: StandardId,
    pub name: String,
    /// Drafts are not active; promotion clears this flag.
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub languages: BTreeSet<String>,
    /// Remote counters (enabled tools/patterns, linked repositories), kept as-is.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl Standard {
    /// Creates a draft standard with no timestamps.
    pub fn draft(id: impl Into<StandardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_draft: true,
            is_default: false,
            languages: BTreeSet::new(),
            meta: Value::Null,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_draft
    }

    /// Most recent known modification time, falling back to creation time.
    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.updated_at.or(self.created_at)
    }
}
