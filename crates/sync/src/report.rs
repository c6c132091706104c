//! Outcome reporting for reconciliation runs.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

use stdsync_model::{Standard, StandardId};

/// What happened (or would happen, in a dry run) to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAction {
    /// Attached to the standard for the first time.
    Add,
    Enable,
    Disable,
    Unchanged,
}

impl fmt::Display for ToolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Add => "add",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Unchanged => "unchanged",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternAction {
    Enable,
    Disable,
    /// Enabled flag kept, parameter values changed.
    Update,
    Unchanged,
    /// Listed in the document but unknown to the tool remotely.
    Missing,
    /// Belongs to a disabled tool and was not reconciled.
    Skipped,
}

impl PatternAction {
    fn is_change(self) -> bool {
        matches!(self, Self::Enable | Self::Disable | Self::Update)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOutcome {
    pub id: String,
    pub action: PatternAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatternOutcome {
    pub fn new(id: impl Into<String>, action: PatternAction) -> Self {
        Self {
            id: id.into(),
            action,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some() || self.action == PatternAction::Missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub uuid: String,
    pub action: ToolAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub patterns: Vec<PatternOutcome>,
}

impl ToolOutcome {
    pub fn new(uuid: impl Into<String>, action: ToolAction) -> Self {
        Self {
            uuid: uuid.into(),
            action,
            error: None,
            patterns: Vec::new(),
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some() || self.patterns.iter().any(PatternOutcome::failed)
    }

    fn pattern_changes(&self) -> usize {
        self.patterns
            .iter()
            .filter(|p| p.error.is_none() && p.action.is_change())
            .count()
    }

    pub fn pattern(&self, id: &str) -> Option<&PatternOutcome> {
        self.patterns.iter().find(|p| p.id == id)
    }
}

/// Per-tool and per-pattern account of one `apply` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub standard_id: StandardId,
    pub standard_name: String,
    pub dry_run: bool,
    /// False when any tool or pattern step failed.
    pub success: bool,
    pub tools: Vec<ToolOutcome>,
}

impl ApplyResult {
    pub fn new(standard: &Standard, dry_run: bool) -> Self {
        Self {
            standard_id: standard.id,
            standard_name: standard.name.clone(),
            dry_run,
            success: true,
            tools: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, outcome: ToolOutcome) {
        if outcome.failed() {
            self.success = false;
        }
        self.tools.push(outcome);
    }

    pub fn tool(&self, uuid: &str) -> Option<&ToolOutcome> {
        self.tools.iter().find(|t| t.uuid == uuid)
    }

    /// Number of tool and pattern actions that change remote state. Failed
    /// steps are not counted.
    pub fn changes(&self) -> usize {
        self.tools
            .iter()
            .map(|tool| {
                let own = tool.error.is_none() && tool.action != ToolAction::Unchanged;
                usize::from(own) + tool.pattern_changes()
            })
            .sum()
    }

    /// One line per failed tool or pattern step.
    pub fn failures(&self) -> Vec<String> {
        let mut out = Vec::new();
        for tool in &self.tools {
            if let Some(error) = &tool.error {
                out.push(format!("tool {}: {error}", tool.uuid));
            }
            for pattern in tool.patterns.iter().filter(|p| p.failed()) {
                let reason = pattern
                    .error
                    .as_deref()
                    .unwrap_or("pattern not found in tool");
                out.push(format!("tool {} pattern {}: {reason}", tool.uuid, pattern.id));
            }
        }
        out
    }

    /// True when the remote differs from the document in any way.
    pub fn has_drift(&self) -> bool {
        self.changes() > 0 || !self.success
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        let verb = if self.dry_run { "Plan" } else { "Applied" };
        let _ = writeln!(
            out,
            "{verb}: standard {} ({})",
            self.standard_name, self.standard_id
        );
        for tool in &self.tools {
            let changed = tool.pattern_changes();
            let skipped = tool
                .patterns
                .iter()
                .filter(|p| p.action == PatternAction::Skipped)
                .count();
            let _ = write!(
                out,
                "  {:<40} {:<9} {changed} pattern change(s)",
                tool.uuid, tool.action
            );
            if skipped > 0 {
                let _ = write!(out, ", {skipped} skipped");
            }
            out.push('\n');
        }
        for failure in self.failures() {
            let _ = writeln!(out, "  FAILED {failure}");
        }
        let _ = writeln!(
            out,
            "  {} change(s), {} failure(s)",
            self.changes(),
            self.failures().len()
        );
        out
    }
}
