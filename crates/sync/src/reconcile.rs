//! Driving remote tool and pattern state towards a target document.

use std::collections::BTreeSet;

use stdsync_api::{PatternUpdate, StandardsApi, ToolUpdate};
use stdsync_model::{Pattern, Standard, StandardId, TargetConfig, Tool};

use crate::catalog::latest_by_name;
use crate::error::Result;
use crate::report::{ApplyResult, PatternAction, PatternOutcome, ToolAction, ToolOutcome};

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Disable remote tools and patterns that are enabled but not listed.
    pub prune: bool,
    /// Compute the outcome with read calls only.
    pub dry_run: bool,
    /// Pattern changes sent per configure-tool call.
    pub pattern_batch_size: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            prune: false,
            dry_run: false,
            pattern_batch_size: 500,
        }
    }
}

/// Pattern changes for one tool: outcomes in report order plus the updates
/// to push, each tagged with the outcome it belongs to.
struct PatternPlan {
    outcomes: Vec<PatternOutcome>,
    updates: Vec<(usize, PatternUpdate)>,
}

/// Diffs the target patterns of an enabled tool against the remote ones.
///
/// `attached` is false when a dry run cannot read the remote patterns (the
/// tool is not on the standard yet, or is disabled there), so every target
/// pattern is reported as its desired state.
fn plan_patterns(target: &Tool, current: &[Pattern], attached: bool, prune: bool) -> PatternPlan {
    let mut plan = PatternPlan {
        outcomes: Vec::with_capacity(target.patterns.len()),
        updates: Vec::new(),
    };

    for wanted in &target.patterns {
        let action = match current.iter().find(|p| p.id() == wanted.id()) {
            None if !attached => desired(wanted),
            None => PatternAction::Missing,
            Some(remote) if remote.enabled != wanted.enabled => desired(wanted),
            Some(remote) if wanted.parameters.differs_from(&remote.parameters) => {
                PatternAction::Update
            }
            Some(_) => PatternAction::Unchanged,
        };
        if matches!(
            action,
            PatternAction::Enable | PatternAction::Disable | PatternAction::Update
        ) {
            plan.updates
                .push((plan.outcomes.len(), PatternUpdate::from_pattern(wanted)));
        }
        plan.outcomes.push(PatternOutcome::new(wanted.id(), action));
    }

    if prune {
        let listed: BTreeSet<&str> = target.patterns.iter().map(Pattern::id).collect();
        for remote in current
            .iter()
            .filter(|p| p.enabled && !listed.contains(p.id()))
        {
            plan.updates
                .push((plan.outcomes.len(), PatternUpdate::disable(remote.id())));
            plan.outcomes
                .push(PatternOutcome::new(remote.id(), PatternAction::Disable));
        }
    }

    plan
}

fn desired(pattern: &Pattern) -> PatternAction {
    if pattern.enabled {
        PatternAction::Enable
    } else {
        PatternAction::Disable
    }
}

fn tool_action(target: &Tool, remote: Option<&Tool>) -> ToolAction {
    match remote {
        None => ToolAction::Add,
        Some(remote) if remote.is_enabled == target.is_enabled => ToolAction::Unchanged,
        Some(_) if target.is_enabled => ToolAction::Enable,
        Some(_) => ToolAction::Disable,
    }
}

pub struct Reconciler<'a, A: StandardsApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: StandardsApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Existing standard named `name` (drafts included), if any.
    pub async fn find_standard(&self, name: &str) -> Result<Option<Standard>> {
        let standards = self.api.list_standards().await?;
        Ok(latest_by_name(&standards, name).cloned())
    }

    /// Returns the standard named `name`, creating it only when none exists.
    pub async fn ensure_standard(
        &self,
        name: &str,
        languages: &BTreeSet<String>,
    ) -> Result<Standard> {
        if let Some(existing) = self.find_standard(name).await? {
            if existing.languages != *languages {
                tracing::warn!(
                    standard_id = %existing.id,
                    name,
                    remote = ?existing.languages,
                    document = ?languages,
                    "Languages differ from the document; leaving them unchanged"
                );
            }
            tracing::info!(standard_id = %existing.id, name, "Using existing standard");
            return Ok(existing);
        }
        Ok(self.api.create_standard(name, languages).await?)
    }

    /// Reconciles every tool of `target` against `standard`.
    ///
    /// Only a failure to list the remote tools aborts the run; per-tool
    /// failures are recorded in the result and the remaining tools are still
    /// attempted.
    pub async fn apply(
        &self,
        standard: &Standard,
        target: &TargetConfig,
        options: &ApplyOptions,
    ) -> Result<ApplyResult> {
        let id = standard.id;
        let remote_tools = self.api.list_tools(id).await?;
        let mut result = ApplyResult::new(standard, options.dry_run);

        for tool in &target.tools {
            let remote = remote_tools.iter().find(|t| t.uuid == tool.uuid);
            let outcome = self.apply_tool(id, tool, remote, options).await;
            if let Some(error) = &outcome.error {
                tracing::warn!(
                    standard_id = %id,
                    tool = %tool.uuid,
                    error = %error,
                    "Tool failed"
                );
            }
            result.push(outcome);
        }

        if options.prune {
            for remote in remote_tools
                .iter()
                .filter(|t| t.is_enabled && target.tool(&t.uuid).is_none())
            {
                let mut outcome = ToolOutcome::new(&remote.uuid, ToolAction::Disable);
                if !options.dry_run {
                    if let Err(err) = self
                        .api
                        .configure_tool(id, &remote.uuid, &ToolUpdate::toggle(false))
                        .await
                    {
                        outcome.error = Some(err.to_string());
                    }
                }
                result.push(outcome);
            }
        }

        tracing::info!(
            standard_id = %id,
            dry_run = options.dry_run,
            changes = result.changes(),
            success = result.success,
            "Reconciled standard"
        );
        Ok(result)
    }

    async fn apply_tool(
        &self,
        id: StandardId,
        tool: &Tool,
        remote: Option<&Tool>,
        options: &ApplyOptions,
    ) -> ToolOutcome {
        let action = tool_action(tool, remote);
        let mut outcome = ToolOutcome::new(&tool.uuid, action);

        if action != ToolAction::Unchanged && !options.dry_run {
            let toggle = ToolUpdate::toggle(tool.is_enabled);
            if let Err(err) = self.api.configure_tool(id, &tool.uuid, &toggle).await {
                outcome.error = Some(err.to_string());
                return outcome;
            }
        }

        if !tool.is_enabled {
            outcome.patterns = tool
                .patterns
                .iter()
                .map(|p| PatternOutcome::new(p.id(), PatternAction::Skipped))
                .collect();
            return outcome;
        }

        // A disabled remote tool exposes no pattern state until it is enabled.
        let attached = remote.is_some_and(|r| r.is_enabled) || !options.dry_run;
        let current = if attached {
            match self.api.list_patterns(id, &tool.uuid).await {
                Ok(patterns) => patterns,
                Err(err) => {
                    outcome.error = Some(err.to_string());
                    return outcome;
                }
            }
        } else {
            Vec::new()
        };

        let PatternPlan {
            mut outcomes,
            updates,
        } = plan_patterns(tool, &current, attached, options.prune);

        if !options.dry_run {
            for batch in updates.chunks(options.pattern_batch_size.max(1)) {
                let update = ToolUpdate {
                    enabled: true,
                    patterns: batch.iter().map(|(_, u)| u.clone()).collect(),
                };
                if let Err(err) = self.api.configure_tool(id, &tool.uuid, &update).await {
                    let message = err.to_string();
                    tracing::warn!(
                        standard_id = %id,
                        tool = %tool.uuid,
                        patterns = batch.len(),
                        error = %message,
                        "Pattern batch failed"
                    );
                    for (index, _) in batch {
                        outcomes[*index].error = Some(message.clone());
                    }
                }
            }
        }

        outcome.patterns = outcomes;
        outcome
    }

    /// Activates `standard`. Already active standards are returned as-is
    /// without a remote call.
    pub async fn promote(&self, standard: &Standard) -> Result<Standard> {
        if standard.is_active() {
            tracing::debug!(standard_id = %standard.id, "Standard already active");
            return Ok(standard.clone());
        }
        self.api.promote_standard(standard.id).await?;
        let mut promoted = standard.clone();
        promoted.is_draft = false;
        Ok(promoted)
    }
}
