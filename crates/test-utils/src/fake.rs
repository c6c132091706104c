//! In-memory stand-in for the remote coding-standard API.

use async_trait::async_trait;
use reqwest::Method;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use stdsync_api::{ApiError, StandardsApi, ToolUpdate};
use stdsync_model::{Pattern, Standard, StandardId, Tool};

/// One call received by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListStandards,
    GetStandard(StandardId),
    CreateStandard(String),
    ListTools(StandardId),
    ListPatterns(StandardId, String),
    ConfigureTool(StandardId, String, ToolUpdate),
    Promote(StandardId),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateStandard(_) | Self::ConfigureTool(..) | Self::Promote(_)
        )
    }
}

#[derive(Default)]
struct State {
    next_id: i64,
    standards: Vec<Standard>,
    tools: BTreeMap<StandardId, Vec<Tool>>,
    /// Patterns a tool exposes once it is attached to a standard.
    catalog: BTreeMap<String, Vec<Pattern>>,
    failing_tools: BTreeSet<String>,
    failing_pattern_lists: BTreeSet<String>,
    calls: Vec<Call>,
}

/// Remote state held in memory, with per-tool failure injection and a call log.
///
/// Tools attached through `configure_tool` pick up their patterns from the
/// catalog, all disabled, the way a freshly associated analyzer starts out.
/// `list_tools` answers without patterns, like the real listing.
pub struct FakeRemote {
    state: Mutex<State>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers the patterns `uuid` exposes when attached to a standard.
    pub fn with_catalog_tool(self, uuid: &str, pattern_ids: &[&str]) -> Self {
        let patterns = pattern_ids
            .iter()
            .map(|id| Pattern::new(*id, false))
            .collect();
        self.lock().catalog.insert(uuid.to_string(), patterns);
        self
    }

    /// Seeds an existing standard together with its tools and patterns.
    pub fn with_standard(self, standard: Standard, tools: Vec<Tool>) -> Self {
        {
            let mut state = self.lock();
            state.next_id = state.next_id.max(standard.id.0 + 1);
            let tools = tools
                .into_iter()
                .map(|mut tool| {
                    tool.coding_standard_id = Some(standard.id);
                    tool
                })
                .collect();
            state.tools.insert(standard.id, tools);
            state.standards.push(standard);
        }
        self
    }

    /// Makes every `configure_tool` call for `uuid` fail with HTTP 500.
    pub fn fail_tool(&self, uuid: &str) {
        self.lock().failing_tools.insert(uuid.to_string());
    }

    /// Makes every `list_patterns` call for `uuid` fail with HTTP 500.
    pub fn fail_pattern_listing(&self, uuid: &str) {
        self.lock().failing_pattern_lists.insert(uuid.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn standards(&self) -> Vec<Standard> {
        self.lock().standards.clone()
    }

    pub fn standard_named(&self, name: &str) -> Option<Standard> {
        self.lock()
            .standards
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    /// Full remote tool state of a standard, patterns included.
    pub fn tools(&self, id: StandardId) -> Vec<Tool> {
        self.lock().tools.get(&id).cloned().unwrap_or_default()
    }

    pub fn tool(&self, id: StandardId, uuid: &str) -> Option<Tool> {
        self.tools(id).into_iter().find(|t| t.uuid == uuid)
    }
}

fn failure(method: Method, path: String, status: u16, body: &str) -> ApiError {
    ApiError::Status {
        method,
        path,
        status,
        body: body.to_string(),
        attempts: 1,
    }
}

fn not_found(method: Method, path: String) -> ApiError {
    failure(method, path, 404, "not found")
}

impl State {
    fn standard_mut(
        &mut self,
        id: StandardId,
        method: Method,
    ) -> stdsync_api::Result<&mut Standard> {
        self.standards
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(method, format!("coding-standards/{id}")))
    }
}

#[async_trait]
impl StandardsApi for FakeRemote {
    async fn list_standards(&self) -> stdsync_api::Result<Vec<Standard>> {
        let mut state = self.lock();
        state.calls.push(Call::ListStandards);
        Ok(state.standards.clone())
    }

    async fn get_standard(&self, id: StandardId) -> stdsync_api::Result<Standard> {
        let mut state = self.lock();
        state.calls.push(Call::GetStandard(id));
        state.standard_mut(id, Method::GET).map(|s| s.clone())
    }

    async fn create_standard(
        &self,
        name: &str,
        languages: &BTreeSet<String>,
    ) -> stdsync_api::Result<Standard> {
        let mut state = self.lock();
        state.calls.push(Call::CreateStandard(name.to_string()));
        let id = StandardId(state.next_id);
        state.next_id += 1;
        let mut standard = Standard::draft(id, name);
        standard.languages = languages.clone();
        state.standards.push(standard.clone());
        state.tools.insert(id, Vec::new());
        Ok(standard)
    }

    async fn list_tools(&self, id: StandardId) -> stdsync_api::Result<Vec<Tool>> {
        let mut state = self.lock();
        state.calls.push(Call::ListTools(id));
        let tools = state
            .tools
            .get(&id)
            .ok_or_else(|| not_found(Method::GET, format!("coding-standards/{id}/tools")))?;
        Ok(tools
            .iter()
            .map(|tool| Tool {
                patterns: Vec::new(),
                ..tool.clone()
            })
            .collect())
    }

    async fn list_patterns(&self, id: StandardId, tool: &str) -> stdsync_api::Result<Vec<Pattern>> {
        let mut state = self.lock();
        state.calls.push(Call::ListPatterns(id, tool.to_string()));
        let path = format!("coding-standards/{id}/tools/{tool}/patterns");
        if state.failing_pattern_lists.contains(tool) {
            return Err(failure(Method::GET, path, 500, "injected failure"));
        }
        let attached = state
            .tools
            .get(&id)
            .and_then(|tools| tools.iter().find(|t| t.uuid == tool))
            .ok_or_else(|| not_found(Method::GET, path.clone()))?;
        // Pattern state of a disabled tool is not served.
        if !attached.is_enabled {
            return Err(failure(Method::GET, path, 400, "tool is disabled"));
        }
        Ok(attached.patterns.clone())
    }

    async fn configure_tool(
        &self,
        id: StandardId,
        tool: &str,
        update: &ToolUpdate,
    ) -> stdsync_api::Result<()> {
        let mut state = self.lock();
        state
            .calls
            .push(Call::ConfigureTool(id, tool.to_string(), update.clone()));
        let path = format!("coding-standards/{id}/tools/{tool}");
        if state.failing_tools.contains(tool) {
            return Err(failure(Method::PATCH, path, 500, "injected failure"));
        }

        let catalog = state.catalog.get(tool).cloned().unwrap_or_default();
        let tools = state
            .tools
            .get_mut(&id)
            .ok_or_else(|| not_found(Method::PATCH, path.clone()))?;
        if !tools.iter().any(|t| t.uuid == tool) {
            let mut attached = Tool::new(tool, false).with_patterns(catalog);
            attached.coding_standard_id = Some(id);
            tools.push(attached);
        }
        let Some(current) = tools.iter_mut().find(|t| t.uuid == tool) else {
            return Err(not_found(Method::PATCH, path));
        };

        // Validate first so a rejected request leaves no partial state.
        if let Some(unknown) = update
            .patterns
            .iter()
            .find(|p| current.pattern(&p.id).is_none())
        {
            return Err(failure(
                Method::PATCH,
                path,
                404,
                &format!("pattern {} not found", unknown.id),
            ));
        }

        current.is_enabled = update.enabled;
        for change in &update.patterns {
            if let Some(pattern) = current.patterns.iter_mut().find(|p| p.id() == change.id) {
                pattern.enabled = change.enabled;
                for named in &change.parameters {
                    pattern
                        .parameters
                        .insert(named.name.clone(), named.value.clone());
                }
            }
        }
        Ok(())
    }

    async fn promote_standard(&self, id: StandardId) -> stdsync_api::Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Promote(id));
        state.standard_mut(id, Method::POST)?.is_draft = false;
        Ok(())
    }
}
