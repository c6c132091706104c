//! Coding-standard endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

use stdsync_model::{NamedParameter, Pattern, Standard, StandardId, Tool};

use crate::client::ApiClient;
use crate::Result;

/// Body of the configure-tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolUpdate {
    pub enabled: bool,
    pub patterns: Vec<PatternUpdate>,
}

impl ToolUpdate {
    /// Flips only the tool flag.
    pub fn toggle(enabled: bool) -> Self {
        Self {
            enabled,
            patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternUpdate {
    pub id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<NamedParameter>,
}

impl PatternUpdate {
    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self {
            id: pattern.id().to_string(),
            enabled: pattern.enabled,
            parameters: pattern.parameters.to_named(),
        }
    }

    /// Disables a pattern without touching its parameters.
    pub fn disable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
            parameters: Vec::new(),
        }
    }
}

/// Remote operations on an organization's coding standards.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait StandardsApi: Send + Sync {
    /// Every standard of the organization, drafts included.
    async fn list_standards(&self) -> Result<Vec<Standard>>;

    async fn get_standard(&self, id: StandardId) -> Result<Standard>;

    async fn create_standard(&self, name: &str, languages: &BTreeSet<String>) -> Result<Standard>;

    async fn list_tools(&self, id: StandardId) -> Result<Vec<Tool>>;

    /// Pattern state of one tool. Only meaningful for enabled tools.
    async fn list_patterns(&self, id: StandardId, tool: &str) -> Result<Vec<Pattern>>;

    /// Associates, enables or disables a tool and updates the listed patterns.
    async fn configure_tool(&self, id: StandardId, tool: &str, update: &ToolUpdate) -> Result<()>;

    async fn promote_standard(&self, id: StandardId) -> Result<()>;
}

/// [`StandardsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct StandardsClient {
    client: ApiClient,
}

impl StandardsClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

const STANDARDS: &str = "coding-standards";

#[async_trait]
impl StandardsApi for StandardsClient {
    async fn list_standards(&self) -> Result<Vec<Standard>> {
        self.client.list_all(&[STANDARDS]).await
    }

    async fn get_standard(&self, id: StandardId) -> Result<Standard> {
        let id = id.to_string();
        self.client.get_data(&[STANDARDS, &id]).await
    }

    async fn create_standard(&self, name: &str, languages: &BTreeSet<String>) -> Result<Standard> {
        let body = json!({ "name": name, "languages": languages });
        tracing::info!(name, languages = ?languages, "Creating coding standard");
        self.client
            .send_data(Method::POST, &[STANDARDS], &body)
            .await
    }

    async fn list_tools(&self, id: StandardId) -> Result<Vec<Tool>> {
        let id = id.to_string();
        self.client.list_all(&[STANDARDS, &id, "tools"]).await
    }

    async fn list_patterns(&self, id: StandardId, tool: &str) -> Result<Vec<Pattern>> {
        let id = id.to_string();
        self.client
            .list_all(&[STANDARDS, &id, "tools", tool, "patterns"])
            .await
    }

    async fn configure_tool(&self, id: StandardId, tool: &str, update: &ToolUpdate) -> Result<()> {
        let id_text = id.to_string();
        let body = json!(update);
        tracing::debug!(
            standard_id = %id,
            tool,
            enabled = update.enabled,
            patterns = update.patterns.len(),
            "Configuring tool"
        );
        self.client
            .request(Method::PATCH, &[STANDARDS, &id_text, "tools", tool], &[], Some(&body))
            .await?;
        Ok(())
    }

    async fn promote_standard(&self, id: StandardId) -> Result<()> {
        let id_text = id.to_string();
        tracing::info!(standard_id = %id, "Promoting coding standard");
        self.client
            .request(Method::POST, &[STANDARDS, &id_text, "promote"], &[], None)
            .await?;
        Ok(())
    }
}
