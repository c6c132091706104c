//! Reading standards and their tool/pattern state from the remote.

use futures::stream::{self, StreamExt, TryStreamExt};

use stdsync_api::StandardsApi;
use stdsync_model::{ExtractedDocument, Pattern, Standard, StandardId, Tool};

use crate::error::{PickError, Result, SyncError};

/// Caller-supplied choice among the active standards.
///
/// Returns the index of the chosen entry. Any `Fn(&[Standard]) -> Result<usize, PickError>`
/// closure works as a picker.
pub trait StandardPicker {
    fn pick(&self, standards: &[Standard]) -> std::result::Result<usize, PickError>;
}

impl<F> StandardPicker for F
where
    F: Fn(&[Standard]) -> std::result::Result<usize, PickError>,
{
    fn pick(&self, standards: &[Standard]) -> std::result::Result<usize, PickError> {
        self(standards)
    }
}

/// How to choose one standard.
pub enum Selector<'a> {
    Id(StandardId),
    Name(String),
    /// 1-based position in [`Catalog::list_standards`].
    Ordinal(usize),
    Pick(&'a dyn StandardPicker),
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Pattern listings in flight at once.
    pub concurrency: usize,
    /// Keep disabled patterns of enabled tools in the document.
    pub include_disabled_patterns: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            include_disabled_patterns: false,
        }
    }
}

/// Picks the standard named `name`, preferring the most recently modified
/// one and then the highest id.
pub fn latest_by_name<'a>(standards: &'a [Standard], name: &str) -> Option<&'a Standard> {
    standards
        .iter()
        .filter(|s| s.name == name)
        .max_by_key(|s| (s.last_modified(), s.id))
}

pub struct Catalog<'a, A: StandardsApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: StandardsApi + ?Sized> Catalog<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Active (non-draft) standards, in remote order.
    pub async fn list_standards(&self) -> Result<Vec<Standard>> {
        let mut standards = self.api.list_standards().await?;
        standards.retain(Standard::is_active);
        tracing::debug!(count = standards.len(), "Listed active standards");
        Ok(standards)
    }

    /// Resolves `selector` against the active standards. An explicit id may
    /// also name a draft.
    pub async fn select_standard(&self, selector: Selector<'_>) -> Result<Standard> {
        let all = self.api.list_standards().await?;
        let standards: Vec<Standard> = all.iter().filter(|s| s.is_active()).cloned().collect();

        let chosen = match selector {
            Selector::Id(id) => all
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| SyncError::standard_not_found(id))?,
            Selector::Name(name) => latest_by_name(&standards, &name)
                .ok_or_else(|| SyncError::standard_not_found(&name))?,
            Selector::Ordinal(position) => position
                .checked_sub(1)
                .and_then(|index| standards.get(index))
                .ok_or_else(|| SyncError::standard_not_found(format!("#{position}")))?,
            Selector::Pick(picker) => {
                if standards.is_empty() {
                    return Err(SyncError::standard_not_found("(no active standards)"));
                }
                let index = picker.pick(&standards).map_err(SyncError::Selection)?;
                standards.get(index).ok_or_else(|| {
                    SyncError::Selection(
                        format!("picker returned index {index} of {}", standards.len()).into(),
                    )
                })?
            }
        };

        tracing::info!(standard_id = %chosen.id, name = %chosen.name, "Selected standard");
        Ok(chosen.clone())
    }

    pub async fn fetch_tools(&self, id: StandardId) -> Result<Vec<Tool>> {
        Ok(self.api.list_tools(id).await?)
    }

    pub async fn fetch_patterns(&self, id: StandardId, tool: &str) -> Result<Vec<Pattern>> {
        Ok(self.api.list_patterns(id, tool).await?)
    }

    /// Reads the standard's detail, its tools and the patterns of every
    /// enabled tool into one document.
    ///
    /// Any failed read fails the whole extraction.
    pub async fn extract(
        &self,
        standard: &Standard,
        options: &ExtractOptions,
    ) -> Result<ExtractedDocument> {
        let id = standard.id;
        let detail = self.api.get_standard(id).await?;
        let mut tools = self.fetch_tools(id).await?;

        let enabled: Vec<(usize, String)> = tools
            .iter()
            .enumerate()
            .filter(|(_, tool)| tool.is_enabled)
            .map(|(index, tool)| (index, tool.uuid.clone()))
            .collect();

        let fetched: Vec<(usize, Vec<Pattern>)> = stream::iter(enabled)
            .map(|(index, uuid)| async move {
                let patterns = self.fetch_patterns(id, &uuid).await?;
                tracing::debug!(
                    standard_id = %id,
                    tool = %uuid,
                    patterns = patterns.len(),
                    "Fetched patterns"
                );
                Ok::<_, SyncError>((index, patterns))
            })
            .buffered(options.concurrency.max(1))
            .try_collect()
            .await?;

        for tool in &mut tools {
            tool.patterns.clear();
        }
        for (index, mut patterns) in fetched {
            if !options.include_disabled_patterns {
                patterns.retain(|p| p.enabled);
            }
            tools[index].patterns = patterns;
        }

        let pattern_total: usize = tools.iter().map(|t| t.patterns.len()).sum();
        tracing::info!(
            standard_id = %id,
            tools = tools.len(),
            patterns = pattern_total,
            "Extracted standard"
        );

        Ok(ExtractedDocument {
            standard: detail,
            tools,
        })
    }
}
