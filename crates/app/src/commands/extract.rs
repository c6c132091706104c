use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use stdsync_api::StandardsApi;
use stdsync_model::{default_output_name, write_document};
use stdsync_sync::{Catalog, ExtractOptions, Selector};

/// Handle the `extract` command. Returns the path written.
///
/// Nothing is written unless every remote read succeeded.
pub(crate) async fn handle_extract_command<A>(
    api: &A,
    selector: Selector<'_>,
    output: Option<PathBuf>,
    options: &ExtractOptions,
    out: &mut dyn Write,
) -> Result<PathBuf>
where
    A: StandardsApi + ?Sized,
{
    let catalog = Catalog::new(api);
    let standard = catalog.select_standard(selector).await?;
    let document = catalog.extract(&standard, options).await?;

    let path = output
        .unwrap_or_else(|| PathBuf::from(default_output_name(&standard.name, "standard")));
    write_document(&document, &path)?;

    let enabled = document.enabled_tools().count();
    let patterns: usize = document.tools.iter().map(|t| t.patterns.len()).sum();
    writeln!(
        out,
        "Extracted {} ({} tools, {enabled} enabled, {patterns} patterns) to {}",
        standard.name,
        document.tools.len(),
        path.display()
    )?;
    Ok(path)
}
