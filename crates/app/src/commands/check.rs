use anyhow::{bail, Result};
use std::io::Write;
use std::path::Path;

use stdsync_api::StandardsApi;
use stdsync_model::load_config;
use stdsync_sync::{ApplyOptions, Catalog, Reconciler, Selector};

/// Handle the `check` command: a read-only apply that fails on any drift.
pub(crate) async fn handle_check_command<A>(
    api: &A,
    selector: Selector<'_>,
    config: &Path,
    prune: bool,
    out: &mut dyn Write,
) -> Result<()>
where
    A: StandardsApi + ?Sized,
{
    let target = load_config(config)?;
    let standard = Catalog::new(api).select_standard(selector).await?;

    let options = ApplyOptions {
        prune,
        dry_run: true,
        ..ApplyOptions::default()
    };
    let result = Reconciler::new(api)
        .apply(&standard, &target, &options)
        .await?;

    write!(out, "{}", result.format_summary())?;
    if result.has_drift() {
        bail!(
            "standard {} drifted from {}: {} change(s), {} failure(s)",
            standard.name,
            config.display(),
            result.changes(),
            result.failures().len()
        );
    }
    writeln!(out, "No drift.")?;
    Ok(())
}
