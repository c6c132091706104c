use anyhow::{bail, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use stdsync_api::StandardsApi;
use stdsync_model::{default_output_name, load_config, write_document, Standard};
use stdsync_sync::{ApplyOptions, ApplyResult, Reconciler};

pub(crate) struct ApplyRequest {
    pub name: String,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub promote: bool,
    pub options: ApplyOptions,
}

/// Result document: the standard as it ended up plus the step report.
#[derive(Serialize)]
struct ApplyDocument<'a> {
    standard: &'a Standard,
    result: &'a ApplyResult,
}

/// Handle the `apply` command.
///
/// The document is loaded and validated before the first remote call. The
/// result file is written even when some steps failed; the command then
/// returns an error so the process exits non-zero.
pub(crate) async fn handle_apply_command<A>(
    api: &A,
    request: ApplyRequest,
    out: &mut dyn Write,
) -> Result<()>
where
    A: StandardsApi + ?Sized,
{
    let target = load_config(&request.config)?;
    let reconciler = Reconciler::new(api);
    let dry_run = request.options.dry_run;

    let standard = if dry_run {
        match reconciler.find_standard(&request.name).await? {
            Some(existing) => existing,
            None => {
                writeln!(
                    out,
                    "Standard {} does not exist; applying would create it with {} tool(s) and {} pattern(s).",
                    request.name,
                    target.tools.len(),
                    target.pattern_count()
                )?;
                return Ok(());
            }
        }
    } else {
        reconciler
            .ensure_standard(&request.name, &target.languages)
            .await?
    };

    let result = reconciler
        .apply(&standard, &target, &request.options)
        .await?;

    let standard = if request.promote && !dry_run {
        if result.success {
            reconciler.promote(&standard).await?
        } else {
            tracing::warn!(
                standard_id = %standard.id,
                "Not promoting standard because some steps failed"
            );
            standard
        }
    } else {
        standard
    };

    let path = request
        .output
        .unwrap_or_else(|| PathBuf::from(default_output_name(&request.name, "result")));
    write_document(
        &ApplyDocument {
            standard: &standard,
            result: &result,
        },
        &path,
    )?;

    write!(out, "{}", result.format_summary())?;
    writeln!(out, "Result written to {}", path.display())?;

    if !result.success {
        bail!(
            "{} reconciliation step(s) failed; see {}",
            result.failures().len(),
            path.display()
        );
    }
    Ok(())
}
