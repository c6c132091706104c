use anyhow::Result;
use std::io::Write;

use stdsync_api::StandardsApi;
use stdsync_sync::Catalog;

use super::describe_standard;

/// Handle the `list` command.
pub(crate) async fn handle_list_command<A>(api: &A, json: bool, out: &mut dyn Write) -> Result<()>
where
    A: StandardsApi + ?Sized,
{
    let standards = Catalog::new(api).list_standards().await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &standards)?;
        writeln!(out)?;
        return Ok(());
    }

    if standards.is_empty() {
        writeln!(out, "No active coding standards.")?;
        return Ok(());
    }
    for (position, standard) in standards.iter().enumerate() {
        writeln!(out, "{:>3}. {}", position + 1, describe_standard(standard))?;
    }
    Ok(())
}
