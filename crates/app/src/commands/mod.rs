//! CLI command handlers for the stdsync application.
//!
//! Handlers take the remote as a [`StandardsApi`](stdsync_api::StandardsApi)
//! and print to a caller-supplied writer, so they run unchanged against the
//! in-memory remote in tests.

mod apply;
mod check;
mod extract;
mod list;

pub(crate) use apply::{handle_apply_command, ApplyRequest};
pub(crate) use check::handle_check_command;
pub(crate) use extract::handle_extract_command;
pub(crate) use list::handle_list_command;

use stdsync_model::Standard;

/// One-line label used by `list` and the interactive prompt.
pub(crate) fn describe_standard(standard: &Standard) -> String {
    let languages = if standard.languages.is_empty() {
        "no languages".to_string()
    } else {
        standard
            .languages
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let default = if standard.is_default { ", default" } else { "" };
    format!(
        "{} (id {}{default}; {languages})",
        standard.name, standard.id
    )
}

#[cfg(test)]
mod tests;
