use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use stdsync_model::StandardId;
use stdsync_sync::{Selector, StandardPicker};

/// Command-line interface for the `stdsync` application.
#[derive(Debug, Parser)]
#[command(
    name = "stdsync",
    version,
    about = "Extracts Codacy coding standards to JSON and applies JSON documents back"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct OrganizationArgs {
    /// Organization name as it appears in Codacy URLs.
    #[arg(long, short = 'o', env = "CODACY_ORGANIZATION", value_name = "ORG")]
    pub organization: String,
}

/// Chooses a standard; without any flag the user is prompted.
#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct SelectArgs {
    /// Remote id of the standard; drafts are accepted.
    #[arg(long, value_name = "ID")]
    pub standard_id: Option<i64>,
    /// Standard name; the most recently updated wins when several share it.
    #[arg(long = "standard", value_name = "NAME")]
    pub standard_name: Option<String>,
    /// 1-based position in the `list` output.
    #[arg(long, value_name = "N")]
    pub index: Option<usize>,
}

impl SelectArgs {
    pub fn selector<'a>(&self, picker: &'a dyn StandardPicker) -> Selector<'a> {
        if let Some(id) = self.standard_id {
            Selector::Id(StandardId(id))
        } else if let Some(name) = &self.standard_name {
            Selector::Name(name.clone())
        } else if let Some(index) = self.index {
            Selector::Ordinal(index)
        } else {
            Selector::Pick(picker)
        }
    }
}

/// Available `stdsync` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lists the organization's active coding standards.
    List {
        #[command(flatten)]
        org: OrganizationArgs,
        /// Print the standards as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Writes a standard with all its tools and patterns to a JSON document.
    Extract {
        #[command(flatten)]
        org: OrganizationArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Output file (defaults to `<name>_standard.json`).
        #[arg(long, short = 'O', value_name = "PATH")]
        output: Option<PathBuf>,
        /// Keep disabled patterns of enabled tools.
        #[arg(long, default_value_t = false)]
        include_disabled_patterns: bool,
        /// Pattern listings fetched in parallel.
        #[arg(long, default_value_t = 4, value_name = "N")]
        concurrency: usize,
    },
    /// Creates or updates a standard from a JSON document and promotes it.
    Apply {
        #[command(flatten)]
        org: OrganizationArgs,
        /// Name of the standard to create or update.
        #[arg(long, value_name = "NAME")]
        name: String,
        /// Configuration document to apply.
        #[arg(long, short = 'c', value_name = "PATH")]
        config: PathBuf,
        /// Result file (defaults to `<name>_result.json`).
        #[arg(long, short = 'O', value_name = "PATH")]
        output: Option<PathBuf>,
        /// Disable enabled tools and patterns the document does not list.
        #[arg(long, default_value_t = false)]
        prune: bool,
        /// Report what would change without modifying anything.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Leave a newly created standard as a draft.
        #[arg(long, default_value_t = false)]
        no_promote: bool,
        /// Pattern changes sent per request.
        #[arg(long, default_value_t = 500, value_name = "N")]
        batch_size: usize,
    },
    /// Compares a document with an existing standard; exits non-zero on drift.
    Check {
        #[command(flatten)]
        org: OrganizationArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Configuration document to compare against.
        #[arg(long, short = 'c', value_name = "PATH")]
        config: PathBuf,
        /// Also report enabled tools and patterns the document does not list.
        #[arg(long, default_value_t = false)]
        prune: bool,
    },
}

impl Commands {
    pub fn organization(&self) -> &str {
        match self {
            Self::List { org, .. }
            | Self::Extract { org, .. }
            | Self::Apply { org, .. }
            | Self::Check { org, .. } => &org.organization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stdsync_model::Standard;
    use stdsync_sync::PickError;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("stdsync").chain(args.iter().copied()))
    }

    #[test]
    fn apply_parses_flags() {
        let cli = parse(&[
            "apply", "-o", "acme", "--name", "baseline", "-c", "doc.json", "--prune", "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply {
                org,
                name,
                config,
                prune,
                dry_run,
                no_promote,
                batch_size,
                ..
            } => {
                assert_eq!(org.organization, "acme");
                assert_eq!(name, "baseline");
                assert_eq!(config, PathBuf::from("doc.json"));
                assert!(prune && dry_run && !no_promote);
                assert_eq!(batch_size, 500);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn selector_flags_are_mutually_exclusive() {
        let err = parse(&[
            "extract", "-o", "acme", "--standard-id", "3", "--standard", "baseline",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn selector_prefers_explicit_flags_over_prompt() {
        let picker = |_: &[Standard]| -> Result<usize, PickError> { Ok(0) };

        let by_id = SelectArgs {
            standard_id: Some(3),
            ..SelectArgs::default()
        };
        assert!(matches!(by_id.selector(&picker), Selector::Id(StandardId(3))));

        let by_index = SelectArgs {
            index: Some(2),
            ..SelectArgs::default()
        };
        assert!(matches!(by_index.selector(&picker), Selector::Ordinal(2)));

        assert!(matches!(
            SelectArgs::default().selector(&picker),
            Selector::Pick(_)
        ));
    }

    #[test]
    fn organization_is_required_per_command() {
        let cli = parse(&["list", "--organization", "acme", "--json"]).unwrap();
        assert_eq!(cli.command.organization(), "acme");
    }
}
