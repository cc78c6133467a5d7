//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query and edit page graph records
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Record file to read, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging stays off when unset
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Reject records whose label or note indexes are inconsistent
    #[arg(long)]
    pub strict: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print core health and version without reading a record
    Ping,

    /// Print one page (synthesized when unknown)
    Page { url: String },

    /// Print the members of a label
    Label { label: String },

    /// Print all label names
    Labels,

    /// Print all note urls
    Notes,

    /// Check label and note symmetry
    Verify,

    /// Rename a known page
    SetDisplay {
        url: String,
        display: String,
        /// Store the display as a JSON number
        #[arg(long)]
        number: bool,
    },

    /// File a page under a note; omit the note to detach it
    SetNote { url: String, note_url: Option<String> },

    /// Attach a label to a page
    AddLabel { url: String, label: String },

    /// Detach a label from a page
    RemLabel { url: String, label: String },

    /// Detach every page filed under a note
    DeleteNote { note_url: String },

    /// Remove a label everywhere
    DeleteLabel { label: String },
}

impl Commands {
    /// Mutating commands print the whole updated record.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetDisplay { .. }
                | Self::SetNote { .. }
                | Self::AddLabel { .. }
                | Self::RemLabel { .. }
                | Self::DeleteNote { .. }
                | Self::DeleteLabel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn parses_mutation_with_defaults() {
        let cli = Cli::try_parse_from(["pagegraph", "add-label", "A", "Red"]).unwrap();
        assert_eq!(cli.input.to_str(), Some("-"));
        assert!(!cli.strict);
        assert_eq!(
            cli.command,
            Commands::AddLabel {
                url: "A".to_string(),
                label: "Red".to_string(),
            }
        );
        assert!(cli.command.is_mutation());
    }

    #[test]
    fn set_note_target_is_optional() {
        let cli = Cli::try_parse_from(["pagegraph", "-i", "graph.json", "set-note", "A"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::SetNote {
                url: "A".to_string(),
                note_url: None,
            }
        );
    }

    #[test]
    fn queries_are_not_mutations() {
        let cli = Cli::try_parse_from(["pagegraph", "--strict", "labels"]).unwrap();
        assert!(cli.strict);
        assert!(!cli.command.is_mutation());
    }
}
