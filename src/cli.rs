// File: ./src/cli.rs
//! Command-line definitions and the plain-text snapshot view.
use crate::model::EventRecord;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notifcal")]
#[command(version, about = "Calendar events from notification snippets", long_about = None)]
pub struct Cli {
    /// Use a different directory for config and data.
    #[arg(short = 'r', long, global = true)]
    pub root: Option<PathBuf>,

    /// Log debug details.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract events from a scraped notifications file and update the snapshot
    Ingest {
        /// JSON list of {title, url, card_text, id?, detail_text?}
        input: PathBuf,
    },
    /// Print the snapshot as an .ics calendar
    Export,
    /// Print the stored events
    Show,
}

/// Fixed-width table of the stored events.
pub fn render_table(records: &[EventRecord]) -> String {
    let mut out = format!(
        "{:<10} {:<10} {:<6} {:<6} {}\n",
        "ID", "DATE", "START", "END", "TITLE"
    );
    for r in records {
        out.push_str(&format!(
            "{:<10} {:<10} {:<6} {:<6} {}\n",
            r.id,
            r.date_string(),
            r.start_string(),
            r.end_string(),
            r.title.as_deref().unwrap_or("")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_ingest_with_global_flags() {
        let cli = Cli::parse_from(["notifcal", "ingest", "n.json", "--root", "/tmp/x", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Ingest { input } => assert_eq!(input, PathBuf::from("n.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_table_shows_blank_fields() {
        let mut r = EventRecord::new("8");
        r.title = Some("Demo".into());
        let table = render_table(&[r]);
        assert!(table.lines().nth(1).unwrap().starts_with("8 "));
        assert!(table.ends_with("Demo\n"));
    }
}
