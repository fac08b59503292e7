//! Margin command-line front end
//!
//! Argument definitions and command execution. Every command reads a
//! document file and writes its result to the given output; the binary
//! passes stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use margin_document::Document;
use margin_engine::{AnalysisReport, Engine, EngineConfig};
use margin_issue::{Issue, IssueId};
use margin_overlay::resolve_match;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "margin", version)]
#[command(about = "Critique overlays and suggestion application for rich-text documents")]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read issues as an analysis service report
    #[arg(long, global = true)]
    pub report: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Margin subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the document with issue highlights
    Render {
        /// Document markup file
        document: PathBuf,
        /// Issue list, or a report with `--report`
        issues: PathBuf,
    },
    /// Apply suggestions and print the resulting document
    Apply {
        /// Document markup file
        document: PathBuf,
        /// Issue list, or a report with `--report`
        issues: PathBuf,
        /// Issue to apply, in order (repeatable)
        #[arg(long = "issue", value_name = "ID", required = true)]
        ids: Vec<String>,
    },
    /// Print the document with all overlay markup removed
    Clean {
        /// Document markup file
        document: PathBuf,
    },
    /// Locate anchor text in a document
    Resolve {
        /// Document markup file
        document: PathBuf,
        /// Text to look for
        anchor: String,
    },
}

/// Execute `cli`, writing the command's result to `out`
///
/// # Errors
/// Fails on unreadable files, malformed markup or issues, a bad
/// configuration file, or an unavailable analysis report.
pub async fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(command = ?cli.command, "running");

    match &cli.command {
        Command::Render { document, issues } => {
            let mut engine = open_engine(config, document)?;
            activate(&mut engine, issues, cli.report).await?;

            let view = engine.decorated_view()?;
            writeln!(out, "{}", view.markup)?;
            if !view.skipped.is_empty() {
                writeln!(out, "skipped: {}", join_ids(&view.skipped))?;
            }
        }
        Command::Apply {
            document,
            issues,
            ids,
        } => {
            let mut engine = open_engine(config, document)?;
            activate(&mut engine, issues, cli.report).await?;

            let mut accepted = Vec::with_capacity(ids.len());
            for id in ids {
                match engine.select(id) {
                    Ok(()) => accepted.extend(engine.settle().await),
                    Err(err) if err.is_recoverable() => {
                        tracing::warn!(issue = %id, %err, "suggestion not applied");
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            engine.deactivate();
            writeln!(out, "{}", engine.content())?;
            writeln!(out, "accepted: {}", join_ids(&accepted))?;
        }
        Command::Clean { document } => {
            let mut doc = read_document(document)?;
            let stripped = doc.strip_overlays();
            tracing::info!(stripped, "overlays removed");
            writeln!(out, "{doc}")?;
        }
        Command::Resolve { document, anchor } => {
            let doc = read_document(document)?;
            match resolve_match(&doc, anchor) {
                Ok((span, kind)) => writeln!(
                    out,
                    "{kind} match {}..{}: {}",
                    span.range.start, span.range.end, span.text
                )?,
                Err(err) => {
                    tracing::debug!(%err, "anchor unresolved");
                    writeln!(out, "not found")?;
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::new()),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_document(path: &Path) -> Result<Document> {
    let markup = read_file(path)?;
    Document::parse(&markup).with_context(|| format!("failed to parse {}", path.display()))
}

fn open_engine(config: EngineConfig, path: &Path) -> Result<Engine> {
    let markup = read_file(path)?;
    Engine::with_content(config, &markup)
        .with_context(|| format!("failed to parse {}", path.display()))
}

async fn activate(engine: &mut Engine, path: &Path, report: bool) -> Result<()> {
    let json = read_file(path)?;
    let skipped = if report {
        let report = AnalysisReport::from_json(&json)
            .with_context(|| format!("invalid analysis report {}", path.display()))?;
        engine.activate_from(&report).await?
    } else {
        let issues = Issue::list_from_json(&json)
            .with_context(|| format!("invalid issue list {}", path.display()))?;
        engine.activate(issues)
    };

    if skipped > 0 {
        tracing::warn!(skipped, "duplicate issue ids skipped");
    }
    Ok(())
}

fn join_ids(ids: &[IssueId]) -> String {
    ids.iter()
        .map(IssueId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "margin", "render", "doc.html", "issues.json", "--report", "-v",
        ])
        .unwrap();
        assert!(cli.report);
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Command::Render {
                document: "doc.html".into(),
                issues: "issues.json".into(),
            }
        );
    }

    #[test]
    fn apply_collects_repeated_issue_flags() {
        let cli = Cli::try_parse_from([
            "margin", "apply", "d", "i", "--issue", "a", "--issue", "b",
        ])
        .unwrap();
        match cli.command {
            Command::Apply { ids, .. } => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn apply_requires_an_issue() {
        assert!(Cli::try_parse_from(["margin", "apply", "d", "i"]).is_err());
    }

    #[test]
    fn ids_join_with_commas() {
        assert_eq!(join_ids(&[IssueId::new("a"), IssueId::new("b")]), "a, b");
        assert_eq!(join_ids(&[]), "");
    }
}
