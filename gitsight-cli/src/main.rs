//! gitsight — read-only Git object store inspector
//!
//! # Usage
//!
//! ```bash
//! # List local branches, starring the checked out one
//! gitsight --git-dir /path/to/repo/.git list-branches
//!
//! # Show a decoded blob, tree or commit
//! gitsight cat-file 0eee6a98471a350b2c2316313114185ecaf82f0e
//!
//! # Walk the history of a branch
//! gitsight log master
//!
//! # List every file in a commit's snapshot
//! gitsight commit-tree 0eee6a98471a350b2c2316313114185ecaf82f0e
//! ```

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitsight_core::{Inspector, InspectorConfig, ObjectId};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gitsight")]
#[command(author = "Gitsight Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Inspect the objects, history and trees of a Git directory")]
struct Cli {
    /// Path to the .git directory
    #[arg(long, global = true, env = "GIT_DIR", default_value = ".git")]
    git_dir: PathBuf,

    /// Reject objects whose content does not hash to their id
    #[arg(long, global = true)]
    verify: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List local branches
    ListBranches,

    /// Show a decoded object
    CatFile {
        /// Object hash (40 hex characters)
        hash: String,
    },

    /// Show the history of a branch
    Log {
        /// Branch name under refs/heads
        branch: String,
    },

    /// List all file paths in a commit
    CommitTree {
        /// Commit hash (40 hex characters)
        hash: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let config = InspectorConfig {
        verify_hashes: cli.verify,
    };
    let inspector = Inspector::open(&cli.git_dir, &config);
    tracing::info!("inspecting {}", cli.git_dir.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&inspector, cli.command, cli.json, &mut out)?;
    out.flush()?;
    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let env_filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive("gitsight=warn".parse()?)
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();
    Ok(())
}

fn run(inspector: &Inspector, command: Commands, json: bool, out: &mut dyn Write) -> Result<()> {
    tracing::debug!("dispatching {:?} (json: {})", command, json);
    match command {
        Commands::ListBranches => {
            let branches = inspector.list_branches().context("Failed to list branches")?;
            if json {
                render::write_json(out, &branches)
            } else {
                render::write_branches(out, &branches)
            }
        }

        Commands::CatFile { hash } => {
            let id = parse_hash(&hash)?;
            let object = inspector
                .decode_object(&id)
                .with_context(|| format!("Failed to read object {}", id))?;
            if json {
                render::write_object_json(out, id, &object)
            } else {
                render::write_object(out, &object)
            }
        }

        Commands::Log { branch } => {
            let log = inspector
                .log_branch(&branch)
                .with_context(|| format!("Failed to walk history of branch '{}'", branch))?;
            if json {
                render::write_json(out, &log)
            } else {
                render::write_log(out, &log)
            }
        }

        Commands::CommitTree { hash } => {
            let id = parse_hash(&hash)?;
            let paths = inspector
                .list_paths(&id)
                .with_context(|| format!("Failed to list files of commit {}", id))?;
            if json {
                render::write_json(out, &paths)
            } else {
                render::write_paths(out, &paths)
            }
        }
    }
}

fn parse_hash(hash: &str) -> Result<ObjectId> {
    Ok(ObjectId::from_hex(hash.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gitsight",
            "log",
            "master",
            "--git-dir",
            "/tmp/repo/.git",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.git_dir, PathBuf::from("/tmp/repo/.git"));
        assert!(cli.json);
        assert!(!cli.verify);
        assert!(matches!(cli.command, Commands::Log { ref branch } if branch == "master"));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_logs_dispatched_command() {
        let logs = SharedBuf::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let inspector = Inspector::open("/nonexistent/.git", &InspectorConfig::default());
        let mut out = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            let _ = run(&inspector, Commands::ListBranches, true, &mut out);
        });

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("dispatching ListBranches (json: true)"), "{}", text);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["gitsight"]).is_err());
    }

    #[test]
    fn test_bad_hash_fails_before_reading() {
        let inspector = Inspector::open("/nonexistent/.git", &InspectorConfig::default());
        let mut out = Vec::new();
        let err = run(
            &inspector,
            Commands::CatFile { hash: "xyz".into() },
            false,
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid object id"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_object_reports_id() {
        let inspector = Inspector::open("/nonexistent/.git", &InspectorConfig::default());
        let hash = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
        let mut out = Vec::new();
        let err = run(
            &inspector,
            Commands::CommitTree { hash: hash.into() },
            false,
            &mut out,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains(&format!("object not found: {}", hash)));
        assert!(out.is_empty());
    }
}
