//! # Targzip Create Command
//!
//! File: cli/src/commands/create.rs
//!
//! ## Overview
//!
//! Implements `targzip create`, which bundles one or more files or directory trees into
//! a single archive. Each root keeps its own basename as the top-level entry component.
//!
//! ```bash
//! # Two unrelated trees in one compressed archive
//! targzip create backup.tar.gz ~/notes /etc/nginx
//!
//! # Every child of ./site as its own root, skipping VCS and build output
//! targzip create site.tar --children ./site --exclude .git --exclude target
//! ```
//!
use super::archive_kind;
use crate::common::archive::{ArchiveKind, ChildrenOf, RootSource, Roots, TarGzipProcessor, TarProcessor};
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Arguments for `targzip create`.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Archive to write. `.tar.gz` names are gzip-compressed, `.tar` names are not.
    pub output: PathBuf,

    /// Files or directories to archive, in order.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Treat every direct child of each ROOT as a root of its own.
    #[arg(long)]
    pub children: bool,

    /// Skip every path with this file name, together with its contents. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,
}

/// Handles `targzip create`.
pub fn handle_create(args: CreateArgs) -> Result<()> {
    info!("Handling create command for {}", args.output.display());
    let settings = config::load_config()
        .context("Failed to load targzip configuration")?
        .settings();
    let kind = archive_kind(&args.output)?;
    let roots = collect_roots(&args.roots, args.children)?;
    debug!("Archiving {} root(s)", roots.len());

    let keep = |path: &Path| !is_excluded(path, &args.exclude);
    let filtered = !args.exclude.is_empty();
    let names = match kind {
        ArchiveKind::Tar => {
            let processor = TarProcessor::new(roots, settings);
            if filtered {
                processor.compress_filtered(&args.output, keep)
            } else {
                processor.compress(&args.output)
            }
        }
        ArchiveKind::TarGz => {
            let processor = TarGzipProcessor::new(roots, settings);
            if filtered {
                processor.compress_filtered(&args.output, keep)
            } else {
                processor.compress(&args.output)
            }
        }
    }
    .with_context(|| format!("Failed to create archive '{}'", args.output.display()))?;

    println!("Created {} with {} entries", args.output.display(), names.len());
    Ok(())
}

fn collect_roots(paths: &[PathBuf], children: bool) -> Result<Roots> {
    if !children {
        return Roots::from_paths(paths);
    }
    let mut roots = Vec::new();
    for dir in paths {
        roots.extend(ChildrenOf::new(dir).roots()?);
    }
    Ok(Roots::new(roots))
}

fn is_excluded(path: &Path, excluded: &[String]) -> bool {
    path.file_name()
        .is_some_and(|name| excluded.iter().any(|x| name == x.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_args_parsing() {
        let args = CreateArgs::try_parse_from([
            "create", "out.tar.gz", "a", "b", "--children", "--exclude", ".git", "--exclude", "target",
        ])
        .unwrap();
        assert_eq!(args.output, PathBuf::from("out.tar.gz"));
        assert_eq!(args.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert!(args.children);
        assert_eq!(args.exclude, vec![".git", "target"]);
    }

    #[test]
    fn test_create_args_require_a_root() {
        assert!(CreateArgs::try_parse_from(["create", "out.tar"]).is_err());
    }

    #[test]
    fn test_is_excluded_matches_file_name_only() {
        let excluded = vec![".git".to_string()];
        assert!(is_excluded(Path::new("/src/project/.git"), &excluded));
        assert!(!is_excluded(Path::new("/src/project/.gitignore"), &excluded));
        assert!(!is_excluded(Path::new("/src/.git/config"), &excluded));
    }
}
