//! CLI argument definitions using clap derive

use crate::version::VersionTag;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Fixtures - slashing-protection interchange test fixtures
///
/// Downloads the pinned interchange test archive, extracts it next to the
/// tests that read it, and drives the local fixture generator.
#[derive(Parser, Debug)]
#[command(name = "fixtures")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Working root the fixture directories live in (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FIXTURES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured version tag
    #[arg(long, global = true)]
    pub tag: Option<VersionTag>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Download the archive if needed and extract it
    AcquireFixtures,

    /// Remove the extracted fixtures and the cached archive
    Clean,

    /// Remove the cached archive for the current tag
    CleanArchives,

    /// Remove the extracted fixtures
    CleanTestFiles,

    /// Regenerate fixtures with the local generator
    Generate,

    /// Show what is on disk
    Status,
}
