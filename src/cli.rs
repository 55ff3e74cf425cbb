use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ms_core::entry::CategoryFilter;

#[derive(Debug, Parser)]
#[command(name = "mediashelf")]
#[command(about = "Local media library with durable history", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to <data dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add local files to the library
    Add {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
        /// Reference the files for this session only instead of storing their bytes
        #[arg(long)]
        stream: bool,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Add a remote URL; it is never fetched
    AddUrl {
        url: String,
        /// Display name (defaults to the last path segment)
        #[arg(long)]
        name: Option<String>,
        /// Allow the entry to be re-saved or exported
        #[arg(long)]
        allow_save: bool,
    },
    /// List entries
    List {
        /// saved | streaming | image | audio | video | lost
        #[arg(short, long)]
        filter: Option<CategoryFilter>,
        /// Only entries with a tag containing this term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Remove an entry by id
    Remove { id: String },
    /// Replace the tags of an entry
    Tag { id: String, tags: Vec<String> },
    /// Re-supply the content of an entry that lost its payload
    Reacquire {
        path: PathBuf,
        #[arg(long)]
        stream: bool,
    },
    /// Show library statistics
    Stats,
    /// Delete every entry from memory and both storage tiers
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}
