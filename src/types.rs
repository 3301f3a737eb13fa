//! Shared result types and the command set of the notedex binary.
use std::path::PathBuf;

use clap::Subcommand;

use crate::NoteError;

/// A specialized Result type for notedex operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Outcome of a full reindex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReindexSummary {
    /// Notes now in the primary index
    pub notes: usize,
    /// Distinct tags in the rebuilt tag index
    pub tags: usize,
    /// Files left out because another file already claimed their title
    pub shadowed: usize,
    /// Pins dropped because their note is gone
    pub pruned_pins: usize,
}

/// Available subcommands for the notedex application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a note in the editor, creating it if needed
    #[clap(visible_aliases = ["new", "edit"])]
    Open {
        /// Title of the note
        title: String,

        /// Seed a new note from this template
        #[clap(short, long)]
        template: Option<String>,

        /// Index the note without launching the editor
        #[clap(long)]
        no_edit: bool,
    },

    /// Rename a note, keeping its pin
    #[clap(visible_alias = "mv")]
    Rename { old: String, new: String },

    /// Add tags to a note (or remove them with --remove)
    Tag {
        title: String,

        /// Tags, comma or space separated
        #[clap(required = true)]
        tags: Vec<String>,

        #[clap(short, long)]
        remove: bool,
    },

    /// Pin a note
    Pin { title: String },

    /// Unpin a note
    Unpin { title: String },

    /// List pinned notes
    Pins,

    /// Move a note to the trash
    #[clap(visible_alias = "rm")]
    Delete { title: String },

    /// Bring a note back from the trash
    Recover { title: String },

    /// List trashed notes, optionally filtered
    Trash { query: Option<String> },

    /// Permanently delete everything in the trash
    EmptyTrash {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// List all notes
    #[clap(visible_alias = "ls")]
    List,

    /// Search notes by title or tags
    Search {
        /// Title substring
        query: Option<String>,

        /// Rank by matching tags instead (comma-separated)
        #[clap(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// With --tags, only keep notes carrying every tag
        #[clap(short, long)]
        all: bool,

        /// Fuzzy match titles
        #[clap(short, long)]
        fuzzy: bool,
    },

    /// Find notes by date, e.g. `24`, `2402`, `240215.13`
    Date {
        from: String,
        to: Option<String>,

        /// Match the creation date instead of the modification date
        #[clap(short, long)]
        created: bool,
    },

    /// Recently visited notes
    Recent {
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Most used tags
    Tags {
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Rebuild the index from the note directory
    Reindex,

    /// Render a note to HTML
    Render {
        title: String,

        /// Write to this file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// List available templates
    Templates,

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
