use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate text and record it in the history
    Translate {
        /// Text to translate
        text: String,

        /// Source language code or name ("auto" to detect)
        #[arg(short, long)]
        from: Option<String>,

        /// Target language code or name (omit to let the server choose)
        #[arg(short, long)]
        to: Option<String>,

        /// Show detected languages and model
        #[arg(long)]
        details: bool,
    },

    /// Translate, then swap languages and show the resulting form
    Swap {
        /// Text to translate
        text: String,

        /// Source language code or name
        #[arg(short, long)]
        from: Option<String>,

        /// Target language code or name
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Ask the server which language the text is in
    Detect {
        /// Text to inspect
        text: String,
    },

    /// Show and manage the translation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show backend models, optionally switching to another one
    Models {
        /// Index of the model to switch to
        #[arg(long)]
        switch: Option<usize>,
    },

    /// List known language codes
    Languages,

    /// Check the translation service health
    Health,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List entries, most recent first
    List,

    /// Remove one entry
    Remove {
        /// Entry id as shown by `history list`
        id: u64,
    },

    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Translate an entry's source text again
    Replay {
        /// Entry id as shown by `history list`
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination file
        #[arg(default_value = "lingo.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
