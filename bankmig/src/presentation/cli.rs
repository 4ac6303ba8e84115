use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Move game bank saves to the new publisher folder", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Game documents folder (defaults to <Documents>/StarCraft II)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// JSON config overriding publisher ids and the bank manifest
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List accounts that still have banks at the old location
    Scan,

    /// Show migratable files and collisions for one account
    Status { handle: String },

    /// Migrate one account's banks
    Migrate {
        handle: String,

        /// Only these bank files (repeatable). Default: all migratable.
        #[arg(long = "file")]
        files: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,

        /// Copy only; leave signatures as they are
        #[arg(long)]
        no_resign: bool,
    },

    /// Migrate every scanned account
    MigrateAll {
        /// Skip the single up-front confirmation prompt
        #[arg(long, short)]
        yes: bool,

        #[arg(long)]
        no_resign: bool,
    },

    /// Rewrite the signature of a single bank file in place
    Resign {
        file: PathBuf,
        /// Owning publisher id (defaults to the configured new publisher)
        #[arg(long)]
        owner: Option<String>,
        /// Account handle the bank belongs to
        #[arg(long)]
        user: String,
    },

    /// Check a bank file's signature
    Verify {
        file: PathBuf,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        user: String,
    },

    /// Write the built-in config as JSON
    InitConfig { out: PathBuf },
}
