pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use bankmig_core::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let g = cli.global;
    match cli.command {
        Commands::Scan => handlers::handle_scan(&g),
        Commands::Status { handle } => handlers::handle_status(&g, &handle),
        Commands::Migrate {
            handle,
            files,
            yes,
            no_resign,
        } => handlers::handle_migrate(&g, &handle, files, yes, no_resign),
        Commands::MigrateAll { yes, no_resign } => handlers::handle_migrate_all(&g, yes, no_resign),
        Commands::Resign { file, owner, user } => handlers::handle_resign(&g, file, owner, user),
        Commands::Verify { file, owner, user } => handlers::handle_verify(&g, file, owner, user),
        Commands::InitConfig { out } => handlers::handle_init_config(out),
    }
}
