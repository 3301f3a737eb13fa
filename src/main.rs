use std::process::ExitCode;

use clap::Parser;
use log::{error, info, LevelFilter};

use notedex::{App, Cli, Config, NoteStorage, StorePaths};

pub fn initialize_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_secs().format_module_path(true).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let Some(root) = cli.store.clone().or_else(StorePaths::default_root) else {
        eprintln!("error: no home directory found, pass --store <dir>");
        return ExitCode::FAILURE;
    };
    let paths = StorePaths::new(root);
    info!("Using store at {}", paths.root().display());

    let mut config = match Config::load(&paths) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(notes_dir) = cli.notes_dir {
        config.note_dir = notes_dir;
    }

    let app = App::new(NoteStorage::new(paths, config), cli.verbose);
    match app.run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
