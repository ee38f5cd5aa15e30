mod args;
mod commands;
mod logging;
mod prompt;

use services::{AppServices, Clock};
use tracing::debug;

use crate::args::{Args, Command, prepare_sqlite_file, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_env().inspect_err(|err| {
        eprintln!("{err}");
        print_usage();
    })?;
    logging::init_tracing(args.verbose);
    debug!(command = ?args.command, db_url = %args.db_url, "starting");

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Storage setup stays in the binary glue so services remain backend-agnostic.
    prepare_sqlite_file(&args.db_url)?;

    match args.command {
        Command::DbInit => return commands::db_init(&args.db_url).await,
        Command::DbReset => return commands::db_reset(&args.db_url).await,
        _ => {}
    }

    let services = AppServices::open_sqlite(&args.db_url, Clock::default_clock()).await?;
    let result = match (args.command, args.course) {
        (Command::Quiz, course) => commands::quiz(&services, course).await,
        (Command::Stats, course) => commands::stats(&services, course).await,
        (Command::Generate, Some(course)) => {
            commands::generate(&services, &course, args.questions).await
        }
        (Command::Seed, _) => commands::seed(&services).await,
        (Command::Generate, None) => Err("generate requires --course".into()),
        (Command::DbInit | Command::DbReset | Command::Help, _) => Ok(()),
    };
    services.close().await;
    result
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}
