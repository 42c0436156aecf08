mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Guards flush the file writers on drop; keep them for the whole run.
    let guards = match init_logging(&cli) {
        Ok(guards) => guards,
        Err(err) => exit_with(err),
    };

    if let Err(err) = run(cli).await {
        tracing::error!("{err}");
        // process::exit skips destructors.
        drop(guards);
        exit_with(err);
    }
}

fn exit_with(err: CliError) -> ! {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}

fn init_logging(cli: &Cli) -> Result<logging::LogGuards, CliError> {
    let level = logging::min_level(cli.global.verbose);
    // Only a sync writes per-level files; the audit reads them.
    let log_dir = matches!(cli.command, Command::Sync(_)).then_some(cli.global.log_dir.as_path());
    logging::init(level, log_dir)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Sync(args) => commands::sync::handle(&args, &cli.global).await,
        Command::Audit(args) => commands::audit::handle(&args),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "unifi2netbox", &mut std::io::stdout());
            Ok(())
        }
    }
}
