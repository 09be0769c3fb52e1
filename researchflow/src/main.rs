mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use researchflow_env::BootstrapError;

fn main() {
    researchflow_core::observability::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Launch) {
        Commands::Launch => commands::launch::cmd_launch(),
        Commands::Check { json, skip_api } => commands::check::cmd_check(json, skip_api),
        Commands::Seed { show } => commands::seed::cmd_seed(show),
    };

    let code = match result {
        Ok(code) => code,
        // Gate failures were already reported by the step output.
        Err(e) => match e.downcast_ref::<BootstrapError>() {
            Some(err) => err.exit_code(),
            None => {
                eprintln!("Error: {:#}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
