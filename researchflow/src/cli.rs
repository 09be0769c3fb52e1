use clap::{Parser, Subcommand};

/// Research workflow agent launcher: prepares the Python environment, then starts the agent.
///
/// With no subcommand the full bootstrap sequence runs and the agent is launched.
#[derive(Parser, Debug)]
#[command(name = "researchflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Prepare the environment and launch the agent (the default)
    Launch,

    /// Report on the environment without changing anything
    Check {
        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Do not contact the LLM API
        #[arg(long)]
        skip_api: bool,
    },

    /// Create the data directories and the default knowledge database if absent
    Seed {
        /// List the records in the knowledge database afterwards
        #[arg(long)]
        show: bool,
    },
}
