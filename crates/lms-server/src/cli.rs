use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `lms` binary.
#[derive(Debug, Parser)]
#[command(name = "lms", version, about = "Learning management system API server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create the default admin, contributor and employee accounts
    Seed,
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

impl Cli {
    /// The subcommand to run; no subcommand means `serve`.
    #[must_use]
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
