use clap::Parser;

mod bootstrap;
mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("lms error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = bootstrap::load_config()?;

    match cli.into_command() {
        Commands::Serve => {
            let state = bootstrap::app_state(config).await?;
            lms_server::serve(state).await
        }
        Commands::Seed => {
            let service = bootstrap::open_service(&config).await?;
            let created = lms_server::seed::seed_default_accounts(&service).await?;
            for user in &created {
                println!("created {} ({})", user.username, user.role);
            }
            if created.is_empty() {
                println!("default accounts already exist");
            }
            Ok(())
        }
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => {
            let service = bootstrap::open_service(&config).await?;
            let user = lms_server::seed::create_admin(&service, &username, &email, &password).await?;
            println!("created admin {} (id {})", user.username, user.id);
            Ok(())
        }
    }
}

/// `LMS_LOG` wins; otherwise the level follows `--quiet`/`--verbose`.
fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LMS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
