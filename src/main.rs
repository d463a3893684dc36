use clap::Parser;
use tracing_subscriber::EnvFilter;

use pixelhub::commands;
use pixelhub::config::{Cli, Config};
use pixelhub::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    let mut state = AppState::new(config)?;

    let Some(command) = cli.command else {
        let session = state.session.current();
        if session.is_authenticated() {
            println!("Signed in as {}. See --help for commands.", session.author_name());
        } else {
            println!("Not signed in. Run `pixelhub login` to start.");
        }
        return Ok(());
    };

    let operation = command.operation();
    if let Err(e) = commands::run(command, &mut state).await {
        if let Some(route) = e.redirect() {
            tracing::debug!("Redirecting to {}", route);
        }
        eprintln!("{}", commands::failure_notice(&e, operation));
        std::process::exit(1);
    }

    Ok(())
}
